use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Object kinds the migration reads or writes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    HardwareProfile,
    AcceleratorProfile,
    OdhDashboardConfig,
    Notebook,
    InferenceService,
    ServingRuntime,
    Namespace,
    Deployment,
    StatefulSet,
    #[serde(untagged)]
    Custom(String),
}

impl Kind {
    pub fn as_str(&self) -> &str {
        match self {
            Kind::HardwareProfile => "HardwareProfile",
            Kind::AcceleratorProfile => "AcceleratorProfile",
            Kind::OdhDashboardConfig => "OdhDashboardConfig",
            Kind::Notebook => "Notebook",
            Kind::InferenceService => "InferenceService",
            Kind::ServingRuntime => "ServingRuntime",
            Kind::Namespace => "Namespace",
            Kind::Deployment => "Deployment",
            Kind::StatefulSet => "StatefulSet",
            Kind::Custom(name) => name,
        }
    }

    /// Default `apiVersion` written on newly created objects of this kind.
    pub fn api_version(&self) -> &'static str {
        match self {
            Kind::HardwareProfile => "infrastructure.opendatahub.io/v1",
            Kind::AcceleratorProfile => "dashboard.opendatahub.io/v1",
            Kind::OdhDashboardConfig => "opendatahub.io/v1alpha",
            Kind::Notebook => "kubeflow.org/v1",
            Kind::InferenceService => "serving.kserve.io/v1beta1",
            Kind::ServingRuntime => "serving.kserve.io/v1alpha1",
            Kind::Namespace => "v1",
            Kind::Deployment | Kind::StatefulSet => "apps/v1",
            Kind::Custom(_) => "v1",
        }
    }

    /// Whether objects of this kind live inside a namespace.
    pub fn is_namespaced(&self) -> bool {
        !matches!(self, Kind::Namespace)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HardwareProfile" => Ok(Kind::HardwareProfile),
            "AcceleratorProfile" => Ok(Kind::AcceleratorProfile),
            "OdhDashboardConfig" => Ok(Kind::OdhDashboardConfig),
            "Notebook" => Ok(Kind::Notebook),
            "InferenceService" => Ok(Kind::InferenceService),
            "ServingRuntime" => Ok(Kind::ServingRuntime),
            "Namespace" => Ok(Kind::Namespace),
            "Deployment" => Ok(Kind::Deployment),
            "StatefulSet" => Ok(Kind::StatefulSet),
            _ => {
                if is_valid_kind_name(s) {
                    Ok(Kind::Custom(s.to_string()))
                } else {
                    Err(CoreError::invalid_kind(s))
                }
            }
        }
    }
}

/// Kind names are non-empty, start with an uppercase ASCII letter and are alphanumeric.
pub fn is_valid_kind_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Notebook".parse::<Kind>().unwrap(), Kind::Notebook);
        assert_eq!(
            "HardwareProfile".parse::<Kind>().unwrap(),
            Kind::HardwareProfile
        );
        assert_eq!(
            "Pod".parse::<Kind>().unwrap(),
            Kind::Custom("Pod".to_string())
        );
        assert!("pod".parse::<Kind>().is_err());
        assert!("".parse::<Kind>().is_err());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&Kind::InferenceService).unwrap();
        assert_eq!(json, "\"InferenceService\"");

        let custom: Kind = serde_json::from_str("\"ConfigMap\"").unwrap();
        assert_eq!(custom, Kind::Custom("ConfigMap".to_string()));
        assert_eq!(serde_json::to_string(&custom).unwrap(), "\"ConfigMap\"");
    }

    #[test]
    fn test_namespaced() {
        assert!(Kind::Notebook.is_namespaced());
        assert!(!Kind::Namespace.is_namespaced());
    }

    #[test]
    fn test_display_roundtrip() {
        for kind in [
            Kind::HardwareProfile,
            Kind::AcceleratorProfile,
            Kind::OdhDashboardConfig,
            Kind::Notebook,
            Kind::InferenceService,
            Kind::ServingRuntime,
            Kind::Namespace,
            Kind::Deployment,
            Kind::StatefulSet,
        ] {
            assert_eq!(kind.to_string().parse::<Kind>().unwrap(), kind);
        }
    }
}
