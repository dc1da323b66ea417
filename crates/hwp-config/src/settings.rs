use crate::{ConfigError, Result};
use hwp_core::wellknown::DEFAULT_DASHBOARD_CONFIG_NAME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub migration: MigrationSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Convergence backoff overrides keyed by lower-cased kind name.
    #[serde(default)]
    pub backoff: BTreeMap<String, BackoffSettings>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        if self.migration.dashboard_config_name.is_empty() {
            return Err(ConfigError::validation(
                "migration.dashboard_config_name must not be empty",
            ));
        }
        for (kind, backoff) in &self.backoff {
            backoff
                .validate()
                .map_err(|e| ConfigError::validation(format!("backoff.{kind}: {e}")))?;
        }
        Ok(())
    }

    /// Backoff override for a kind, if configured.
    pub fn backoff_for(&self, kind: &str) -> Option<&BackoffSettings> {
        self.backoff.get(&kind.to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Namespace holding the dashboard config and container-size profiles.
    /// Empty disables the migration.
    #[serde(default)]
    pub application_namespace: String,
    #[serde(default = "default_dashboard_config_name")]
    pub dashboard_config_name: String,
    /// Dashboard config manifest used when the store has none.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,
}

fn default_dashboard_config_name() -> String {
    DEFAULT_DASHBOARD_CONFIG_NAME.into()
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            application_namespace: String::new(),
            dashboard_config_name: default_dashboard_config_name(),
            manifest_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Partial backoff policy; unset fields keep the kind's built-in value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BackoffSettings {
    #[serde(default)]
    pub initial_ms: Option<u64>,
    #[serde(default)]
    pub factor: Option<f64>,
    #[serde(default)]
    pub jitter: Option<f64>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default)]
    pub cap_ms: Option<u64>,
}

impl BackoffSettings {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.initial_ms == Some(0) {
            return Err("initial_ms must be > 0".into());
        }
        if self.steps == Some(0) {
            return Err("steps must be > 0".into());
        }
        if let Some(factor) = self.factor {
            if !(factor >= 1.0) {
                return Err("factor must be >= 1.0".into());
            }
        }
        if let Some(jitter) = self.jitter {
            if !(0.0..=1.0).contains(&jitter) {
                return Err("jitter must be within [0, 1]".into());
            }
        }
        if let (Some(initial), Some(cap)) = (self.initial_ms, self.cap_ms) {
            if cap < initial {
                return Err("cap_ms must be >= initial_ms".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.migration.dashboard_config_name, "odh-dashboard-config");
        assert!(cfg.migration.application_namespace.is_empty());
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut cfg = AppConfig::default();
        cfg.logging.level = "verbose".into();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_backoff_validation() {
        let bad = [
            BackoffSettings {
                steps: Some(0),
                ..Default::default()
            },
            BackoffSettings {
                factor: Some(0.5),
                ..Default::default()
            },
            BackoffSettings {
                factor: Some(f64::NAN),
                ..Default::default()
            },
            BackoffSettings {
                jitter: Some(1.5),
                ..Default::default()
            },
            BackoffSettings {
                initial_ms: Some(5_000),
                cap_ms: Some(1_000),
                ..Default::default()
            },
            BackoffSettings {
                initial_ms: Some(0),
                ..Default::default()
            },
        ];
        for settings in bad {
            assert!(settings.validate().is_err(), "{settings:?} should be rejected");
        }

        let good = BackoffSettings {
            initial_ms: Some(1_000),
            factor: Some(2.0),
            jitter: Some(0.1),
            steps: Some(3),
            cap_ms: Some(60_000),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn test_backoff_lookup_is_case_insensitive() {
        let mut cfg = AppConfig::default();
        cfg.backoff.insert(
            "statefulset".into(),
            BackoffSettings {
                steps: Some(8),
                ..Default::default()
            },
        );
        assert_eq!(cfg.backoff_for("StatefulSet").and_then(|b| b.steps), Some(8));
        assert!(cfg.backoff_for("Deployment").is_none());

        cfg.backoff.insert(
            "deployment".into(),
            BackoffSettings {
                jitter: Some(2.0),
                ..Default::default()
            },
        );
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("backoff.deployment"));
    }
}
