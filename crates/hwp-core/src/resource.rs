use crate::decode;
use crate::kind::Kind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub resource_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deletion_timestamp: Option<String>,
}

impl ObjectMeta {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }
    }
}

/// A schemaless stored object: typed envelope plus free-form body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicObject {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: Kind,
    pub metadata: ObjectMeta,
    #[serde(flatten)]
    pub data: BTreeMap<String, Value>,
}

impl DynamicObject {
    pub fn new(kind: Kind, namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            api_version: kind.api_version().to_string(),
            kind,
            metadata: ObjectMeta::new(namespace, name),
            data: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.annotations.get(key).map(String::as_str)
    }

    pub fn get_field(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Resolve a nested body path such as `["spec", "predictor", "model"]`.
    pub fn field(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        decode::nested(self.data.get(*first)?, rest)
    }

    pub fn field_str(&self, path: &[&str]) -> Option<&str> {
        self.field(path)?.as_str()
    }

    pub fn is_terminating(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey {
            kind: self.kind.clone(),
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
        }
    }
}

/// Identity of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn new(kind: Kind, namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.map(str::to_string),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} {}/{}", self.kind, ns, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_serialization_flattens_body() {
        let obj = DynamicObject::new(Kind::Notebook, Some("team-a"), "nb")
            .with_annotation("opendatahub.io/accelerator-name", "nvidia-gpu")
            .with_field("spec", json!({"template": {}}));

        let value = serde_json::to_value(&obj).unwrap();
        assert_eq!(value["apiVersion"], "kubeflow.org/v1");
        assert_eq!(value["kind"], "Notebook");
        assert_eq!(value["metadata"]["namespace"], "team-a");
        assert_eq!(
            value["metadata"]["annotations"]["opendatahub.io/accelerator-name"],
            "nvidia-gpu"
        );
        assert!(value["metadata"].get("labels").is_none());
        assert_eq!(value["spec"], json!({"template": {}}));
    }

    #[test]
    fn test_object_deserialization() {
        let obj: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "serving.kserve.io/v1beta1",
            "kind": "InferenceService",
            "metadata": {"name": "isvc", "namespace": "ns", "labels": {"a": "b"}},
            "spec": {"predictor": {"model": {"runtime": "ovms"}}},
            "status": {"deploymentMode": "Serverless"}
        }))
        .unwrap();

        assert_eq!(obj.kind, Kind::InferenceService);
        assert_eq!(obj.label("a"), Some("b"));
        assert_eq!(
            obj.field_str(&["spec", "predictor", "model", "runtime"]),
            Some("ovms")
        );
        assert_eq!(obj.field_str(&["status", "deploymentMode"]), Some("Serverless"));
        assert!(obj.annotation("missing").is_none());
        assert!(!obj.is_terminating());
    }

    #[test]
    fn test_object_key_display() {
        let obj = DynamicObject::new(Kind::HardwareProfile, Some("opendatahub"), "gpu-notebooks");
        assert_eq!(
            obj.key().to_string(),
            "HardwareProfile opendatahub/gpu-notebooks"
        );

        let ns = ObjectKey::new(Kind::Namespace, None, "team-a");
        assert_eq!(ns.to_string(), "Namespace team-a");
    }
}
