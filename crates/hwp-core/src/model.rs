use crate::decode;
use crate::error::{CoreError, Result};
use crate::kind::Kind;
use crate::resource::DynamicObject;
use crate::wellknown::{FEATURE_VISIBILITY_MODEL_SERVING, FEATURE_VISIBILITY_WORKBENCH};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Workload class a generated profile targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Notebooks,
    Serving,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Notebooks => "notebooks",
            ProfileType::Serving => "serving",
        }
    }

    pub fn feature_visibility(&self) -> &'static str {
        match self {
            ProfileType::Notebooks => FEATURE_VISIBILITY_WORKBENCH,
            ProfileType::Serving => FEATURE_VISIBILITY_MODEL_SERVING,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareResourceType {
    Accelerator,
    #[serde(rename = "CPU")]
    Cpu,
    Memory,
}

/// Count field that may be written as a number or a quantity string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    String(String),
}

impl From<i64> for IntOrString {
    fn from(value: i64) -> Self {
        IntOrString::Int(value)
    }
}

impl From<&str> for IntOrString {
    fn from(value: &str) -> Self {
        IntOrString::String(value.to_string())
    }
}

impl From<String> for IntOrString {
    fn from(value: String) -> Self {
        IntOrString::String(value)
    }
}

impl fmt::Display for IntOrString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntOrString::Int(v) => write!(f, "{v}"),
            IntOrString::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareIdentifier {
    pub identifier: String,
    pub display_name: String,
    pub resource_type: HardwareResourceType,
    pub min_count: IntOrString,
    pub default_count: IntOrString,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_count: Option<IntOrString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Toleration {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub operator: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub effect: String,
}

impl Toleration {
    /// Copy string fields from a loose map; anything else is left empty.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            key: decode::str_or_empty(map, "key"),
            operator: decode::str_or_empty(map, "operator"),
            value: decode::str_or_empty(map, "value"),
            effect: decode::str_or_empty(map, "effect"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulingType {
    #[default]
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeScheduling {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tolerations: Vec<Toleration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingSpec {
    #[serde(rename = "type")]
    pub scheduling_type: SchedulingType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub node: Option<NodeScheduling>,
}

impl SchedulingSpec {
    /// Node scheduling with tolerations, or `None` when there are none.
    pub fn with_tolerations(tolerations: Vec<Toleration>) -> Option<Self> {
        if tolerations.is_empty() {
            return None;
        }
        Some(Self {
            scheduling_type: SchedulingType::Node,
            node: Some(NodeScheduling { tolerations }),
        })
    }

    pub fn tolerations(&self) -> &[Toleration] {
        self.node
            .as_ref()
            .map(|node| node.tolerations.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfileSpec {
    pub identifiers: Vec<HardwareIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scheduling_spec: Option<SchedulingSpec>,
}

/// The normalized profile this migration produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareProfile {
    pub name: String,
    pub namespace: String,
    pub annotations: BTreeMap<String, String>,
    pub spec: HardwareProfileSpec,
}

impl HardwareProfile {
    pub fn identifier(&self, identifier: &str) -> Option<&HardwareIdentifier> {
        self.spec
            .identifiers
            .iter()
            .find(|id| id.identifier == identifier)
    }

    pub fn tolerations(&self) -> &[Toleration] {
        self.spec
            .scheduling_spec
            .as_ref()
            .map(SchedulingSpec::tolerations)
            .unwrap_or_default()
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn to_object(&self) -> Result<DynamicObject> {
        let mut object = DynamicObject::new(Kind::HardwareProfile, Some(&self.namespace), &self.name)
            .with_field("spec", serde_json::to_value(&self.spec)?);
        object.metadata.annotations = self.annotations.clone();
        Ok(object)
    }

    pub fn from_object(object: &DynamicObject) -> Result<Self> {
        let spec = object
            .get_field("spec")
            .ok_or_else(|| CoreError::missing_field(object.key().to_string(), "spec"))?;
        Ok(Self {
            name: object.name().to_string(),
            namespace: object.namespace().unwrap_or_default().to_string(),
            annotations: object.metadata.annotations.clone(),
            spec: serde_json::from_value(spec.clone())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceleratorProfileSpec {
    pub identifier: String,
    pub display_name: String,
    pub description: String,
    pub enabled: bool,
    pub tolerations: Vec<Toleration>,
}

/// Read-only view of a legacy accelerator profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAcceleratorProfile {
    pub name: String,
    pub namespace: String,
    pub annotations: BTreeMap<String, String>,
    /// `None` when the stored object has no `spec` map.
    pub spec: Option<AcceleratorProfileSpec>,
}

impl LegacyAcceleratorProfile {
    /// Lenient decode: wrong-typed fields fall back to empty values and
    /// non-map tolerations are dropped.
    pub fn from_object(object: &DynamicObject) -> Self {
        let spec = object
            .get_field("spec")
            .and_then(Value::as_object)
            .map(|spec| AcceleratorProfileSpec {
                identifier: decode::str_or_empty(spec, "identifier"),
                display_name: decode::str_or_empty(spec, "displayName"),
                description: decode::str_or_empty(spec, "description"),
                enabled: spec
                    .get("enabled")
                    .and_then(Value::as_bool)
                    .unwrap_or_default(),
                tolerations: spec
                    .get("tolerations")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_object)
                            .map(Toleration::from_map)
                            .collect()
                    })
                    .unwrap_or_default(),
            });

        Self {
            name: object.name().to_string(),
            namespace: object.namespace().unwrap_or_default().to_string(),
            annotations: object.metadata.annotations.clone(),
            spec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourcePair {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
}

impl ResourcePair {
    pub fn new(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: cpu.into(),
            memory: memory.into(),
        }
    }

    fn from_map(map: Option<&Map<String, Value>>) -> Self {
        map.map(|m| Self {
            cpu: decode::str_or_empty(m, "cpu"),
            memory: decode::str_or_empty(m, "memory"),
        })
        .unwrap_or_default()
    }
}

/// A dashboard container-size preset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizedPreset {
    pub name: String,
    pub requests: ResourcePair,
    pub limits: ResourcePair,
}

impl SizedPreset {
    pub fn new(name: impl Into<String>, requests: ResourcePair, limits: ResourcePair) -> Self {
        Self {
            name: name.into(),
            requests,
            limits,
        }
    }

    /// Decode one `{name, resources: {requests, limits}}` entry.
    ///
    /// Returns `None` for non-map entries. Non-string fields stay empty so
    /// the aggregator reports them as unparseable.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let resources = map.get("resources").and_then(Value::as_object);
        let section = |key: &str| resources.and_then(|r| r.get(key)).and_then(Value::as_object);

        Some(Self {
            name: decode::str_or_empty(map, "name"),
            requests: ResourcePair::from_map(section("requests")),
            limits: ResourcePair::from_map(section("limits")),
        })
    }
}
