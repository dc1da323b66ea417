use crate::decode;
use crate::error::{CoreError, Result};
use crate::model::{SizedPreset, Toleration};
use crate::resource::DynamicObject;
use serde_json::Value;

/// Typed view of the legacy dashboard configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardConfig {
    pub notebook_sizes: Vec<SizedPreset>,
    pub model_server_sizes: Vec<SizedPreset>,
    pub notebooks_only_toleration: Option<Toleration>,
    /// Size list fields that were present but not lists. They decode as
    /// empty so the remaining sizes still migrate.
    pub malformed_size_lists: Vec<String>,
}

impl DashboardConfig {
    /// Decode `spec.notebookSizes`, `spec.modelServerSizes` and the
    /// notebook controller toleration settings.
    ///
    /// A missing `spec` map is an error. Missing size lists decode as empty;
    /// a size list of the wrong shape also decodes as empty and is named in
    /// [`malformed_size_lists`](Self::malformed_size_lists).
    pub fn from_object(object: &DynamicObject) -> Result<Self> {
        let spec = object
            .get_field("spec")
            .filter(|spec| spec.is_object())
            .ok_or_else(|| CoreError::missing_field(object.key().to_string(), "spec"))?;

        let mut malformed_size_lists = Vec::new();
        let mut sizes = |key: &str| {
            presets(spec, key).unwrap_or_else(|| {
                malformed_size_lists.push(key.to_string());
                Vec::new()
            })
        };
        let notebook_sizes = sizes(NOTEBOOK_SIZES);
        let model_server_sizes = sizes(MODEL_SERVER_SIZES);

        Ok(Self {
            notebook_sizes,
            model_server_sizes,
            notebooks_only_toleration: notebooks_only_toleration(spec),
            malformed_size_lists,
        })
    }

    /// Notebook size whose name matches case-insensitively.
    pub fn notebook_size(&self, name: &str) -> Option<&SizedPreset> {
        self.notebook_sizes
            .iter()
            .find(|size| size.name.eq_ignore_ascii_case(name))
    }

    pub fn notebooks_only_tolerations(&self) -> Vec<Toleration> {
        self.notebooks_only_toleration.iter().cloned().collect()
    }
}

pub const NOTEBOOK_SIZES: &str = "notebookSizes";
pub const MODEL_SERVER_SIZES: &str = "modelServerSizes";

/// `None` when the field holds something other than a list.
fn presets(spec: &Value, key: &str) -> Option<Vec<SizedPreset>> {
    match spec.get(key) {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(Value::Array(items)) => Some(items.iter().filter_map(SizedPreset::from_value).collect()),
        Some(_) => None,
    }
}

fn notebooks_only_toleration(spec: &Value) -> Option<Toleration> {
    if decode::nested_bool(spec, &["notebookController", "enabled"]) != Some(true) {
        return None;
    }
    let settings = decode::nested_object(spec, &["notebookController", "notebookTolerationSettings"])?;
    if settings.get("enabled").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let toleration = Toleration::from_map(settings);
    if toleration.key.is_empty() {
        return None;
    }
    Some(toleration)
}
