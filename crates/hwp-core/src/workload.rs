//! References a workload carries toward legacy profiles.

use crate::decode;
use crate::model::{ResourcePair, SizedPreset};
use crate::resource::DynamicObject;
use crate::wellknown::{
    ACCELERATOR_NAME_ANNOTATION, DEPLOYMENT_MODE_ANNOTATION, DEPLOYMENT_MODE_SERVERLESS,
    HARDWARE_PROFILE_NAME_ANNOTATION, KUEUE_QUEUE_NAME_LABEL, LAST_SIZE_SELECTION_ANNOTATION,
};

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Whether the object already points at a hardware profile.
pub fn has_hardware_profile(object: &DynamicObject) -> bool {
    object
        .metadata
        .annotations
        .contains_key(HARDWARE_PROFILE_NAME_ANNOTATION)
}

pub fn queue_name(object: &DynamicObject) -> Option<String> {
    non_empty(object.label(KUEUE_QUEUE_NAME_LABEL))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotebookRefs {
    pub accelerator: Option<String>,
    pub size_selection: Option<String>,
}

impl NotebookRefs {
    pub fn from_object(object: &DynamicObject) -> Self {
        Self {
            accelerator: non_empty(object.annotation(ACCELERATOR_NAME_ANNOTATION)),
            size_selection: non_empty(object.annotation(LAST_SIZE_SELECTION_ANNOTATION)),
        }
    }
}

/// Requests and limits declared on an inference service model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelResources {
    pub requests: ResourcePair,
    pub limits: ResourcePair,
}

impl ModelResources {
    /// Literal string comparison of all four values.
    pub fn matches(&self, preset: &SizedPreset) -> bool {
        self.requests == preset.requests && self.limits == preset.limits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InferenceServiceRefs {
    pub accelerator: Option<String>,
    pub runtime: Option<String>,
    /// Present only when both `requests` and `limits` maps exist.
    pub resources: Option<ModelResources>,
    pub serverless: bool,
}

impl InferenceServiceRefs {
    pub fn from_object(object: &DynamicObject) -> Self {
        let resources = object
            .field(&["spec", "predictor", "model", "resources"])
            .and_then(|resources| {
                let requests = decode::nested_object(resources, &["requests"])?;
                let limits = decode::nested_object(resources, &["limits"])?;
                Some(ModelResources {
                    requests: ResourcePair::new(
                        decode::str_or_empty(requests, "cpu"),
                        decode::str_or_empty(requests, "memory"),
                    ),
                    limits: ResourcePair::new(
                        decode::str_or_empty(limits, "cpu"),
                        decode::str_or_empty(limits, "memory"),
                    ),
                })
            });

        let serverless = object.annotation(DEPLOYMENT_MODE_ANNOTATION) == Some(DEPLOYMENT_MODE_SERVERLESS)
            || object.field_str(&["status", "deploymentMode"]) == Some(DEPLOYMENT_MODE_SERVERLESS);

        Self {
            accelerator: non_empty(object.annotation(ACCELERATOR_NAME_ANNOTATION)),
            runtime: non_empty(object.field_str(&["spec", "predictor", "model", "runtime"])),
            resources,
            serverless,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;
    use serde_json::json;

    #[test]
    fn test_notebook_refs() {
        let nb = DynamicObject::new(Kind::Notebook, Some("ns"), "nb")
            .with_annotation(ACCELERATOR_NAME_ANNOTATION, "gpu-profile")
            .with_annotation(LAST_SIZE_SELECTION_ANNOTATION, "");
        let refs = NotebookRefs::from_object(&nb);
        assert_eq!(refs.accelerator.as_deref(), Some("gpu-profile"));
        assert!(refs.size_selection.is_none());
        assert!(!has_hardware_profile(&nb));
        assert!(queue_name(&nb).is_none());
    }

    #[test]
    fn test_existing_profile_and_queue_label() {
        let nb = DynamicObject::new(Kind::Notebook, Some("ns"), "nb")
            .with_annotation(HARDWARE_PROFILE_NAME_ANNOTATION, "already-set")
            .with_label(KUEUE_QUEUE_NAME_LABEL, "default");
        assert!(has_hardware_profile(&nb));
        assert_eq!(queue_name(&nb).as_deref(), Some("default"));
    }

    #[test]
    fn test_inference_service_refs() {
        let isvc = DynamicObject::new(Kind::InferenceService, Some("ns"), "isvc").with_field(
            "spec",
            json!({"predictor": {"model": {
                "runtime": "ovms",
                "resources": {
                    "requests": {"cpu": "1", "memory": "4Gi"},
                    "limits": {"cpu": "2", "memory": "8Gi"}
                }
            }}}),
        );
        let refs = InferenceServiceRefs::from_object(&isvc);
        assert_eq!(refs.runtime.as_deref(), Some("ovms"));
        assert!(!refs.serverless);

        let resources = refs.resources.unwrap();
        let small = SizedPreset::new(
            "Small",
            ResourcePair::new("1", "4Gi"),
            ResourcePair::new("2", "8Gi"),
        );
        assert!(resources.matches(&small));

        let equivalent = SizedPreset::new(
            "Small",
            ResourcePair::new("1000m", "4Gi"),
            ResourcePair::new("2", "8Gi"),
        );
        assert!(!resources.matches(&equivalent));
    }

    #[test]
    fn test_inference_service_resources_need_both_maps() {
        let isvc = DynamicObject::new(Kind::InferenceService, Some("ns"), "isvc").with_field(
            "spec",
            json!({"predictor": {"model": {"resources": {"requests": {"cpu": "1"}}}}}),
        );
        assert!(InferenceServiceRefs::from_object(&isvc).resources.is_none());
    }

    #[test]
    fn test_serverless_detection() {
        let by_annotation = DynamicObject::new(Kind::InferenceService, Some("ns"), "a")
            .with_annotation(DEPLOYMENT_MODE_ANNOTATION, "Serverless");
        assert!(InferenceServiceRefs::from_object(&by_annotation).serverless);

        let by_status = DynamicObject::new(Kind::InferenceService, Some("ns"), "b")
            .with_field("status", json!({"deploymentMode": "Serverless"}));
        assert!(InferenceServiceRefs::from_object(&by_status).serverless);

        let raw = DynamicObject::new(Kind::InferenceService, Some("ns"), "c")
            .with_annotation(DEPLOYMENT_MODE_ANNOTATION, "RawDeployment");
        assert!(!InferenceServiceRefs::from_object(&raw).serverless);
    }
}
