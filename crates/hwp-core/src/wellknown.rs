//! Annotation keys, label keys and fixed names shared by the migration.

pub const HARDWARE_PROFILE_NAME_ANNOTATION: &str = "opendatahub.io/hardware-profile-name";
pub const HARDWARE_PROFILE_NAMESPACE_ANNOTATION: &str =
    "opendatahub.io/hardware-profile-namespace";
pub const ACCELERATOR_NAME_ANNOTATION: &str = "opendatahub.io/accelerator-name";
pub const LAST_SIZE_SELECTION_ANNOTATION: &str = "notebooks.opendatahub.io/last-size-selection";

pub const FEATURE_VISIBILITY_ANNOTATION: &str = "opendatahub.io/dashboard-feature-visibility";
pub const DISPLAY_NAME_ANNOTATION: &str = "opendatahub.io/display-name";
pub const DESCRIPTION_ANNOTATION: &str = "opendatahub.io/description";
pub const DISABLED_ANNOTATION: &str = "opendatahub.io/disabled";
pub const MODIFIED_DATE_ANNOTATION: &str = "opendatahub.io/modified-date";

pub const FEATURE_VISIBILITY_WORKBENCH: &str = "workbench";
pub const FEATURE_VISIBILITY_MODEL_SERVING: &str = "model-serving";

pub const DEPLOYMENT_MODE_ANNOTATION: &str = "serving.kserve.io/deploymentMode";
pub const DEPLOYMENT_MODE_SERVERLESS: &str = "Serverless";

pub const KUEUE_MANAGED_LABEL: &str = "kueue.openshift.io/managed";
pub const KUEUE_MANAGED_LEGACY_LABEL: &str = "kueue-managed";
pub const KUEUE_QUEUE_NAME_LABEL: &str = "kueue.x-k8s.io/queue-name";

/// Prefix of profiles generated from dashboard container sizes.
pub const CONTAINER_SIZE_PREFIX: &str = "containerSize-";
pub const CUSTOM_SERVING_PROFILE: &str = "custom-serving";
pub const DEFAULT_DASHBOARD_CONFIG_NAME: &str = "odh-dashboard-config";

pub const DEFAULT_MIN_CPU: &str = "1";
pub const DEFAULT_MIN_MEMORY: &str = "1Mi";
pub const SERVING_MIN_CPU: &str = "1";
pub const SERVING_MIN_MEMORY: &str = "1Gi";

/// Lower-case and replace spaces with dashes, as profile names require.
pub fn sanitize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("X Large"), "x-large");
        assert_eq!(sanitize_name("nvidia Gpu"), "nvidia-gpu");
        assert_eq!(sanitize_name("small"), "small");
        assert_eq!(sanitize_name("  Two  Spaces"), "--two--spaces");
    }
}
