//! Pure conversions from legacy shapes to [`HardwareProfile`] values.
//!
//! Generators never touch the store or the clock: the modification
//! timestamp is passed in so a run stamps every profile identically.

use crate::aggregate::ResourceBounds;
use crate::error::GenerateError;
use hwp_core::wellknown::{
    CONTAINER_SIZE_PREFIX, CUSTOM_SERVING_PROFILE, DESCRIPTION_ANNOTATION, DISABLED_ANNOTATION,
    DISPLAY_NAME_ANNOTATION, FEATURE_VISIBILITY_ANNOTATION, MODIFIED_DATE_ANNOTATION,
    SERVING_MIN_CPU, SERVING_MIN_MEMORY, sanitize_name,
};
use hwp_core::{
    HardwareIdentifier, HardwareProfile, HardwareProfileSpec, HardwareResourceType, IntOrString,
    LegacyAcceleratorProfile, ProfileType, SchedulingSpec, SizedPreset, Toleration,
};
use std::collections::BTreeMap;
use tracing::debug;

const CPU_IDENTIFIER: &str = "cpu";
const MEMORY_IDENTIFIER: &str = "memory";

/// `<accelerator-profile>-<type>`.
pub fn accelerator_profile_name(source: &str, profile_type: ProfileType) -> String {
    format!("{source}-{profile_type}")
}

/// `containerSize-<sanitized size>-<type>`.
pub fn container_size_profile_name(size: &str, profile_type: ProfileType) -> String {
    format!("{CONTAINER_SIZE_PREFIX}{}-{profile_type}", sanitize_name(size))
}

/// Value of the dashboard feature-visibility annotation, a JSON list.
pub fn feature_visibility(profile_type: ProfileType) -> String {
    format!("[\"{}\"]", profile_type.feature_visibility())
}

/// The five annotations every generated profile carries.
pub fn reserved_annotations(
    profile_type: ProfileType,
    display_name: &str,
    description: &str,
    disabled: bool,
    modified_at: &str,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            FEATURE_VISIBILITY_ANNOTATION.to_string(),
            feature_visibility(profile_type),
        ),
        (MODIFIED_DATE_ANNOTATION.to_string(), modified_at.to_string()),
        (DISPLAY_NAME_ANNOTATION.to_string(), display_name.to_string()),
        (DESCRIPTION_ANNOTATION.to_string(), description.to_string()),
        (DISABLED_ANNOTATION.to_string(), disabled.to_string()),
    ])
}

fn count_identifier(
    identifier: &str,
    resource_type: HardwareResourceType,
    min: &str,
    max: Option<&str>,
) -> HardwareIdentifier {
    HardwareIdentifier {
        identifier: identifier.to_string(),
        display_name: identifier.to_string(),
        resource_type,
        min_count: IntOrString::from(min),
        default_count: IntOrString::from(min),
        max_count: max.map(IntOrString::from),
    }
}

/// Build the `notebooks` or `serving` profile for one accelerator profile.
///
/// Notebooks profiles take CPU/memory bounds from `bounds`; serving
/// profiles use fixed minimums and no maximum. `extra_tolerations` is only
/// applied to notebooks profiles. Generated annotations replace source
/// annotations with the same key.
pub fn from_accelerator_profile(
    ap: &LegacyAcceleratorProfile,
    profile_type: ProfileType,
    bounds: &ResourceBounds,
    extra_tolerations: &[Toleration],
    modified_at: &str,
) -> Result<HardwareProfile, GenerateError> {
    let spec = ap.spec.as_ref().ok_or_else(|| GenerateError::MissingSpec {
        namespace: ap.namespace.clone(),
        name: ap.name.clone(),
    })?;

    let mut annotations = ap.annotations.clone();
    annotations.extend(reserved_annotations(
        profile_type,
        &spec.display_name,
        &spec.description,
        !spec.enabled,
        modified_at,
    ));

    let accelerator = HardwareIdentifier {
        identifier: spec.identifier.clone(),
        display_name: spec.identifier.clone(),
        resource_type: HardwareResourceType::Accelerator,
        min_count: IntOrString::Int(1),
        default_count: IntOrString::Int(1),
        max_count: None,
    };
    let (cpu, memory) = match profile_type {
        ProfileType::Notebooks => (
            count_identifier(
                CPU_IDENTIFIER,
                HardwareResourceType::Cpu,
                &bounds.min_cpu,
                bounds.max_cpu.as_deref(),
            ),
            count_identifier(
                MEMORY_IDENTIFIER,
                HardwareResourceType::Memory,
                &bounds.min_memory,
                bounds.max_memory.as_deref(),
            ),
        ),
        ProfileType::Serving => (
            count_identifier(CPU_IDENTIFIER, HardwareResourceType::Cpu, SERVING_MIN_CPU, None),
            count_identifier(
                MEMORY_IDENTIFIER,
                HardwareResourceType::Memory,
                SERVING_MIN_MEMORY,
                None,
            ),
        ),
    };

    let mut tolerations = spec.tolerations.clone();
    if profile_type == ProfileType::Notebooks {
        tolerations.extend_from_slice(extra_tolerations);
    }

    let name = accelerator_profile_name(&ap.name, profile_type);
    debug!(
        name = %name,
        namespace = %ap.namespace,
        accelerator_profile = %ap.name,
        profile_type = %profile_type,
        "Generated HardwareProfile from AcceleratorProfile"
    );

    Ok(HardwareProfile {
        name,
        namespace: ap.namespace.clone(),
        annotations,
        spec: HardwareProfileSpec {
            identifiers: vec![accelerator, cpu, memory],
            scheduling_spec: SchedulingSpec::with_tolerations(tolerations),
        },
    })
}

/// Build the profile for one container size, living in `namespace`.
///
/// CPU and memory take the preset's request as minimum and default and its
/// limit as maximum.
pub fn from_sized_preset(
    preset: &SizedPreset,
    profile_type: ProfileType,
    extra_tolerations: &[Toleration],
    namespace: &str,
    modified_at: &str,
) -> HardwareProfile {
    let name = container_size_profile_name(&preset.name, profile_type);
    debug!(
        name = %name,
        namespace,
        size = %preset.name,
        profile_type = %profile_type,
        "Generated HardwareProfile from container size"
    );

    HardwareProfile {
        name,
        namespace: namespace.to_string(),
        annotations: reserved_annotations(profile_type, &preset.name, "", false, modified_at),
        spec: HardwareProfileSpec {
            identifiers: vec![
                count_identifier(
                    CPU_IDENTIFIER,
                    HardwareResourceType::Cpu,
                    &preset.requests.cpu,
                    Some(preset.limits.cpu.as_str()),
                ),
                count_identifier(
                    MEMORY_IDENTIFIER,
                    HardwareResourceType::Memory,
                    &preset.requests.memory,
                    Some(preset.limits.memory.as_str()),
                ),
            ],
            scheduling_spec: SchedulingSpec::with_tolerations(extra_tolerations.to_vec()),
        },
    }
}

/// The fallback serving profile for inference services without any
/// matching reference.
pub fn custom_serving(namespace: &str, modified_at: &str) -> HardwareProfile {
    HardwareProfile {
        name: CUSTOM_SERVING_PROFILE.to_string(),
        namespace: namespace.to_string(),
        annotations: reserved_annotations(
            ProfileType::Serving,
            CUSTOM_SERVING_PROFILE,
            "",
            false,
            modified_at,
        ),
        spec: HardwareProfileSpec {
            identifiers: vec![
                count_identifier(CPU_IDENTIFIER, HardwareResourceType::Cpu, SERVING_MIN_CPU, None),
                count_identifier(
                    MEMORY_IDENTIFIER,
                    HardwareResourceType::Memory,
                    SERVING_MIN_MEMORY,
                    None,
                ),
            ],
            scheduling_spec: None,
        },
    }
}
