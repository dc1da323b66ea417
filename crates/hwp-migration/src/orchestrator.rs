//! One full migration pass.
//!
//! Phases run in a fixed order: accelerator profiles, container sizes,
//! `custom-serving`, then notebook and inference service annotation.
//! Item failures accumulate in the report; capability check failures and
//! cancellation end the run.

use crate::aggregate::{ResourceBounds, aggregate};
use crate::cancel::cancellable;
use crate::error::{MigrationError, ProfileOrigin, StepError};
use crate::generator::{custom_serving, from_accelerator_profile, from_sized_preset};
use crate::matcher::{AnnotationMatcher, WorkloadKind};
use crate::report::{MigrationReport, Phase, PhaseResult, SkipReason};
use crate::upsert::upsert_all;
use hwp_config::{MigrationSettings, resolve_dashboard_config};
use hwp_core::{
    DashboardConfig, HardwareProfile, Kind, LegacyAcceleratorProfile, ProfileType, now_rfc3339,
};
use hwp_store::{CapabilityCheck, ObjectStore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Resolve the dashboard config through the store (or manifest fallback)
/// and run [`migrate`].
pub async fn run(
    store: &dyn ObjectStore,
    settings: &MigrationSettings,
    cancel: &CancellationToken,
) -> Result<MigrationReport, MigrationError> {
    if settings.application_namespace.is_empty() {
        info!("Application namespace is empty, skipping HardwareProfile migration");
        return Ok(MigrationReport::skipped(SkipReason::NoApplicationNamespace));
    }
    let loaded = cancellable(cancel, resolve_dashboard_config(store, settings)).await??;
    if let Some(loaded) = &loaded {
        debug!(origin = ?loaded.origin, "Using dashboard config");
    }
    migrate(store, settings, loaded.as_ref().map(|l| &l.config), cancel).await
}

/// Run every migration phase against `store`.
///
/// `dashboard` is the already materialized dashboard configuration; `None`
/// skips the run.
pub async fn migrate(
    store: &dyn ObjectStore,
    settings: &MigrationSettings,
    dashboard: Option<&DashboardConfig>,
    cancel: &CancellationToken,
) -> Result<MigrationReport, MigrationError> {
    let namespace = settings.application_namespace.as_str();
    if namespace.is_empty() {
        info!("Application namespace is empty, skipping HardwareProfile migration");
        return Ok(MigrationReport::skipped(SkipReason::NoApplicationNamespace));
    }

    if !kind_available(store, &Kind::HardwareProfile, cancel).await? {
        info!("HardwareProfile kind is not installed, skipping migration");
        return Ok(MigrationReport::skipped(
            SkipReason::HardwareProfileKindUnavailable,
        ));
    }

    let Some(dashboard) = dashboard else {
        info!(namespace, "OdhDashboardConfig not found, skipping HardwareProfile migration");
        return Ok(MigrationReport::skipped(SkipReason::DashboardConfigAbsent));
    };

    let modified_at = now_rfc3339().map_err(MigrationError::Timestamp)?;
    let migration = Migration {
        store,
        dashboard,
        namespace,
        modified_at,
        cancel,
    };
    info!(namespace, backend = store.backend_name(), "Starting HardwareProfile migration");

    let mut report = MigrationReport::default();
    if kind_available(store, &Kind::AcceleratorProfile, cancel).await? {
        report.record(
            Phase::AcceleratorProfiles,
            migration.accelerator_profiles().await?,
        );
    } else {
        debug!("AcceleratorProfile kind is not installed, skipping phase");
    }
    report.record(Phase::ContainerSizes, migration.container_sizes().await?);
    report.record(Phase::CustomServing, migration.custom_serving().await?);

    let mut matcher = AnnotationMatcher::new(store, dashboard, namespace);
    for (phase, workload) in [
        (Phase::Notebooks, WorkloadKind::Notebook),
        (Phase::InferenceServices, WorkloadKind::InferenceService),
    ] {
        if kind_available(store, &workload.kind(), cancel).await? {
            report.record(phase, matcher.annotate_all(workload, cancel).await?);
        } else {
            debug!(kind = %workload.kind(), "Workload kind is not installed, skipping phase");
        }
    }

    if report.is_success() {
        info!(namespace, "HardwareProfile migration finished");
    } else {
        warn!(
            namespace,
            errors = report.errors.len(),
            "HardwareProfile migration finished with errors"
        );
    }
    Ok(report)
}

/// `Unavailable` skips quietly; a failed check is fatal.
async fn kind_available(
    store: &dyn ObjectStore,
    kind: &Kind,
    cancel: &CancellationToken,
) -> Result<bool, MigrationError> {
    match cancellable(cancel, store.check_kind(kind)).await? {
        CapabilityCheck::Available => Ok(true),
        CapabilityCheck::Unavailable => Ok(false),
        CapabilityCheck::CheckFailed(source) => Err(MigrationError::CapabilityCheck {
            kind: kind.clone(),
            source,
        }),
    }
}

struct Migration<'a> {
    store: &'a dyn ObjectStore,
    dashboard: &'a DashboardConfig,
    namespace: &'a str,
    modified_at: String,
    cancel: &'a CancellationToken,
}

impl Migration<'_> {
    /// Two profiles per accelerator profile, one per profile type.
    async fn accelerator_profiles(&self) -> Result<PhaseResult, MigrationError> {
        let mut result = PhaseResult::default();
        let kind = Kind::AcceleratorProfile;

        let objects = match cancellable(self.cancel, self.store.list(&kind, None)).await? {
            Ok(objects) => objects,
            Err(source) => {
                warn!(error = %source, category = %source.category(), "Failed to list AcceleratorProfiles");
                result.failed(StepError::List {
                    kind,
                    namespace: None,
                    source,
                });
                return Ok(result);
            }
        };
        if objects.is_empty() {
            info!("No AcceleratorProfiles found, skipping phase");
            return Ok(result);
        }

        // Without bounds only the serving profiles can be generated.
        let notebook_bounds = match aggregate(&self.dashboard.notebook_sizes) {
            Ok(bounds) => Some(bounds),
            Err(e) => {
                warn!(error = %e, "Notebook size bounds unavailable");
                result.failed(e);
                None
            }
        };
        let serving_bounds = ResourceBounds::default();
        let tolerations = self.dashboard.notebooks_only_tolerations();

        let mut profiles = Vec::with_capacity(objects.len() * 2);
        for object in &objects {
            let ap = LegacyAcceleratorProfile::from_object(object);
            let origin = ProfileOrigin::AcceleratorProfile {
                namespace: ap.namespace.clone(),
                name: ap.name.clone(),
            };
            for profile_type in [ProfileType::Notebooks, ProfileType::Serving] {
                let bounds = match profile_type {
                    ProfileType::Notebooks => match &notebook_bounds {
                        Some(bounds) => bounds,
                        None => {
                            result.skipped();
                            continue;
                        }
                    },
                    ProfileType::Serving => &serving_bounds,
                };
                match from_accelerator_profile(
                    &ap,
                    profile_type,
                    bounds,
                    &tolerations,
                    &self.modified_at,
                ) {
                    Ok(profile) => profiles.push((profile, origin.clone())),
                    Err(source) => {
                        warn!(error = %source, profile_type = %profile_type, "Skipping AcceleratorProfile");
                        result.failed(StepError::Generate {
                            origin: origin.clone(),
                            profile_type,
                            source,
                        });
                    }
                }
            }
        }

        result.merge(upsert_all(self.store, profiles, self.cancel).await?);
        Ok(result)
    }

    /// One profile per notebook size and per model server size, all in the
    /// application namespace.
    async fn container_sizes(&self) -> Result<PhaseResult, MigrationError> {
        let tolerations = self.dashboard.notebooks_only_tolerations();
        let notebooks = self.dashboard.notebook_sizes.iter().map(|preset| {
            (
                from_sized_preset(
                    preset,
                    ProfileType::Notebooks,
                    &tolerations,
                    self.namespace,
                    &self.modified_at,
                ),
                ProfileOrigin::ContainerSize {
                    name: preset.name.clone(),
                },
            )
        });
        let serving = self.dashboard.model_server_sizes.iter().map(|preset| {
            (
                from_sized_preset(
                    preset,
                    ProfileType::Serving,
                    &[],
                    self.namespace,
                    &self.modified_at,
                ),
                ProfileOrigin::ContainerSize {
                    name: preset.name.clone(),
                },
            )
        });
        let profiles: Vec<(HardwareProfile, ProfileOrigin)> = notebooks.chain(serving).collect();

        let mut result = PhaseResult::default();
        for field in &self.dashboard.malformed_size_lists {
            warn!(field = %field, "Ignoring container size list that is not a list");
            result.failed(StepError::MalformedSizeList {
                field: field.clone(),
            });
        }
        result.merge(upsert_all(self.store, profiles, self.cancel).await?);
        Ok(result)
    }

    async fn custom_serving(&self) -> Result<PhaseResult, MigrationError> {
        let profile = custom_serving(self.namespace, &self.modified_at);
        upsert_all(
            self.store,
            [(profile, ProfileOrigin::CustomServing)],
            self.cancel,
        )
        .await
    }
}
