//! Pointing workloads at the hardware profile that replaces their legacy
//! references.
//!
//! Resolution order, first match wins:
//! 1. accelerator-name annotation (inference services also inherit it from
//!    their serving runtime),
//! 2. size selection (notebook annotation, or inference service resources
//!    equal to a model server size),
//! 3. `custom-serving` for inference services.
//!
//! Workloads that already name a profile, live in a Kueue-managed namespace
//! without a queue label, or run serverless are left alone.

use crate::cancel::cancellable;
use crate::error::{MigrationError, StepError};
use crate::generator::{accelerator_profile_name, container_size_profile_name};
use crate::report::PhaseResult;
use hwp_core::wellknown::{
    ACCELERATOR_NAME_ANNOTATION, CONTAINER_SIZE_PREFIX, CUSTOM_SERVING_PROFILE,
    HARDWARE_PROFILE_NAME_ANNOTATION, HARDWARE_PROFILE_NAMESPACE_ANNOTATION, KUEUE_MANAGED_LABEL,
    KUEUE_MANAGED_LEGACY_LABEL, sanitize_name,
};
use hwp_core::workload::{has_hardware_profile, queue_name};
use hwp_core::{
    DashboardConfig, DynamicObject, InferenceServiceRefs, Kind, NotebookRefs, ObjectKey,
    ProfileType,
};
use hwp_store::ObjectStore;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Workload collections the matcher annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Notebook,
    InferenceService,
}

impl WorkloadKind {
    pub fn kind(&self) -> Kind {
        match self {
            WorkloadKind::Notebook => Kind::Notebook,
            WorkloadKind::InferenceService => Kind::InferenceService,
        }
    }

    pub fn profile_type(&self) -> ProfileType {
        match self {
            WorkloadKind::Notebook => ProfileType::Notebooks,
            WorkloadKind::InferenceService => ProfileType::Serving,
        }
    }
}

/// Name of the hardware profile a workload should reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTarget {
    pub name: String,
}

impl ProfileTarget {
    pub fn accelerator(accelerator: &str, profile_type: ProfileType) -> Self {
        Self {
            name: accelerator_profile_name(&sanitize_name(accelerator), profile_type),
        }
    }

    pub fn container_size(size: &str, profile_type: ProfileType) -> Self {
        Self {
            name: container_size_profile_name(size, profile_type),
        }
    }

    pub fn custom_serving() -> Self {
        Self {
            name: CUSTOM_SERVING_PROFILE.to_string(),
        }
    }

    /// Container-size and custom-serving profiles live in the application
    /// namespace rather than next to the workload.
    pub fn in_application_namespace(&self) -> bool {
        self.name.starts_with(CONTAINER_SIZE_PREFIX) || self.name == CUSTOM_SERVING_PROFILE
    }

    /// Write the profile annotations onto `object`.
    pub fn apply(&self, object: &mut DynamicObject, application_namespace: &str) {
        let annotations = &mut object.metadata.annotations;
        annotations.insert(HARDWARE_PROFILE_NAME_ANNOTATION.to_string(), self.name.clone());
        if self.in_application_namespace() {
            annotations.insert(
                HARDWARE_PROFILE_NAMESPACE_ANNOTATION.to_string(),
                application_namespace.to_string(),
            );
        }
    }
}

/// Why a workload keeps its current annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    AlreadyAnnotated,
    /// Kueue-managed namespace and no queue label; admission would reject
    /// the update.
    QueueManaged,
    Serverless,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Target(ProfileTarget),
    Exempt(Exemption),
    NoMatch,
}

/// Resolve a notebook from its own annotations.
///
/// A size selection only counts when the dashboard still lists that size.
pub fn resolve_notebook(refs: &NotebookRefs, dashboard: &DashboardConfig) -> Option<ProfileTarget> {
    if let Some(accelerator) = &refs.accelerator {
        return Some(ProfileTarget::accelerator(accelerator, ProfileType::Notebooks));
    }
    let size = dashboard.notebook_size(refs.size_selection.as_deref()?)?;
    Some(ProfileTarget::container_size(&size.name, ProfileType::Notebooks))
}

/// Resolve an inference service. Always yields a target, falling back to
/// `custom-serving`.
pub fn resolve_inference_service(
    refs: &InferenceServiceRefs,
    runtime_accelerator: Option<&str>,
    dashboard: &DashboardConfig,
) -> ProfileTarget {
    if let Some(accelerator) = refs.accelerator.as_deref().or(runtime_accelerator) {
        return ProfileTarget::accelerator(accelerator, ProfileType::Serving);
    }
    if let Some(resources) = &refs.resources {
        if let Some(size) = dashboard
            .model_server_sizes
            .iter()
            .find(|size| resources.matches(size))
        {
            return ProfileTarget::container_size(&size.name, ProfileType::Serving);
        }
    }
    ProfileTarget::custom_serving()
}

/// Annotates workloads, caching namespace lookups for the duration of a run.
pub struct AnnotationMatcher<'a> {
    store: &'a dyn ObjectStore,
    dashboard: &'a DashboardConfig,
    application_namespace: &'a str,
    queue_managed: HashMap<String, bool>,
}

impl<'a> AnnotationMatcher<'a> {
    pub fn new(
        store: &'a dyn ObjectStore,
        dashboard: &'a DashboardConfig,
        application_namespace: &'a str,
    ) -> Self {
        Self {
            store,
            dashboard,
            application_namespace,
            queue_managed: HashMap::new(),
        }
    }

    /// Whether the namespace carries a Kueue-managed label. A missing
    /// namespace, or a store without namespaces, counts as unmanaged.
    async fn is_queue_managed(&mut self, namespace: &str) -> Result<bool, StepError> {
        if let Some(managed) = self.queue_managed.get(namespace) {
            return Ok(*managed);
        }
        let managed = match self.store.get(&Kind::Namespace, None, namespace).await {
            Ok(Some(ns)) => {
                ns.label(KUEUE_MANAGED_LABEL) == Some("true")
                    || ns.label(KUEUE_MANAGED_LEGACY_LABEL) == Some("true")
            }
            Ok(None) => false,
            Err(e) if e.is_no_such_kind() || e.is_not_found() => false,
            Err(source) => {
                return Err(StepError::Lookup {
                    key: ObjectKey::new(Kind::Namespace, None, namespace),
                    source,
                });
            }
        };
        self.queue_managed.insert(namespace.to_string(), managed);
        Ok(managed)
    }

    /// A workload without a queue label in a Kueue-managed namespace.
    async fn is_queue_exempt(&mut self, object: &DynamicObject) -> Result<bool, StepError> {
        match object.namespace() {
            Some(namespace) if queue_name(object).is_none() => {
                self.is_queue_managed(namespace).await
            }
            _ => Ok(false),
        }
    }

    /// Accelerator named by the inference service's serving runtime.
    async fn runtime_accelerator(
        &self,
        isvc: &DynamicObject,
        runtime: &str,
    ) -> Result<Option<String>, StepError> {
        match self
            .store
            .get(&Kind::ServingRuntime, isvc.namespace(), runtime)
            .await
        {
            Ok(Some(sr)) => Ok(sr
                .annotation(ACCELERATOR_NAME_ANNOTATION)
                .filter(|name| !name.is_empty())
                .map(str::to_string)),
            Ok(None) => Ok(None),
            Err(e) if e.is_no_such_kind() || e.is_not_found() => Ok(None),
            Err(source) => Err(StepError::Lookup {
                key: ObjectKey::new(Kind::ServingRuntime, isvc.namespace(), runtime),
                source,
            }),
        }
    }

    /// Decide what a workload should be annotated with, without writing.
    ///
    /// The namespace is only looked up once a profile has been chosen, so a
    /// failed lookup never affects workloads that would be skipped anyway.
    pub async fn resolve(
        &mut self,
        workload: WorkloadKind,
        object: &DynamicObject,
    ) -> Result<Resolution, StepError> {
        if has_hardware_profile(object) {
            return Ok(Resolution::Exempt(Exemption::AlreadyAnnotated));
        }

        match workload {
            WorkloadKind::Notebook => {
                let refs = NotebookRefs::from_object(object);
                let Some(target) = resolve_notebook(&refs, self.dashboard) else {
                    return Ok(Resolution::NoMatch);
                };
                if self.is_queue_exempt(object).await? {
                    return Ok(Resolution::Exempt(Exemption::QueueManaged));
                }
                Ok(Resolution::Target(target))
            }
            WorkloadKind::InferenceService => {
                let refs = InferenceServiceRefs::from_object(object);
                if refs.serverless {
                    return Ok(Resolution::Exempt(Exemption::Serverless));
                }
                if self.is_queue_exempt(object).await? {
                    return Ok(Resolution::Exempt(Exemption::QueueManaged));
                }
                let runtime_accelerator = match (&refs.accelerator, &refs.runtime) {
                    (None, Some(runtime)) => self.runtime_accelerator(object, runtime).await?,
                    _ => None,
                };
                Ok(Resolution::Target(resolve_inference_service(
                    &refs,
                    runtime_accelerator.as_deref(),
                    self.dashboard,
                )))
            }
        }
    }

    /// Resolve and, on a target, persist the annotation with one update.
    pub async fn annotate(
        &mut self,
        workload: WorkloadKind,
        object: &DynamicObject,
    ) -> Result<Resolution, StepError> {
        let resolution = self.resolve(workload, object).await?;
        if let Resolution::Target(target) = &resolution {
            let mut updated = object.clone();
            target.apply(&mut updated, self.application_namespace);
            self.store
                .update(&updated)
                .await
                .map_err(|source| StepError::Annotate {
                    key: object.key(),
                    profile: target.name.clone(),
                    source,
                })?;
            info!(
                kind = %object.kind,
                namespace = object.namespace().unwrap_or_default(),
                name = object.name(),
                hardware_profile = %target.name,
                "Annotated workload with HardwareProfile"
            );
        }
        Ok(resolution)
    }

    /// Annotate every workload of one kind across all namespaces.
    pub async fn annotate_all(
        &mut self,
        workload: WorkloadKind,
        cancel: &CancellationToken,
    ) -> Result<PhaseResult, MigrationError> {
        let kind = workload.kind();
        let mut result = PhaseResult::default();

        let objects = match cancellable(cancel, self.store.list(&kind, None)).await? {
            Ok(objects) => objects,
            Err(source) => {
                warn!(kind = %kind, error = %source, category = %source.category(), "Failed to list workloads");
                result.failed(StepError::List {
                    kind,
                    namespace: None,
                    source,
                });
                return Ok(result);
            }
        };

        for object in &objects {
            match cancellable(cancel, self.annotate(workload, object)).await? {
                Ok(Resolution::Target(_)) => result.applied(),
                Ok(Resolution::Exempt(Exemption::AlreadyAnnotated)) => result.unchanged(),
                Ok(Resolution::Exempt(exemption)) => {
                    debug!(
                        kind = %kind,
                        namespace = object.namespace().unwrap_or_default(),
                        name = object.name(),
                        ?exemption,
                        "Workload exempt from annotation"
                    );
                    result.skipped();
                }
                Ok(Resolution::NoMatch) => {
                    debug!(
                        kind = %kind,
                        namespace = object.namespace().unwrap_or_default(),
                        name = object.name(),
                        "No legacy reference on workload"
                    );
                    result.skipped();
                }
                Err(e) => {
                    warn!(error = %e, "Workload annotation failed");
                    result.failed(e);
                }
            }
        }
        Ok(result)
    }
}
