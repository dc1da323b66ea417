//! Create-if-absent writes of generated profiles.
//!
//! An existing profile is never updated, so edits users made to a
//! migrated profile survive every later run.

use crate::cancel::cancellable;
use crate::error::{MigrationError, ProfileOrigin, StepError};
use crate::report::PhaseResult;
use hwp_core::HardwareProfile;
use hwp_store::ObjectStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    AlreadyExists,
}

/// Create `profile` unless an object with its name already exists.
pub async fn upsert_profile(
    store: &dyn ObjectStore,
    profile: &HardwareProfile,
    origin: &ProfileOrigin,
) -> Result<UpsertOutcome, StepError> {
    let object = profile.to_object().map_err(|source| {
        warn!(name = %profile.name, category = %source.category(), "Encoding HardwareProfile failed");
        StepError::Encode {
            name: profile.name.clone(),
            origin: origin.clone(),
            source,
        }
    })?;

    match store.create(&object).await {
        Ok(_) => {
            info!(
                name = %profile.name,
                namespace = %profile.namespace,
                origin = %origin,
                "Created HardwareProfile"
            );
            Ok(UpsertOutcome::Created)
        }
        Err(e) if e.is_already_exists() => {
            debug!(
                name = %profile.name,
                namespace = %profile.namespace,
                "HardwareProfile already exists, leaving it untouched"
            );
            Ok(UpsertOutcome::AlreadyExists)
        }
        Err(source) => Err(StepError::Create {
            namespace: profile.namespace.clone(),
            name: profile.name.clone(),
            origin: origin.clone(),
            source,
        }),
    }
}

/// Upsert every profile in order, collecting failures instead of stopping.
pub async fn upsert_all<I>(
    store: &dyn ObjectStore,
    profiles: I,
    cancel: &CancellationToken,
) -> Result<PhaseResult, MigrationError>
where
    I: IntoIterator<Item = (HardwareProfile, ProfileOrigin)>,
{
    let mut result = PhaseResult::default();
    for (profile, origin) in profiles {
        match cancellable(cancel, upsert_profile(store, &profile, &origin)).await? {
            Ok(UpsertOutcome::Created) => result.applied(),
            Ok(UpsertOutcome::AlreadyExists) => result.unchanged(),
            Err(e) => {
                warn!(error = %e, "HardwareProfile upsert failed");
                result.failed(e);
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::custom_serving;
    use hwp_core::{HardwareProfileSpec, Kind};
    use hwp_db_memory::{Fault, FaultOp, InMemoryStore};
    use serde_json::json;

    const NOW: &str = "2025-06-01T12:00:00Z";

    fn store() -> InMemoryStore {
        InMemoryStore::new().with_kinds([Kind::HardwareProfile])
    }

    fn profile(name: &str) -> (HardwareProfile, ProfileOrigin) {
        let mut hwp = custom_serving("opendatahub", NOW);
        hwp.name = name.to_string();
        (
            hwp,
            ProfileOrigin::ContainerSize {
                name: name.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_creates_missing_profile() {
        let store = store();
        let (hwp, origin) = profile("small");
        let outcome = upsert_profile(&store, &hwp, &origin).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let stored = store
            .get(&Kind::HardwareProfile, Some("opendatahub"), "small")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(HardwareProfile::from_object(&stored).unwrap().spec, hwp.spec);
    }

    #[tokio::test]
    async fn test_existing_profile_is_left_untouched() {
        let store = store();
        let (hwp, origin) = profile("small");
        let mut edited = hwp.to_object().unwrap();
        edited.data.insert("spec".into(), json!({"identifiers": []}));
        edited.metadata.annotations.clear();
        store.seed(edited);

        let outcome = upsert_profile(&store, &hwp, &origin).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::AlreadyExists);

        let stored = store
            .get(&Kind::HardwareProfile, Some("opendatahub"), "small")
            .await
            .unwrap()
            .unwrap();
        let decoded = HardwareProfile::from_object(&stored).unwrap();
        assert_eq!(decoded.spec, HardwareProfileSpec::default());
        assert!(decoded.annotations.is_empty());
    }

    #[tokio::test]
    async fn test_failure_names_profile_and_origin() {
        let store = store();
        store.inject(Fault::new(FaultOp::Create, Kind::HardwareProfile, "quota exceeded"));
        let (hwp, origin) = profile("small");

        let err = upsert_profile(&store, &hwp, &origin).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("opendatahub/small"));
        assert!(message.contains("container size 'small'"));
        assert!(message.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_batch_continues_after_failure() {
        let store = store();
        store.inject(
            Fault::new(FaultOp::Create, Kind::HardwareProfile, "rejected").for_name("a"),
        );

        let result = upsert_all(
            &store,
            vec![profile("a"), profile("b"), profile("c")],
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.outcome.applied, 2);
        assert_eq!(result.outcome.failed, 1);
        assert!(result.errors.to_string().contains("opendatahub/a"));
        assert!(store.peek(&Kind::HardwareProfile, Some("opendatahub"), "b").is_some());
        assert!(store.peek(&Kind::HardwareProfile, Some("opendatahub"), "c").is_some());
    }

    #[tokio::test]
    async fn test_second_batch_changes_nothing() {
        let store = store();
        let cancel = CancellationToken::new();
        upsert_all(&store, vec![profile("a")], &cancel).await.unwrap();
        let again = upsert_all(&store, vec![profile("a")], &cancel).await.unwrap();
        assert_eq!(again.outcome.unchanged, 1);
        assert_eq!(again.outcome.applied, 0);
    }

    #[tokio::test]
    async fn test_cancelled_batch_is_not_aggregated() {
        let store = store();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = upsert_all(&store, vec![profile("a")], &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(store.is_empty());
    }
}
