//! Whole-pass scenarios against the in-memory store.

use hwp_core::wellknown::{
    ACCELERATOR_NAME_ANNOTATION, DEFAULT_DASHBOARD_CONFIG_NAME, HARDWARE_PROFILE_NAME_ANNOTATION,
    HARDWARE_PROFILE_NAMESPACE_ANNOTATION, KUEUE_MANAGED_LABEL, KUEUE_QUEUE_NAME_LABEL,
    LAST_SIZE_SELECTION_ANNOTATION, MODIFIED_DATE_ANNOTATION,
};
use hwp_core::{
    DashboardConfig, DynamicObject, HardwareProfile, IntOrString, Kind, ResourcePair, SizedPreset,
    Toleration,
};
use hwp_config::MigrationSettings;
use hwp_db_memory::{Fault, FaultOp, InMemoryStore};
use hwp_migration::{CancellationToken, MigrationError, MigrationReport, Phase, StepError, migrate, run};
use hwp_store::{ChangeOp, ObjectStore, RecordingStore};
use serde_json::json;

const APP_NS: &str = "opendatahub";

fn settings() -> MigrationSettings {
    MigrationSettings {
        application_namespace: APP_NS.to_string(),
        ..Default::default()
    }
}

fn dashboard() -> DashboardConfig {
    DashboardConfig {
        notebook_sizes: vec![
            SizedPreset::new(
                "Small",
                ResourcePair::new("1", "8Gi"),
                ResourcePair::new("2", "8Gi"),
            ),
            SizedPreset::new(
                "X Large",
                ResourcePair::new("7", "56Gi"),
                ResourcePair::new("15", "56Gi"),
            ),
        ],
        model_server_sizes: vec![SizedPreset::new(
            "Small",
            ResourcePair::new("1", "4Gi"),
            ResourcePair::new("2", "8Gi"),
        )],
        ..Default::default()
    }
}

fn cluster() -> InMemoryStore {
    let store = InMemoryStore::new().with_kinds([
        Kind::HardwareProfile,
        Kind::AcceleratorProfile,
        Kind::Notebook,
        Kind::InferenceService,
        Kind::ServingRuntime,
        Kind::Namespace,
    ]);
    store.seed(
        DynamicObject::new(Kind::AcceleratorProfile, Some(APP_NS), "gpu-profile").with_field(
            "spec",
            json!({
                "identifier": "nvidia.com/gpu",
                "displayName": "NVIDIA GPU",
                "enabled": true,
                "tolerations": [{"key": "nvidia.com/gpu", "operator": "Exists", "effect": "NoSchedule"}]
            }),
        ),
    );
    store.seed(
        DynamicObject::new(Kind::Notebook, Some("team-a"), "trainer")
            .with_annotation(ACCELERATOR_NAME_ANNOTATION, "gpu-profile")
            .with_annotation(LAST_SIZE_SELECTION_ANNOTATION, "Small"),
    );
    store.seed(
        DynamicObject::new(Kind::Notebook, Some("team-a"), "explorer")
            .with_annotation(LAST_SIZE_SELECTION_ANNOTATION, "X Large"),
    );
    store.seed(
        DynamicObject::new(Kind::InferenceService, Some("team-a"), "model").with_field(
            "spec",
            json!({"predictor": {"model": {"resources": {
                "requests": {"cpu": "1", "memory": "4Gi"},
                "limits": {"cpu": "2", "memory": "8Gi"}
            }}}}),
        ),
    );
    store
}

async fn run_once(store: &dyn ObjectStore) -> MigrationReport {
    migrate(store, &settings(), Some(&dashboard()), &CancellationToken::new())
        .await
        .unwrap()
}

fn hardware_profile(store: &InMemoryStore, namespace: &str, name: &str) -> HardwareProfile {
    let object = store
        .peek(&Kind::HardwareProfile, Some(namespace), name)
        .unwrap_or_else(|| panic!("HardwareProfile {namespace}/{name} missing"));
    HardwareProfile::from_object(&object).unwrap()
}

fn profile_annotation(store: &InMemoryStore, kind: Kind, name: &str) -> Option<String> {
    store
        .peek(&kind, Some("team-a"), name)
        .and_then(|o| o.annotation(HARDWARE_PROFILE_NAME_ANNOTATION).map(str::to_string))
}

#[tokio::test]
async fn test_accelerator_profile_end_to_end() {
    let store = cluster();
    let report = run_once(&store).await;
    assert!(report.is_success(), "{}", report.errors);

    let hwp = hardware_profile(&store, APP_NS, "gpu-profile-notebooks");
    let gpu = hwp.identifier("nvidia.com/gpu").unwrap();
    assert_eq!(gpu.min_count, IntOrString::Int(1));
    assert_eq!(gpu.default_count, IntOrString::Int(1));
    let cpu = hwp.identifier("cpu").unwrap();
    assert_eq!(cpu.min_count, IntOrString::from("1"));
    assert_eq!(cpu.default_count, IntOrString::from("1"));
    assert_eq!(cpu.max_count, Some(IntOrString::from("15")));
    let memory = hwp.identifier("memory").unwrap();
    assert_eq!(memory.min_count, IntOrString::from("8Gi"));
    assert_eq!(memory.max_count, Some(IntOrString::from("56Gi")));
    assert_eq!(hwp.tolerations().len(), 1);

    let serving = hardware_profile(&store, APP_NS, "gpu-profile-serving");
    assert_eq!(serving.identifier("memory").unwrap().min_count, IntOrString::from("1Gi"));
    assert!(serving.identifier("cpu").unwrap().max_count.is_none());

    assert_eq!(
        profile_annotation(&store, Kind::Notebook, "trainer").as_deref(),
        Some("gpu-profile-notebooks")
    );
    let trainer = store.peek(&Kind::Notebook, Some("team-a"), "trainer").unwrap();
    assert!(trainer.annotation(HARDWARE_PROFILE_NAMESPACE_ANNOTATION).is_none());

    let explorer = store.peek(&Kind::Notebook, Some("team-a"), "explorer").unwrap();
    assert_eq!(
        explorer.annotation(HARDWARE_PROFILE_NAME_ANNOTATION),
        Some("containerSize-x-large-notebooks")
    );
    assert_eq!(explorer.annotation(HARDWARE_PROFILE_NAMESPACE_ANNOTATION), Some(APP_NS));
    assert_eq!(
        profile_annotation(&store, Kind::InferenceService, "model").as_deref(),
        Some("containerSize-small-serving")
    );

    assert_eq!(report.outcome(Phase::AcceleratorProfiles).unwrap().applied, 2);
    assert_eq!(report.outcome(Phase::ContainerSizes).unwrap().applied, 3);
    assert_eq!(report.outcome(Phase::Notebooks).unwrap().applied, 2);
    assert_eq!(report.outcome(Phase::InferenceServices).unwrap().applied, 1);
}

#[tokio::test]
async fn test_second_pass_changes_nothing() {
    let store = RecordingStore::new(cluster());
    run_once(&store).await;
    let first = store.take_changes();
    assert!(first.iter().any(|c| c.op == ChangeOp::Create));
    assert!(first.iter().any(|c| c.op == ChangeOp::Update));
    let state = store.inner().objects();

    let report = run_once(&store).await;
    assert!(report.is_success());
    assert!(store.changes().is_empty());
    assert_eq!(store.inner().objects(), state);
    assert_eq!(report.outcome(Phase::ContainerSizes).unwrap().unchanged, 3);
    assert_eq!(report.outcome(Phase::Notebooks).unwrap().unchanged, 2);
}

#[tokio::test]
async fn test_dry_run_leaves_store_untouched() {
    let store = RecordingStore::new(cluster()).with_dry_run(true);
    let before = store.inner().objects();

    let report = run_once(&store).await;
    assert!(report.is_success());
    assert_eq!(store.inner().objects(), before);
    let changes = store.changes();
    assert!(changes
        .iter()
        .any(|c| c.op == ChangeOp::Create && c.key.name == "custom-serving"));
    assert!(changes
        .iter()
        .any(|c| c.op == ChangeOp::Update && c.key.name == "trainer"));
}

#[tokio::test]
async fn test_user_edited_profile_is_preserved() {
    let store = cluster();
    let edited = DynamicObject::new(Kind::HardwareProfile, Some(APP_NS), "containerSize-small-notebooks")
        .with_annotation(MODIFIED_DATE_ANNOTATION, "2024-01-01T00:00:00Z")
        .with_field(
            "spec",
            json!({"identifiers": [{
                "identifier": "cpu",
                "displayName": "cpu",
                "resourceType": "CPU",
                "minCount": "4",
                "defaultCount": "4"
            }]}),
        );
    store.seed(edited.clone());

    run_once(&store).await;
    run_once(&store).await;

    let stored = store
        .peek(&Kind::HardwareProfile, Some(APP_NS), "containerSize-small-notebooks")
        .unwrap();
    assert_eq!(stored.get_field("spec"), edited.get_field("spec"));
    assert_eq!(stored.metadata.annotations, edited.metadata.annotations);
}

#[tokio::test]
async fn test_partial_failure_keeps_successes() {
    let store = cluster();
    store.inject(
        Fault::new(FaultOp::Create, Kind::HardwareProfile, "admission webhook denied")
            .for_name("containerSize-small-notebooks"),
    );

    let report = run_once(&store).await;
    assert!(!report.is_success());
    assert_eq!(report.errors.len(), 1);
    let message = report.errors.to_string();
    assert!(message.contains("containerSize-small-notebooks"));
    assert!(message.contains("admission webhook denied"));

    assert!(store
        .peek(&Kind::HardwareProfile, Some(APP_NS), "containerSize-x-large-notebooks")
        .is_some());
    assert!(store
        .peek(&Kind::HardwareProfile, Some(APP_NS), "custom-serving")
        .is_some());
    assert_eq!(
        profile_annotation(&store, Kind::Notebook, "trainer").as_deref(),
        Some("gpu-profile-notebooks")
    );
}

#[tokio::test]
async fn test_kueue_exemption_holds_across_runs() {
    let store = cluster();
    store.seed(DynamicObject::new(Kind::Namespace, None, "team-q").with_label(KUEUE_MANAGED_LABEL, "true"));
    store.seed(
        DynamicObject::new(Kind::Notebook, Some("team-q"), "unqueued")
            .with_annotation(ACCELERATOR_NAME_ANNOTATION, "gpu-profile"),
    );
    store.seed(
        DynamicObject::new(Kind::Notebook, Some("team-q"), "queued")
            .with_annotation(ACCELERATOR_NAME_ANNOTATION, "gpu-profile")
            .with_label(KUEUE_QUEUE_NAME_LABEL, "local-queue"),
    );

    for _ in 0..3 {
        run_once(&store).await;
    }

    let unqueued = store.peek(&Kind::Notebook, Some("team-q"), "unqueued").unwrap();
    assert!(unqueued.annotation(HARDWARE_PROFILE_NAME_ANNOTATION).is_none());
    let queued = store.peek(&Kind::Notebook, Some("team-q"), "queued").unwrap();
    assert_eq!(
        queued.annotation(HARDWARE_PROFILE_NAME_ANNOTATION),
        Some("gpu-profile-notebooks")
    );
}

#[tokio::test]
async fn test_missing_workload_kinds_skip_phases() {
    let store = InMemoryStore::new().with_kinds([Kind::HardwareProfile]);
    let report = run_once(&store).await;
    assert!(report.is_success());
    assert!(report.outcome(Phase::AcceleratorProfiles).is_none());
    assert!(report.outcome(Phase::Notebooks).is_none());
    assert!(report.outcome(Phase::InferenceServices).is_none());
    assert_eq!(report.outcome(Phase::CustomServing).unwrap().applied, 1);
}

#[tokio::test]
async fn test_cancelled_run_reports_cancellation() {
    let store = cluster();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = migrate(&store, &settings(), Some(&dashboard()), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_malformed_size_list_does_not_stop_the_run() {
    let store = cluster();
    store.seed(
        DynamicObject::new(Kind::OdhDashboardConfig, Some(APP_NS), DEFAULT_DASHBOARD_CONFIG_NAME)
            .with_field(
                "spec",
                json!({
                    "notebookSizes": [{
                        "name": "Small",
                        "resources": {
                            "requests": {"cpu": "1", "memory": "8Gi"},
                            "limits": {"cpu": "2", "memory": "8Gi"}
                        }
                    }],
                    "modelServerSizes": "oops"
                }),
            ),
    );

    let report = run(&store, &settings(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors.iter().next(),
        Some(StepError::MalformedSizeList { field }) if field == "modelServerSizes"
    ));
    let sizes = report.outcome(Phase::ContainerSizes).unwrap();
    assert_eq!(sizes.failed, 1);
    assert_eq!(sizes.applied, 1);

    hardware_profile(&store, APP_NS, "containerSize-small-notebooks");
    hardware_profile(&store, APP_NS, "gpu-profile-notebooks");
    hardware_profile(&store, APP_NS, "custom-serving");
    assert!(store
        .peek(&Kind::HardwareProfile, Some(APP_NS), "containerSize-small-serving")
        .is_none());
    assert_eq!(
        profile_annotation(&store, Kind::Notebook, "trainer").as_deref(),
        Some("gpu-profile-notebooks")
    );
    assert_eq!(
        profile_annotation(&store, Kind::InferenceService, "model").as_deref(),
        Some("custom-serving")
    );
}

#[tokio::test]
async fn test_notebooks_only_toleration_reaches_notebook_profiles() {
    let store = cluster();
    let notebooks_only = Toleration {
        key: "NotebooksOnly".to_string(),
        operator: "Equal".to_string(),
        value: "true".to_string(),
        effect: "NoSchedule".to_string(),
    };
    let dashboard = DashboardConfig {
        notebooks_only_toleration: Some(notebooks_only.clone()),
        ..dashboard()
    };

    let report = migrate(&store, &settings(), Some(&dashboard), &CancellationToken::new())
        .await
        .unwrap();
    assert!(report.is_success(), "{}", report.errors);

    let gpu_notebooks = hardware_profile(&store, APP_NS, "gpu-profile-notebooks");
    assert_eq!(gpu_notebooks.tolerations().len(), 2);
    assert!(gpu_notebooks.tolerations().contains(&notebooks_only));
    let gpu_serving = hardware_profile(&store, APP_NS, "gpu-profile-serving");
    assert_eq!(gpu_serving.tolerations().len(), 1);
    assert!(!gpu_serving.tolerations().contains(&notebooks_only));

    let small_notebooks = hardware_profile(&store, APP_NS, "containerSize-small-notebooks");
    assert_eq!(small_notebooks.tolerations(), &[notebooks_only.clone()]);
    let small_serving = hardware_profile(&store, APP_NS, "containerSize-small-serving");
    assert!(small_serving.tolerations().is_empty());
    assert!(hardware_profile(&store, APP_NS, "custom-serving").tolerations().is_empty());
}

#[tokio::test]
async fn test_failed_hardware_profile_check_aborts_run() {
    let store = cluster();
    store.inject(Fault::new(FaultOp::CheckKind, Kind::HardwareProfile, "discovery failed"));

    let err = migrate(&store, &settings(), Some(&dashboard()), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MigrationError::CapabilityCheck { kind: Kind::HardwareProfile, .. }
    ));
    assert!(err.to_string().contains("discovery failed"));
    assert!(store
        .objects()
        .iter()
        .all(|o| o.kind != Kind::HardwareProfile));
    assert!(profile_annotation(&store, Kind::Notebook, "trainer").is_none());
}
