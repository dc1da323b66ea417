use anyhow::{Context, Result, bail};
use hwp_config::AppConfig;
use hwp_core::Kind;
use hwp_db_memory::StoreOptions;
use hwp_migration::{BackoffPolicy, CancellationToken, LegacySelector, MigrationError, converge};
use hwp_store::RecordingStore;
use serde_json::json;

use crate::Status;
use crate::cli::{CleanupArgs, OutputFormat};
use crate::output::{print_changes, print_errors, print_json};
use crate::snapshot;

/// Policy for `kind`, with any `[backoff.<kind>]` overrides applied.
fn policy_for(cfg: &AppConfig, kind: &Kind) -> BackoffPolicy {
    let policy = BackoffPolicy::for_kind(kind);
    match cfg.backoff_for(kind.as_str()) {
        Some(settings) => policy.with_overrides(settings),
        None => policy,
    }
}

pub async fn run(
    cfg: &AppConfig,
    args: &CleanupArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<Status> {
    let kind: Kind = args
        .kind
        .parse()
        .with_context(|| format!("invalid kind '{}'", args.kind))?;
    let namespace = cfg.migration.application_namespace.as_str();
    if namespace.is_empty() {
        bail!("a namespace is required (--namespace or migration.application_namespace)");
    }

    let options = StoreOptions {
        deletion_grace_reads: args.grace_reads,
    };
    let store = RecordingStore::new(snapshot::load(&args.input.snapshot, options).await?);
    let policy = policy_for(cfg, &kind);
    tracing::info!(
        kind = %kind,
        namespace,
        steps = policy.steps,
        initial_ms = policy.initial.as_millis() as u64,
        "Cleaning up legacy workloads"
    );

    let selector = LegacySelector::new(args.label_key.clone());
    let errors = match converge(&store, &kind, namespace, &selector, &policy, cancel).await {
        Ok(errors) => errors,
        Err(e) => {
            if let MigrationError::Timeout { errors, .. } = &e {
                if !errors.is_empty() {
                    print_errors(errors);
                }
            }
            return Err(e.into());
        }
    };
    let changes = store.take_changes();

    match format {
        OutputFormat::Json => {
            let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
            print_json(&json!({"changes": changes, "errors": errors}))?;
        }
        OutputFormat::Table => {
            print_changes(&changes, false);
            print_errors(&errors);
        }
    }

    if let Some(path) = &args.output {
        snapshot::save(store.inner(), path).await?;
    }

    Ok(if errors.is_empty() {
        Status::Clean
    } else {
        Status::Failed
    })
}
