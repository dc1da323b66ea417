use anyhow::Result;
use hwp_config::AppConfig;
use hwp_db_memory::StoreOptions;
use hwp_migration::{CancellationToken, run as run_migration};
use hwp_store::RecordingStore;

use crate::Status;
use crate::cli::{MigrateArgs, OutputFormat};
use crate::output::{print_json, print_report, report_json};
use crate::snapshot;

pub async fn run(
    cfg: &AppConfig,
    args: &MigrateArgs,
    format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<Status> {
    let store = snapshot::load(&args.input.snapshot, StoreOptions::default()).await?;
    let store = RecordingStore::new(store).with_dry_run(args.dry_run);

    let report = run_migration(&store, &cfg.migration, cancel).await?;
    let changes = store.take_changes();

    match format {
        OutputFormat::Json => print_json(&report_json(&report, &changes, args.dry_run))?,
        OutputFormat::Table => print_report(&report, &changes, args.dry_run),
    }

    if let Some(path) = &args.output {
        snapshot::save(store.inner(), path).await?;
    }

    Ok(if report.is_success() {
        Status::Clean
    } else {
        Status::Failed
    })
}
