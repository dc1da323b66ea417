use anyhow::{Result, bail};
use hwp_config::{AppConfig, resolve_dashboard_config};
use hwp_db_memory::StoreOptions;
use hwp_migration::aggregate;
use serde_json::json;

use crate::Status;
use crate::cli::{OutputFormat, SnapshotArgs};
use crate::output::{print_bounds, print_json};
use crate::snapshot;

pub async fn run(cfg: &AppConfig, args: &SnapshotArgs, format: OutputFormat) -> Result<Status> {
    let store = snapshot::load(&args.snapshot, StoreOptions::default()).await?;
    let Some(loaded) = resolve_dashboard_config(&store, &cfg.migration).await? else {
        bail!(
            "dashboard config {} not found in namespace '{}'",
            cfg.migration.dashboard_config_name,
            cfg.migration.application_namespace
        );
    };

    let bounds = aggregate(&loaded.config.notebook_sizes)?;
    match format {
        OutputFormat::Json => print_json(&json!(bounds))?,
        OutputFormat::Table => print_bounds(&bounds),
    }
    Ok(Status::Clean)
}
