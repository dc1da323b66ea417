mod cli;
mod commands;
mod observability;
mod output;
mod snapshot;

use anyhow::{Context, Result};
use clap::Parser;
use hwp_config::load_config;
use hwp_migration::CancellationToken;

use cli::{Cli, Commands};
use output::print_error;

/// Whether a command finished cleanly or reported item failures.
pub enum Status {
    Clean,
    Failed,
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        // A missing .env file is fine
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing_with_level("info");

    match run().await {
        Ok(Status::Clean) => {}
        Ok(Status::Failed) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<Status> {
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    observability::apply_logging_level(&cfg.logging.level);
    if let Some(namespace) = &cli.namespace {
        cfg.migration.application_namespace = namespace.clone();
    }
    tracing::debug!(
        namespace = %cfg.migration.application_namespace,
        dashboard_config = %cfg.migration.dashboard_config_name,
        "Configuration loaded"
    );

    let cancel = cancel_on_ctrl_c();
    match &cli.command {
        Commands::Migrate(args) => commands::migrate::run(&cfg, args, cli.format, &cancel).await,
        Commands::Cleanup(args) => commands::cleanup::run(&cfg, args, cli.format, &cancel).await,
        Commands::Bounds(args) => commands::bounds::run(&cfg, args, cli.format).await,
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            trigger.cancel();
        }
    });
    token
}

