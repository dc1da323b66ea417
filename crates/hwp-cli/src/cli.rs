use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hwp-migrate")]
#[command(about = "Migrate accelerator profiles and container sizes to hardware profiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./hwp-migrate.toml when present)
    #[arg(short, long, global = true, env = "HWP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Application namespace (overrides the configuration)
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one migration pass over a cluster snapshot
    Migrate(MigrateArgs),
    /// Delete legacy-shaped workloads and wait for them to disappear
    Cleanup(CleanupArgs),
    /// Print the CPU/memory bounds aggregated from notebook sizes
    Bounds(SnapshotArgs),
}

#[derive(clap::Args)]
pub struct SnapshotArgs {
    /// JSON snapshot with registered kinds and objects
    #[arg(short, long)]
    pub snapshot: PathBuf,
}

#[derive(clap::Args)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,
    /// Record changes without applying them
    #[arg(long)]
    pub dry_run: bool,
    /// Write the resulting snapshot to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,
    /// Workload kind to clean up (e.g. Deployment), looked up in --namespace
    #[arg(long)]
    pub kind: String,
    /// Selector label the new workloads carry; objects without it are deleted
    #[arg(long)]
    pub label_key: String,
    /// Reads a deleted object stays visible for, simulating slow termination
    #[arg(long, default_value_t = 0)]
    pub grace_reads: u32,
    /// Write the resulting snapshot to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
