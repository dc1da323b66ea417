//! Configuration for the hardware profile migration.
//!
//! Settings are layered: an optional TOML file (`hwp-migrate.toml` by
//! default) overridden by `HWP__SECTION__KEY` environment variables.
//!
//! ```toml
//! [migration]
//! application_namespace = "opendatahub"
//! dashboard_config_name = "odh-dashboard-config"
//! manifest_path = "/opt/manifests/odhdashboardconfig.yaml"
//!
//! [logging]
//! level = "info"
//!
//! [backoff.statefulset]
//! initial_ms = 10000
//! steps = 8
//! ```
//!
//! The crate also resolves the legacy dashboard configuration document,
//! looking in the object store first and falling back to a manifest file.

pub mod dashboard;
pub mod loader;
pub mod settings;

pub use dashboard::{DashboardOrigin, LoadedDashboard, resolve_dashboard_config};
pub use loader::{DEFAULT_CONFIG_FILE, ENV_PREFIX, load_config};
pub use settings::{AppConfig, BackoffSettings, LoggingConfig, MigrationSettings};

use hwp_core::CoreError;
use hwp_store::StoreError;
use std::path::PathBuf;

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Manifest error in {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("Dashboard config decode error: {0}")]
    Decode(#[from] CoreError),

    #[error("Object store error: {0}")]
    Store(#[from] StoreError),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn manifest(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: msg.into(),
        }
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
