use crate::settings::AppConfig;
use crate::{ConfigError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "hwp-migrate.toml";
pub const ENV_PREFIX: &str = "HWP";

/// Load configuration from an optional TOML file plus `HWP__*` environment
/// overrides, then validate it.
///
/// Without an explicit path, `hwp-migrate.toml` in the working directory is
/// used when present. An explicit path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::validation(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            builder = builder.add_source(File::from(p.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path));
            }
        }
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .separator("__"),
    );
    let cfg = builder
        .build()
        .map_err(|e| ConfigError::parse(format!("config build error: {e}")))?;
    let merged: AppConfig = cfg
        .try_deserialize()
        .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
    merged.validate()?;
    Ok(merged)
}
