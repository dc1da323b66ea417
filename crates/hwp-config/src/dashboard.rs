//! Resolution of the legacy dashboard configuration document.
//!
//! The document is read from the object store first. When the store has no
//! such object, an optional manifest file (YAML, or JSON by extension) is
//! used instead.

use crate::settings::MigrationSettings;
use crate::{ConfigError, Result};
use hwp_core::{DashboardConfig, DynamicObject, Kind};
use hwp_store::ObjectStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where a dashboard config was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardOrigin {
    Store,
    Manifest(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDashboard {
    pub config: DashboardConfig,
    pub origin: DashboardOrigin,
}

/// Look up the dashboard config in the application namespace, falling back
/// to the configured manifest.
///
/// Returns `Ok(None)` when neither source has it. Store errors other than
/// "not found" are returned as errors.
pub async fn resolve_dashboard_config(
    store: &dyn ObjectStore,
    settings: &MigrationSettings,
) -> Result<Option<LoadedDashboard>> {
    let namespace = settings.application_namespace.as_str();
    let name = settings.dashboard_config_name.as_str();

    let stored = match store
        .get(&Kind::OdhDashboardConfig, Some(namespace), name)
        .await
    {
        Ok(found) => found,
        Err(e) if e.is_not_found() || e.is_no_such_kind() => None,
        Err(e) => return Err(e.into()),
    };

    if let Some(object) = stored {
        debug!(namespace, name, "Dashboard config loaded from store");
        return Ok(Some(LoadedDashboard {
            config: DashboardConfig::from_object(&object)?,
            origin: DashboardOrigin::Store,
        }));
    }

    let Some(path) = settings.manifest_path.as_deref() else {
        info!(namespace, name, "Dashboard config not found and no manifest configured");
        return Ok(None);
    };

    let Some(object) = read_manifest(path).await? else {
        return Ok(None);
    };
    info!(path = %path.display(), "Dashboard config loaded from manifest");
    Ok(Some(LoadedDashboard {
        config: DashboardConfig::from_object(&object)?,
        origin: DashboardOrigin::Manifest(path.to_path_buf()),
    }))
}

async fn read_manifest(path: &Path) -> Result<Option<DynamicObject>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Dashboard config manifest does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let object: DynamicObject = if is_json {
        serde_json::from_str(&raw).map_err(|e| ConfigError::manifest(path, e.to_string()))?
    } else {
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::manifest(path, e.to_string()))?
    };

    if object.kind != Kind::OdhDashboardConfig {
        warn!(
            path = %path.display(),
            kind = %object.kind,
            "Manifest is not an OdhDashboardConfig, ignoring"
        );
        return Ok(None);
    }
    Ok(Some(object))
}
