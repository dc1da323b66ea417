use anyhow::{Context, Result};
use hwp_db_memory::{InMemoryStore, Snapshot, StoreOptions};
use std::path::Path;

/// Read a JSON snapshot into a fresh in-memory store.
pub async fn load(path: &Path, options: StoreOptions) -> Result<InMemoryStore> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let snapshot = Snapshot::from_json(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        kinds = snapshot.kinds.len(),
        objects = snapshot.objects.len(),
        "Snapshot loaded"
    );
    Ok(snapshot.into_store(options))
}

pub async fn save(store: &InMemoryStore, path: &Path) -> Result<()> {
    let raw = store.snapshot().to_json_pretty()?;
    tokio::fs::write(path, raw)
        .await
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    tracing::info!(path = %path.display(), "Snapshot written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwp_core::Kind;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_and_save_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"kinds": ["HardwareProfile"], "objects": [
                {{"apiVersion": "kubeflow.org/v1", "kind": "Notebook",
                  "metadata": {{"name": "nb", "namespace": "team-a"}}}}
            ]}}"#
        )
        .unwrap();

        let store = load(file.path(), StoreOptions::default()).await.unwrap();
        assert!(store.is_registered(&Kind::HardwareProfile));
        assert!(store.peek(&Kind::Notebook, Some("team-a"), "nb").is_some());

        let out = tempfile::NamedTempFile::new().unwrap();
        save(&store, out.path()).await.unwrap();
        let reloaded = load(out.path(), StoreOptions::default()).await.unwrap();
        assert_eq!(reloaded.objects().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_snapshot_names_path() {
        let err = load(Path::new("/nonexistent/cluster.json"), StoreOptions::default())
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/cluster.json"));
    }
}
