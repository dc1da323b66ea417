//! JSON snapshots of store contents.
//!
//! A snapshot lists the registered kinds and every object:
//!
//! ```json
//! { "kinds": ["HardwareProfile", "Notebook"], "objects": [ { "kind": "Notebook", ... } ] }
//! ```
//!
//! Kinds of listed objects are registered implicitly.

use crate::storage::{InMemoryStore, StoreOptions};
use hwp_core::{DynamicObject, Kind};
use hwp_store::StoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub kinds: Vec<Kind>,
    #[serde(default)]
    pub objects: Vec<DynamicObject>,
}

impl Snapshot {
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw)
            .map_err(|e| StoreError::invalid_object(format!("invalid snapshot: {e}")))
    }

    pub fn to_json_pretty(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::internal(format!("failed to encode snapshot: {e}")))
    }

    pub fn into_store(self, options: StoreOptions) -> InMemoryStore {
        let store = InMemoryStore::with_options(options).with_kinds(self.kinds);
        for object in self.objects {
            store.seed(object);
        }
        store
    }
}

impl InMemoryStore {
    /// Captures registered kinds and all objects, terminating ones included.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            kinds: self.kinds(),
            objects: self.objects(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwp_store::ObjectStore;

    const RAW: &str = r#"{
        "kinds": ["HardwareProfile", "AcceleratorProfile"],
        "objects": [
            {
                "apiVersion": "kubeflow.org/v1",
                "kind": "Notebook",
                "metadata": {"name": "nb", "namespace": "team-a"},
                "spec": {"template": {}}
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_snapshot_loads_into_store() {
        let store = Snapshot::from_json(RAW)
            .unwrap()
            .into_store(StoreOptions::default());

        assert!(store.check_kind(&Kind::HardwareProfile).await.is_available());
        assert!(store.check_kind(&Kind::Notebook).await.is_available());
        assert!(!store.check_kind(&Kind::InferenceService).await.is_available());

        let nb = store
            .get(&Kind::Notebook, Some("team-a"), "nb")
            .await
            .unwrap()
            .unwrap();
        assert!(nb.get_field("spec").is_some());
    }

    #[test]
    fn test_snapshot_captures_store() {
        let store = Snapshot::from_json(RAW)
            .unwrap()
            .into_store(StoreOptions::default());
        let snapshot = store.snapshot();
        assert_eq!(snapshot.kinds.len(), 3);
        assert_eq!(snapshot.objects.len(), 1);

        let encoded = snapshot.to_json_pretty().unwrap();
        assert_eq!(Snapshot::from_json(&encoded).unwrap().objects.len(), 1);
    }

    #[test]
    fn test_invalid_snapshot() {
        let err = Snapshot::from_json("{\"objects\": [42]}").unwrap_err();
        assert!(matches!(err, StoreError::InvalidObject { .. }));
    }
}
