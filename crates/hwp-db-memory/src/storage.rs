use crate::fault::{Fault, FaultOp};
use async_trait::async_trait;
use hwp_core::{DynamicObject, Kind, ObjectKey, now_rfc3339};
use hwp_store::{CapabilityCheck, ObjectStore, StoreError};
use papaya::HashMap as PapayaHashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub type StoreKey = String; // Format: "Kind/namespace/name" or "Kind/name"

pub(crate) fn make_store_key(kind: &Kind, namespace: Option<&str>, name: &str) -> StoreKey {
    match namespace {
        Some(ns) => format!("{kind}/{ns}/{name}"),
        None => format!("{kind}/{name}"),
    }
}

/// Storage options for the in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Number of reads a deleted object stays visible for while terminating.
    /// Zero removes objects immediately.
    pub deletion_grace_reads: u32,
}

#[derive(Debug, Clone)]
struct Entry {
    object: DynamicObject,
    /// Set once deleted; the read that brings it to zero removes the entry.
    reads_until_gone: Option<u32>,
}

/// In-memory object store using papaya lock-free HashMap.
///
/// This store provides:
/// - Lock-free concurrent access via papaya::HashMap
/// - Kind registration, reporting unregistered kinds as `NoSuchKind`
/// - Graceful deletion that keeps objects visible for a few reads
/// - Injected failures per operation, kind and object name
#[derive(Debug)]
pub struct InMemoryStore {
    data: Arc<PapayaHashMap<StoreKey, Entry>>,
    kinds: Arc<PapayaHashMap<Kind, ()>>,
    faults: Arc<PapayaHashMap<u64, Fault>>,
    fault_counter: AtomicU64,
    version_counter: AtomicU64,
    options: StoreOptions,
}

impl InMemoryStore {
    /// Creates a new in-memory store with default options.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Creates a new in-memory store with the given options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            data: Arc::new(PapayaHashMap::new()),
            kinds: Arc::new(PapayaHashMap::new()),
            faults: Arc::new(PapayaHashMap::new()),
            fault_counter: AtomicU64::new(1),
            version_counter: AtomicU64::new(1),
            options,
        }
    }

    /// Registers each kind and returns the store.
    pub fn with_kinds(self, kinds: impl IntoIterator<Item = Kind>) -> Self {
        for kind in kinds {
            self.register_kind(kind);
        }
        self
    }

    pub fn register_kind(&self, kind: Kind) {
        self.kinds.pin().insert(kind, ());
    }

    pub fn is_registered(&self, kind: &Kind) -> bool {
        self.kinds.pin().get(kind).is_some()
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<Kind> {
        let mut kinds: Vec<Kind> = self.kinds.pin().iter().map(|(k, _)| k.clone()).collect();
        kinds.sort();
        kinds
    }

    /// Adds a failure rule.
    pub fn inject(&self, fault: Fault) {
        let id = self.fault_counter.fetch_add(1, Ordering::SeqCst);
        self.faults.pin().insert(id, fault);
    }

    pub fn clear_faults(&self) {
        let guard = self.faults.pin();
        let ids: Vec<u64> = guard.iter().map(|(id, _)| *id).collect();
        for id in ids {
            guard.remove(&id);
        }
    }

    /// Inserts or replaces an object without any checks, registering its kind.
    pub fn seed(&self, mut object: DynamicObject) {
        self.register_kind(object.kind.clone());
        if object.metadata.resource_version.is_none() {
            object.metadata.resource_version = Some(self.next_version());
        }
        let key = make_store_key(&object.kind, object.namespace(), object.name());
        self.data.pin().insert(
            key,
            Entry {
                object,
                reads_until_gone: None,
            },
        );
    }

    /// Every stored object, including terminating ones, sorted by key.
    pub fn objects(&self) -> Vec<DynamicObject> {
        let guard = self.data.pin();
        let mut entries: Vec<(StoreKey, DynamicObject)> = guard
            .iter()
            .map(|(k, e)| (k.clone(), e.object.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, o)| o).collect()
    }

    /// Reads an object without side effects on terminating entries.
    pub fn peek(&self, kind: &Kind, namespace: Option<&str>, name: &str) -> Option<DynamicObject> {
        let key = make_store_key(kind, namespace, name);
        self.data.pin().get(&key).map(|e| e.object.clone())
    }

    pub fn len(&self) -> usize {
        self.data.pin().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_version(&self) -> String {
        self.version_counter
            .fetch_add(1, Ordering::SeqCst)
            .to_string()
    }

    fn ensure_kind(&self, kind: &Kind) -> Result<(), StoreError> {
        if self.is_registered(kind) {
            Ok(())
        } else {
            Err(StoreError::no_such_kind(kind.as_str()))
        }
    }

    /// Fires the first matching fault, consuming one trigger.
    fn check_fault(
        &self,
        op: FaultOp,
        kind: &Kind,
        name: Option<&str>,
        key: Option<ObjectKey>,
    ) -> Result<(), StoreError> {
        let guard = self.faults.pin();
        let hit = guard
            .iter()
            .find(|(_, fault)| fault.matches(op, kind, name))
            .map(|(id, fault)| (*id, fault.clone()));

        match hit {
            None => Ok(()),
            Some((id, mut fault)) => {
                let err = fault.to_error(key);
                if let Some(remaining) = fault.remaining.as_mut() {
                    *remaining = remaining.saturating_sub(1);
                    guard.insert(id, fault);
                }
                Err(err)
            }
        }
    }

    fn validate(object: &DynamicObject) -> Result<(), StoreError> {
        if object.name().is_empty() {
            return Err(StoreError::invalid_object(format!(
                "{} object has an empty name",
                object.kind
            )));
        }
        if object.kind.is_namespaced() && object.namespace().is_none_or(str::is_empty) {
            return Err(StoreError::invalid_object(format!(
                "{} {} requires a namespace",
                object.kind,
                object.name()
            )));
        }
        Ok(())
    }

    fn get_entry(&self, kind: &Kind, namespace: Option<&str>, name: &str) -> Option<DynamicObject> {
        let key = make_store_key(kind, namespace, name);
        let guard = self.data.pin();
        let entry = guard.get(&key)?.clone();
        match entry.reads_until_gone {
            None => Some(entry.object),
            Some(remaining) if remaining <= 1 => {
                guard.remove(&key);
                debug!(key = %key, "Terminating object removed");
                None
            }
            Some(remaining) => {
                let object = entry.object.clone();
                guard.insert(
                    key,
                    Entry {
                        object: entry.object,
                        reads_until_gone: Some(remaining - 1),
                    },
                );
                Some(object)
            }
        }
    }

    fn list_entries(&self, kind: &Kind, namespace: Option<&str>) -> Vec<DynamicObject> {
        let guard = self.data.pin();
        let mut objects: Vec<DynamicObject> = guard
            .iter()
            .map(|(_, entry)| &entry.object)
            .filter(|object| &object.kind == kind)
            .filter(|object| namespace.is_none() || object.namespace() == namespace)
            .cloned()
            .collect();
        objects.sort_by(|a, b| {
            (a.namespace(), a.name()).cmp(&(b.namespace(), b.name()))
        });
        objects
    }

    fn create_entry(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        Self::validate(object)?;
        let key = make_store_key(&object.kind, object.namespace(), object.name());
        let guard = self.data.pin();
        if guard.get(&key).is_some() {
            return Err(StoreError::already_exists(object.key()));
        }

        let mut stored = object.clone();
        stored.metadata.resource_version = Some(self.next_version());
        stored.metadata.deletion_timestamp = None;
        guard.insert(
            key,
            Entry {
                object: stored.clone(),
                reads_until_gone: None,
            },
        );
        Ok(stored)
    }

    fn update_entry(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let key = make_store_key(&object.kind, object.namespace(), object.name());
        let guard = self.data.pin();
        let existing = guard
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(object.key()))?;

        let mut stored = object.clone();
        stored.metadata.resource_version = Some(self.next_version());
        stored.metadata.deletion_timestamp = existing.object.metadata.deletion_timestamp.clone();
        guard.insert(
            key,
            Entry {
                object: stored.clone(),
                reads_until_gone: existing.reads_until_gone,
            },
        );
        Ok(stored)
    }

    fn delete_entry(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let store_key = make_store_key(&key.kind, key.namespace.as_deref(), &key.name);
        let guard = self.data.pin();
        let existing = guard
            .get(&store_key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key.clone()))?;

        if self.options.deletion_grace_reads == 0 {
            guard.remove(&store_key);
            return Ok(());
        }
        if existing.reads_until_gone.is_some() {
            return Ok(());
        }

        let mut object = existing.object;
        object.metadata.deletion_timestamp =
            Some(now_rfc3339().map_err(|e| StoreError::internal(e.to_string()))?);
        debug!(key = %store_key, grace_reads = self.options.deletion_grace_reads, "Object terminating");
        guard.insert(
            store_key,
            Entry {
                object,
                reads_until_gone: Some(self.options.deletion_grace_reads),
            },
        );
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get(
        &self,
        kind: &Kind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, StoreError> {
        self.ensure_kind(kind)?;
        let key = ObjectKey::new(kind.clone(), namespace, name);
        self.check_fault(FaultOp::Get, kind, Some(name), Some(key))?;
        Ok(self.get_entry(kind, namespace, name))
    }

    async fn list(
        &self,
        kind: &Kind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        self.ensure_kind(kind)?;
        self.check_fault(FaultOp::List, kind, None, None)?;
        Ok(self.list_entries(kind, namespace))
    }

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        self.ensure_kind(&object.kind)?;
        self.check_fault(FaultOp::Create, &object.kind, Some(object.name()), Some(object.key()))?;
        self.create_entry(object)
    }

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        self.ensure_kind(&object.kind)?;
        self.check_fault(FaultOp::Update, &object.kind, Some(object.name()), Some(object.key()))?;
        self.update_entry(object)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        self.ensure_kind(&key.kind)?;
        self.check_fault(FaultOp::Delete, &key.kind, Some(&key.name), Some(key.clone()))?;
        self.delete_entry(key)
    }

    async fn check_kind(&self, kind: &Kind) -> CapabilityCheck {
        if let Err(err) = self.check_fault(FaultOp::CheckKind, kind, None, None) {
            return CapabilityCheck::CheckFailed(err);
        }
        if self.is_registered(kind) {
            CapabilityCheck::Available
        } else {
            CapabilityCheck::Unavailable
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
