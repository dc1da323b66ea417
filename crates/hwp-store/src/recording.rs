//! RecordingStore - a store wrapper that journals mutations.
//!
//! Every successful create, update and delete is appended to an in-memory
//! journal. In dry-run mode mutations are journaled but never forwarded,
//! and the submitted object is echoed back as if it had been written.
//!
//! # Example
//!
//! ```ignore
//! use hwp_store::RecordingStore;
//!
//! let store = RecordingStore::new(backend).with_dry_run(true);
//! run_migration(&store).await?;
//! for change in store.changes() {
//!     println!("{change}");
//! }
//! ```

use async_trait::async_trait;
use hwp_core::{DynamicObject, Kind, ObjectKey};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::ObjectStore;
use crate::types::{CapabilityCheck, Change, ChangeOp};

/// A store wrapper that records each successful mutation.
pub struct RecordingStore<S: ObjectStore> {
    inner: S,
    dry_run: bool,
    journal: Mutex<Vec<Change>>,
}

impl<S: ObjectStore> RecordingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            dry_run: false,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// When enabled, mutations are recorded but not applied.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Snapshot of the journal in the order mutations happened.
    pub fn changes(&self) -> Vec<Change> {
        self.journal.lock().clone()
    }

    /// Drain the journal, leaving it empty.
    pub fn take_changes(&self) -> Vec<Change> {
        std::mem::take(&mut *self.journal.lock())
    }

    fn record(&self, op: ChangeOp, key: ObjectKey) {
        debug!(
            op = %op,
            kind = %key.kind,
            namespace = key.namespace.as_deref().unwrap_or_default(),
            name = %key.name,
            dry_run = self.dry_run,
            "Recorded change"
        );
        self.journal.lock().push(Change::new(op, key));
    }
}

#[async_trait]
impl<S: ObjectStore> ObjectStore for RecordingStore<S> {
    async fn get(
        &self,
        kind: &Kind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, StoreError> {
        self.inner.get(kind, namespace, name).await
    }

    async fn list(
        &self,
        kind: &Kind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        self.inner.list(kind, namespace).await
    }

    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let created = if self.dry_run {
            // Existence still has to be reported so callers see AlreadyExists.
            if self
                .inner
                .get(&object.kind, object.namespace(), object.name())
                .await?
                .is_some()
            {
                return Err(StoreError::already_exists(object.key()));
            }
            object.clone()
        } else {
            self.inner.create(object).await?
        };
        self.record(ChangeOp::Create, created.key());
        Ok(created)
    }

    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError> {
        let updated = if self.dry_run {
            object.clone()
        } else {
            self.inner.update(object).await?
        };
        self.record(ChangeOp::Update, updated.key());
        Ok(updated)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        if !self.dry_run {
            self.inner.delete(key).await?;
        }
        self.record(ChangeOp::Delete, key.clone());
        Ok(())
    }

    async fn check_kind(&self, kind: &Kind) -> CapabilityCheck {
        self.inner.check_kind(kind).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}
