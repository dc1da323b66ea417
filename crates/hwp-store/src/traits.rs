//! The object store trait backends implement.

use async_trait::async_trait;
use hwp_core::{DynamicObject, Kind, ObjectKey};

use crate::error::StoreError;
use crate::types::CapabilityCheck;

/// A declarative store of schemaless objects keyed by kind, namespace and name.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads an object by key.
    ///
    /// Returns `None` if the object does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoSuchKind` if the kind is not registered, and an
    /// error for infrastructure issues. A missing object is not an error.
    async fn get(
        &self,
        kind: &Kind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<Option<DynamicObject>, StoreError>;

    /// Lists objects of a kind, optionally restricted to one namespace.
    ///
    /// An absent namespace yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoSuchKind` if the kind is not registered.
    async fn list(
        &self,
        kind: &Kind,
        namespace: Option<&str>,
    ) -> Result<Vec<DynamicObject>, StoreError>;

    /// Creates a new object.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if an object with the same key exists.
    async fn create(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError>;

    /// Replaces an existing object.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the object does not exist.
    async fn update(&self, object: &DynamicObject) -> Result<DynamicObject, StoreError>;

    /// Deletes an object by key.
    ///
    /// Backends may keep the object visible in a terminating state for a while.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the object does not exist.
    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;

    /// Reports whether a kind is served by this store.
    async fn check_kind(&self, kind: &Kind) -> CapabilityCheck;

    /// Returns the name of this store backend.
    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that ObjectStore is object-safe
    fn _assert_store_object_safe(_: &dyn ObjectStore) {}
}
