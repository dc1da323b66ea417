//! In-memory object store backend.
//!
//! This crate provides an in-memory implementation of the `ObjectStore` trait
//! from `hwp-store`, using papaya lock-free HashMap for concurrent access.
//! It models the parts of a cluster API the migration relies on: kind
//! registration, graceful deletion and injected failures.
//!
//! # Example
//!
//! ```ignore
//! use hwp_db_memory::InMemoryStore;
//! use hwp_store::{Kind, ObjectStore};
//!
//! let store = InMemoryStore::new().with_kinds([Kind::HardwareProfile, Kind::Notebook]);
//! let profiles = store.list(&Kind::HardwareProfile, Some("opendatahub")).await?;
//! ```

pub mod fault;
pub mod snapshot;
pub mod storage;

pub use fault::{Fault, FaultError, FaultOp};
pub use snapshot::Snapshot;
pub use storage::{InMemoryStore, StoreKey, StoreOptions};

// Re-export the ObjectStore trait for convenience
pub use hwp_store::{ObjectStore, StoreError};
