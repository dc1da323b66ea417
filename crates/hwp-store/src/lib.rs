//! # hwp-store
//!
//! Object store abstraction for the hardware profile migration.
//!
//! The migration engine never talks to a cluster directly. It reads and
//! writes schemaless [`DynamicObject`]s through the [`ObjectStore`] trait,
//! which backends implement.
//!
//! ## Example
//!
//! ```ignore
//! use hwp_store::{ObjectStore, StoreError};
//! use hwp_core::Kind;
//!
//! async fn profile_exists(store: &dyn ObjectStore, ns: &str, name: &str) -> Result<bool, StoreError> {
//!     Ok(store.get(&Kind::HardwareProfile, Some(ns), name).await?.is_some())
//! }
//! ```

mod error;
pub mod recording;
mod traits;
mod types;

pub use error::{ErrorCategory, StoreError};
pub use recording::RecordingStore;
pub use traits::ObjectStore;
pub use types::{CapabilityCheck, Change, ChangeOp};

pub use hwp_core::{DynamicObject, Kind, ObjectKey, ObjectMeta};
