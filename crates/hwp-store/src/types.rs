use hwp_core::ObjectKey;
use serde::Serialize;
use std::fmt;

use crate::error::StoreError;

/// Outcome of asking the store whether a kind is registered.
#[derive(Debug)]
pub enum CapabilityCheck {
    Available,
    /// Cleanly reported as not installed.
    Unavailable,
    /// The check itself failed.
    CheckFailed(StoreError),
}

impl CapabilityCheck {
    pub fn is_available(&self) -> bool {
        matches!(self, CapabilityCheck::Available)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeOp::Create => write!(f, "create"),
            ChangeOp::Update => write!(f, "update"),
            ChangeOp::Delete => write!(f, "delete"),
        }
    }
}

/// One mutation applied (or, in dry-run mode, intended) against a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub op: ChangeOp,
    #[serde(flatten)]
    pub key: ObjectKey,
}

impl Change {
    pub fn new(op: ChangeOp, key: ObjectKey) -> Self {
        Self { op, key }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op, self.key)
    }
}
