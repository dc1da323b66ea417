//! Injected failures for exercising error paths against the in-memory store.

use hwp_core::{Kind, ObjectKey};
use hwp_store::StoreError;

/// Store operation a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultOp {
    Get,
    List,
    Create,
    Update,
    Delete,
    CheckKind,
}

/// Shape of the error an injected fault produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultError {
    #[default]
    Internal,
    Unavailable,
    /// Write rejected, as an admission policy would.
    Conflict,
}

/// A failure rule: matching operations fail with `message`.
#[derive(Debug, Clone)]
pub struct Fault {
    pub op: FaultOp,
    pub kind: Kind,
    /// Restrict to one object name; `None` matches every object of the kind.
    pub name: Option<String>,
    pub message: String,
    pub error: FaultError,
    /// Remaining triggers; `None` fails forever.
    pub remaining: Option<u32>,
}

impl Fault {
    pub fn new(op: FaultOp, kind: Kind, message: impl Into<String>) -> Self {
        Self {
            op,
            kind,
            name: None,
            message: message.into(),
            error: FaultError::Internal,
            remaining: None,
        }
    }

    pub fn for_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_error(mut self, error: FaultError) -> Self {
        self.error = error;
        self
    }

    /// Fail only the next `count` matching calls.
    pub fn times(mut self, count: u32) -> Self {
        self.remaining = Some(count);
        self
    }

    pub(crate) fn matches(&self, op: FaultOp, kind: &Kind, name: Option<&str>) -> bool {
        if self.op != op || &self.kind != kind {
            return false;
        }
        if self.remaining == Some(0) {
            return false;
        }
        match (&self.name, name) {
            (None, _) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (Some(_), None) => false,
        }
    }

    pub(crate) fn to_error(&self, key: Option<ObjectKey>) -> StoreError {
        match (self.error, key) {
            (FaultError::Conflict, Some(key)) => StoreError::conflict(key, self.message.clone()),
            (FaultError::Unavailable, _) => StoreError::unavailable(self.message.clone()),
            _ => StoreError::internal(self.message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_matching() {
        let fault = Fault::new(FaultOp::Update, Kind::Notebook, "boom").for_name("nb-1");
        assert!(fault.matches(FaultOp::Update, &Kind::Notebook, Some("nb-1")));
        assert!(!fault.matches(FaultOp::Update, &Kind::Notebook, Some("nb-2")));
        assert!(!fault.matches(FaultOp::Update, &Kind::Notebook, None));
        assert!(!fault.matches(FaultOp::Create, &Kind::Notebook, Some("nb-1")));
        assert!(!fault.matches(FaultOp::Update, &Kind::InferenceService, Some("nb-1")));

        let any = Fault::new(FaultOp::List, Kind::Deployment, "down");
        assert!(any.matches(FaultOp::List, &Kind::Deployment, None));

        let spent = any.times(0);
        assert!(!spent.matches(FaultOp::List, &Kind::Deployment, None));
    }

    #[test]
    fn test_fault_error_shapes() {
        let key = ObjectKey::new(Kind::Notebook, Some("ns"), "nb");
        let conflict = Fault::new(FaultOp::Update, Kind::Notebook, "denied")
            .with_error(FaultError::Conflict)
            .to_error(Some(key));
        assert!(matches!(conflict, StoreError::Conflict { .. }));

        let unavailable = Fault::new(FaultOp::List, Kind::Notebook, "down")
            .with_error(FaultError::Unavailable)
            .to_error(None);
        assert!(matches!(unavailable, StoreError::Unavailable { .. }));

        let internal = Fault::new(FaultOp::Get, Kind::Notebook, "boom").to_error(None);
        assert_eq!(internal.to_string(), "Internal error: boom");
    }
}
