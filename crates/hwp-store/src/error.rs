//! Error types returned by object store backends.

use hwp_core::ObjectKey;
use std::fmt;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("Object not found: {0}")]
    NotFound(ObjectKey),

    /// Attempted to create an object that already exists.
    #[error("Object already exists: {0}")]
    AlreadyExists(ObjectKey),

    /// The kind is not registered with the store.
    #[error("No such kind: {kind}")]
    NoSuchKind {
        /// The unregistered kind name.
        kind: String,
    },

    /// A write was rejected because of a concurrent change or admission policy.
    #[error("Conflict on {key}: {message}")]
    Conflict {
        /// The object the write targeted.
        key: ObjectKey,
        /// Why the write was rejected.
        message: String,
    },

    /// The object data is invalid.
    #[error("Invalid object: {message}")]
    InvalidObject {
        /// Description of why the object is invalid.
        message: String,
    },

    /// The backend could not be reached.
    #[error("Store unavailable: {message}")]
    Unavailable {
        /// Description of the connectivity problem.
        message: String,
    },

    /// An internal store error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(key: ObjectKey) -> Self {
        Self::NotFound(key)
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(key: ObjectKey) -> Self {
        Self::AlreadyExists(key)
    }

    /// Creates a new `NoSuchKind` error.
    #[must_use]
    pub fn no_such_kind(kind: impl Into<String>) -> Self {
        Self::NoSuchKind { kind: kind.into() }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(key: ObjectKey, message: impl Into<String>) -> Self {
        Self::Conflict {
            key,
            message: message.into(),
        }
    }

    /// Creates a new `InvalidObject` error.
    #[must_use]
    pub fn invalid_object(message: impl Into<String>) -> Self {
        Self::InvalidObject {
            message: message.into(),
        }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    /// Returns `true` if the kind is not registered.
    #[must_use]
    pub fn is_no_such_kind(&self) -> bool {
        matches!(self, Self::NoSuchKind { .. })
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) => ErrorCategory::NotFound,
            Self::AlreadyExists(_) | Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::NoSuchKind { .. } => ErrorCategory::Unsupported,
            Self::InvalidObject { .. } => ErrorCategory::Validation,
            Self::Unavailable { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<hwp_core::CoreError> for StoreError {
    fn from(err: hwp_core::CoreError) -> Self {
        Self::invalid_object(err.to_string())
    }
}

/// Categories of store errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Object not found.
    NotFound,
    /// Existence or write conflict.
    Conflict,
    /// Kind not registered.
    Unsupported,
    /// Validation error.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwp_core::Kind;

    fn key() -> ObjectKey {
        ObjectKey::new(Kind::HardwareProfile, Some("opendatahub"), "gpu-notebooks")
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found(key());
        assert_eq!(
            err.to_string(),
            "Object not found: HardwareProfile opendatahub/gpu-notebooks"
        );

        let err = StoreError::already_exists(key());
        assert_eq!(
            err.to_string(),
            "Object already exists: HardwareProfile opendatahub/gpu-notebooks"
        );

        let err = StoreError::no_such_kind("AcceleratorProfile");
        assert_eq!(err.to_string(), "No such kind: AcceleratorProfile");
    }

    #[test]
    fn test_error_predicates() {
        let err = StoreError::not_found(key());
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
        assert!(!err.is_no_such_kind());

        let err = StoreError::already_exists(key());
        assert!(err.is_already_exists());
        assert!(StoreError::no_such_kind("X").is_no_such_kind());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StoreError::not_found(key()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StoreError::conflict(key(), "denied by admission policy").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StoreError::no_such_kind("X").category(),
            ErrorCategory::Unsupported
        );
        assert_eq!(
            StoreError::unavailable("connection refused").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(ErrorCategory::Unsupported.to_string(), "unsupported");
    }
}
