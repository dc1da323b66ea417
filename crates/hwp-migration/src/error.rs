//! Error model of the migration.
//!
//! Failures scoped to one profile or workload are [`StepError`]s. They are
//! collected into an [`ErrorList`] and never stop a batch. Failures that end
//! a phase or the whole run are [`MigrationError`]s and travel through
//! `Result::Err`.

use hwp_config::ConfigError;
use hwp_core::{CoreError, Kind, ObjectKey, ProfileType};
use hwp_store::StoreError;
use serde::Serialize;
use std::fmt;

/// A container size whose quantities could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetFailure {
    pub name: String,
    pub reasons: Vec<String>,
}

/// Aggregation failed because at least one preset was unparseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    pub failures: Vec<PresetFailure>,
}

impl AggregateError {
    /// Names of every offending preset.
    pub fn preset_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse resources for container size(s): ")?;
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{} ({})", failure.name, failure.reasons.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to get spec from AcceleratorProfile {namespace}/{name}")]
    MissingSpec { namespace: String, name: String },
}

/// What a generated profile was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ProfileOrigin {
    AcceleratorProfile { namespace: String, name: String },
    ContainerSize { name: String },
    CustomServing,
}

impl fmt::Display for ProfileOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileOrigin::AcceleratorProfile { namespace, name } => {
                write!(f, "AcceleratorProfile {namespace}/{name}")
            }
            ProfileOrigin::ContainerSize { name } => write!(f, "container size '{name}'"),
            ProfileOrigin::CustomServing => write!(f, "custom serving defaults"),
        }
    }
}

/// A failure scoped to a single profile or workload.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("failed to calculate notebook resource bounds: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("failed to get container sizes from spec.{field}: not a list")]
    MalformedSizeList { field: String },

    #[error("failed to generate {profile_type} HardwareProfile from {origin}: {source}")]
    Generate {
        origin: ProfileOrigin,
        profile_type: ProfileType,
        #[source]
        source: GenerateError,
    },

    #[error("failed to encode HardwareProfile {name} from {origin}: {source}")]
    Encode {
        name: String,
        origin: ProfileOrigin,
        #[source]
        source: CoreError,
    },

    #[error("failed to create HardwareProfile {namespace}/{name} from {origin}: {source}")]
    Create {
        namespace: String,
        name: String,
        origin: ProfileOrigin,
        #[source]
        source: StoreError,
    },

    #[error("failed to list {kind}{}: {source}", scope(.namespace))]
    List {
        kind: Kind,
        namespace: Option<String>,
        #[source]
        source: StoreError,
    },

    #[error("failed to read {key}: {source}")]
    Lookup {
        key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("failed to annotate {key} with HardwareProfile {profile}: {source}")]
    Annotate {
        key: ObjectKey,
        profile: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to delete {key}: {source}")]
    Delete {
        key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("failed to confirm deletion of {key}: {source}")]
    Poll {
        key: ObjectKey,
        #[source]
        source: StoreError,
    },
}

fn scope(namespace: &Option<String>) -> String {
    match namespace {
        Some(ns) => format!(" in namespace {ns}"),
        None => String::new(),
    }
}

impl StepError {
    /// Store error behind this failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            StepError::Create { source, .. }
            | StepError::List { source, .. }
            | StepError::Lookup { source, .. }
            | StepError::Annotate { source, .. }
            | StepError::Delete { source, .. }
            | StepError::Poll { source, .. } => Some(source),
            StepError::Aggregate(_)
            | StepError::MalformedSizeList { .. }
            | StepError::Generate { .. }
            | StepError::Encode { .. } => None,
        }
    }
}

/// Append-only collection of independent item failures.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<StepError>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<StepError>) {
        self.errors.push(error.into());
    }

    /// Move every error of `other` to the end of this list.
    pub fn append(&mut self, other: ErrorList) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StepError> {
        self.errors.iter()
    }

    /// `Err(self)` when any error was recorded.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s) occurred:", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n\t* {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = StepError;
    type IntoIter = std::vec::IntoIter<StepError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a StepError;
    type IntoIter = std::slice::Iter<'a, StepError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Failures that abort a phase or the whole run.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migration cancelled")]
    Cancelled,

    #[error("timed out after {attempts} attempt(s) waiting for legacy {kind} objects in {namespace} to be deleted")]
    Timeout {
        kind: Kind,
        namespace: String,
        attempts: u32,
        /// Item failures seen before giving up.
        errors: ErrorList,
    },

    #[error("capability check for {kind} failed: {source}")]
    CapabilityCheck {
        kind: Kind,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to compute modification timestamp: {0}")]
    Timestamp(#[source] CoreError),
}

impl MigrationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MigrationError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, MigrationError::Timeout { .. })
    }
}
