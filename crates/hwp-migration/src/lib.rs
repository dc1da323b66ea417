//! Migration from legacy accelerator profiles and dashboard container sizes
//! to hardware profiles.
//!
//! A pass creates the hardware profiles that replace every accelerator
//! profile and container size, then points notebooks and inference services
//! at them through annotations. Profiles are create-only and workloads that
//! already reference a profile are left alone, so a pass can be repeated
//! safely.
//!
//! # Example
//!
//! ```ignore
//! use hwp_migration::{CancellationToken, migrate};
//!
//! let report = migrate(&store, &settings, Some(&dashboard), &CancellationToken::new()).await?;
//! for error in &report.errors {
//!     eprintln!("{error}");
//! }
//! ```

pub mod aggregate;
mod cancel;
pub mod convergence;
pub mod error;
pub mod generator;
pub mod matcher;
pub mod orchestrator;
pub mod report;
pub mod upsert;

pub use aggregate::{ResourceBounds, aggregate};
pub use convergence::{BackoffPolicy, LegacySelector, converge};
pub use error::{
    AggregateError, ErrorList, GenerateError, MigrationError, PresetFailure, ProfileOrigin,
    StepError,
};
pub use matcher::{AnnotationMatcher, Exemption, ProfileTarget, Resolution, WorkloadKind};
pub use orchestrator::{migrate, run};
pub use report::{MigrationReport, Outcome, Phase, PhaseResult, SkipReason};
pub use upsert::{UpsertOutcome, upsert_all, upsert_profile};

pub use tokio_util::sync::CancellationToken;
