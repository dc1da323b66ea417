//! Per-phase counters and the combined run report.

use crate::error::{ErrorList, StepError};
use serde::Serialize;
use std::fmt;

/// Counters for one batch of profiles or workloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Profiles created or workloads annotated.
    pub applied: usize,
    /// Already in the target state.
    pub unchanged: usize,
    /// Exempt or without a matching reference.
    pub skipped: usize,
    pub failed: usize,
}

impl Outcome {
    pub fn merge(&mut self, other: Outcome) {
        self.applied += other.applied;
        self.unchanged += other.unchanged;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn total(&self) -> usize {
        self.applied + self.unchanged + self.skipped + self.failed
    }
}

/// Counters plus the item failures of one batch.
#[derive(Debug, Default)]
pub struct PhaseResult {
    pub outcome: Outcome,
    pub errors: ErrorList,
}

impl PhaseResult {
    pub fn applied(&mut self) {
        self.outcome.applied += 1;
    }

    pub fn unchanged(&mut self) {
        self.outcome.unchanged += 1;
    }

    pub fn skipped(&mut self) {
        self.outcome.skipped += 1;
    }

    pub fn failed(&mut self, error: impl Into<StepError>) {
        self.outcome.failed += 1;
        self.errors.push(error);
    }

    pub fn merge(&mut self, other: PhaseResult) {
        self.outcome.merge(other.outcome);
        self.errors.append(other.errors);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    AcceleratorProfiles,
    ContainerSizes,
    CustomServing,
    Notebooks,
    InferenceServices,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::AcceleratorProfiles => "accelerator-profiles",
            Phase::ContainerSizes => "container-sizes",
            Phase::CustomServing => "custom-serving",
            Phase::Notebooks => "notebooks",
            Phase::InferenceServices => "inference-services",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a whole run did nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NoApplicationNamespace,
    HardwareProfileKindUnavailable,
    DashboardConfigAbsent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoApplicationNamespace => write!(f, "application namespace is empty"),
            SkipReason::HardwareProfileKindUnavailable => {
                write!(f, "HardwareProfile kind is not installed")
            }
            SkipReason::DashboardConfigAbsent => write!(f, "dashboard config not found"),
        }
    }
}

/// Result of one migration run: what happened per phase and every item
/// failure.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub skipped: Option<SkipReason>,
    pub phases: Vec<(Phase, Outcome)>,
    pub errors: ErrorList,
}

impl MigrationReport {
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Default::default()
        }
    }

    pub fn record(&mut self, phase: Phase, result: PhaseResult) {
        self.phases.push((phase, result.outcome));
        self.errors.append(result.errors);
    }

    pub fn outcome(&self, phase: Phase) -> Option<Outcome> {
        self.phases
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, outcome)| *outcome)
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}
