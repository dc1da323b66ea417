//! CPU and memory bounds across a set of container sizes.

use crate::error::{AggregateError, PresetFailure};
use hwp_core::wellknown::{DEFAULT_MIN_CPU, DEFAULT_MIN_MEMORY};
use hwp_core::{Quantity, SizedPreset};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MIN_CPU_KEY: &str = "minCpu";
pub const MIN_MEMORY_KEY: &str = "minMemory";
pub const MAX_CPU_KEY: &str = "maxCpu";
pub const MAX_MEMORY_KEY: &str = "maxMemory";

/// Smallest request and largest limit seen across presets.
///
/// Values are in canonical form (`1024Mi` is reported as `1Gi`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBounds {
    pub min_cpu: String,
    pub min_memory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory: Option<String>,
}

impl Default for ResourceBounds {
    fn default() -> Self {
        Self {
            min_cpu: DEFAULT_MIN_CPU.to_string(),
            min_memory: DEFAULT_MIN_MEMORY.to_string(),
            max_cpu: None,
            max_memory: None,
        }
    }
}

impl ResourceBounds {
    /// Flat `minCpu`/`minMemory`/`maxCpu`/`maxMemory` view. Max keys appear
    /// only when known.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert(MIN_CPU_KEY.to_string(), self.min_cpu.clone());
        map.insert(MIN_MEMORY_KEY.to_string(), self.min_memory.clone());
        if let Some(max_cpu) = &self.max_cpu {
            map.insert(MAX_CPU_KEY.to_string(), max_cpu.clone());
        }
        if let Some(max_memory) = &self.max_memory {
            map.insert(MAX_MEMORY_KEY.to_string(), max_memory.clone());
        }
        map
    }
}

struct ParsedPreset {
    request_cpu: Quantity,
    request_memory: Quantity,
    limit_cpu: Quantity,
    limit_memory: Quantity,
}

fn parse_preset(preset: &SizedPreset) -> Result<ParsedPreset, PresetFailure> {
    let mut reasons = Vec::new();
    let mut parse = |label: &str, raw: &str| match Quantity::parse(raw) {
        Ok(q) => Some(q),
        Err(e) => {
            reasons.push(format!("{label}: {e}"));
            None
        }
    };

    let request_cpu = parse("cpu request", &preset.requests.cpu);
    let request_memory = parse("memory request", &preset.requests.memory);
    let limit_cpu = parse("cpu limit", &preset.limits.cpu);
    let limit_memory = parse("memory limit", &preset.limits.memory);

    match (request_cpu, request_memory, limit_cpu, limit_memory) {
        (Some(request_cpu), Some(request_memory), Some(limit_cpu), Some(limit_memory)) => {
            Ok(ParsedPreset {
                request_cpu,
                request_memory,
                limit_cpu,
                limit_memory,
            })
        }
        _ => Err(PresetFailure {
            name: preset.name.clone(),
            reasons,
        }),
    }
}

/// A zero minimum counts as unset and is replaced by any later request.
fn lower(current: Option<Quantity>, candidate: Quantity) -> Option<Quantity> {
    match current {
        Some(min) if !min.is_zero() && candidate >= min => Some(min),
        _ => Some(candidate),
    }
}

/// Only non-zero limits raise the maximum.
fn raise(current: Option<Quantity>, candidate: Quantity) -> Option<Quantity> {
    if candidate.is_zero() {
        return current;
    }
    match current {
        Some(max) if candidate <= max => Some(max),
        _ => Some(candidate),
    }
}

/// Compute bounds across `presets`.
///
/// Every preset is parsed even after a failure; if any fails, the call fails
/// with one error naming all of them. An empty list yields the defaults
/// (`minCpu = 1`, `minMemory = 1Mi`, no max). Winning quantities are
/// reported in [canonical](Quantity::canonical) form, not as the preset
/// spelled them.
pub fn aggregate(presets: &[SizedPreset]) -> Result<ResourceBounds, AggregateError> {
    let mut failures = Vec::new();
    let mut min_cpu: Option<Quantity> = None;
    let mut min_memory: Option<Quantity> = None;
    let mut max_cpu: Option<Quantity> = None;
    let mut max_memory: Option<Quantity> = None;

    for preset in presets {
        match parse_preset(preset) {
            Ok(parsed) => {
                min_cpu = lower(min_cpu, parsed.request_cpu);
                min_memory = lower(min_memory, parsed.request_memory);
                max_cpu = raise(max_cpu, parsed.limit_cpu);
                max_memory = raise(max_memory, parsed.limit_memory);
            }
            Err(failure) => failures.push(failure),
        }
    }

    if !failures.is_empty() {
        return Err(AggregateError { failures });
    }

    let defaults = ResourceBounds::default();
    Ok(ResourceBounds {
        min_cpu: min_cpu.map_or(defaults.min_cpu, |q| q.canonical()),
        min_memory: min_memory.map_or(defaults.min_memory, |q| q.canonical()),
        max_cpu: max_cpu.map(|q| q.canonical()),
        max_memory: max_memory.map(|q| q.canonical()),
    })
}
