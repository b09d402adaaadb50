//! Tempo planning
//!
//! FFmpeg's `atempo` filter only accepts multipliers in `[0.5, 2.0]`.
//! Anything outside that range is realized by chaining several filters
//! whose product equals the requested speed, e.g. 0.25x becomes
//! `atempo=0.5,atempo=0.5`.

use crate::request::Speed;
use std::fmt;

/// Smallest multiplier a single tempo filter stage accepts
pub const MIN_STAGE: f64 = 0.5;

/// Largest multiplier a single tempo filter stage accepts
pub const MAX_STAGE: f64 = 2.0;

/// A single tempo multiplier within `[MIN_STAGE, MAX_STAGE]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStage(f64);

impl FilterStage {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Ordered tempo stages whose product is the requested speed
#[derive(Debug, Clone, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Product of all stage multipliers
    pub fn product(&self) -> f64 {
        self.stages.iter().map(FilterStage::value).product()
    }

    /// Stage values as strings, e.g. `["0.5", "0.5"]`
    pub fn stage_labels(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.to_string()).collect()
    }

    /// FFmpeg audio filter graph, e.g. `atempo=0.5,atempo=0.5`
    pub fn atempo_filter(&self) -> String {
        self.stages
            .iter()
            .map(|s| format!("atempo={}", s))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for FilterChain {
    /// Comma-joined stage list, e.g. `0.5,0.5`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stage_labels().join(","))
    }
}

/// Decompose `speed` into in-range tempo stages.
///
/// Greedy: emit `0.5` while the remainder is below range, `2.0` while it is
/// above, then one final stage with whatever remains. Terminates after
/// `O(log speed)` stages. `1.0` yields the single no-op stage `1.0`.
pub fn plan(speed: Speed) -> FilterChain {
    let mut stages = Vec::new();
    let mut remaining = speed.value();

    while remaining < MIN_STAGE {
        stages.push(FilterStage(MIN_STAGE));
        remaining /= MIN_STAGE;
    }
    while remaining > MAX_STAGE {
        stages.push(FilterStage(MAX_STAGE));
        remaining /= MAX_STAGE;
    }
    stages.push(FilterStage(remaining));

    tracing::trace!("Planned {} tempo stage(s) for {}x", stages.len(), speed);
    FilterChain { stages }
}
