use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};

/// Candidates below this coverage or percent identity are dropped before
/// grouping, whatever the configured thresholds.
pub const PREFILTER_FLOOR: f64 = 40.0;

/// In tolerance mode a candidate is kept if its coverage is at least this
/// fraction of the best coverage in its group.
pub const TOLERANCE_FRACTION: f64 = 0.98;

/// Second acceptance clause: coverage must reach `RELAXED_COVERAGE_FACTOR * min_coverage`
/// while percent identity only needs `RELAXED_PERCENT_FACTOR * min_percent`.
pub const RELAXED_COVERAGE_FACTOR: f64 = 1.05;
pub const RELAXED_PERCENT_FACTOR: f64 = 0.97;

/// Options controlling which candidates are accepted.
///
/// Unset thresholds are 0.0, i.e. no lower bound beyond `PREFILTER_FLOOR`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Minimum coverage of an accepted candidate.
    #[serde(alias = "min_score")]
    pub min_coverage: f64,

    /// Minimum percent identity of an accepted candidate.
    pub min_percent: f64,

    /// If true, only candidates whose coverage equals the best in their group
    /// are accepted; otherwise anything within 2% of the best is.
    pub best_in_genome: bool,

    /// If true, an unspliced candidate is rejected when the best candidate
    /// of its group is spliced.
    pub reject_processed_pseudos: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_coverage: 0.0,
            min_percent: 0.0,
            best_in_genome: false,
            reject_processed_pseudos: false,
        }
    }
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_coverage(mut self, value: f64) -> Self {
        self.min_coverage = value;
        self
    }

    /// Same as `min_coverage`.
    pub fn min_score(self, value: f64) -> Self {
        self.min_coverage(value)
    }

    pub fn min_percent(mut self, value: f64) -> Self {
        self.min_percent = value;
        self
    }

    pub fn best_in_genome(mut self, on: bool) -> Self {
        self.best_in_genome = on;
        self
    }

    pub fn reject_processed_pseudos(mut self, on: bool) -> Self {
        self.reject_processed_pseudos = on;
        self
    }

    /// Thresholds must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("min_coverage", self.min_coverage),
            ("min_percent", self.min_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(FilterError::InvalidThreshold { field, value });
            }
        }
        Ok(())
    }
}
