use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::options::{
    FilterOptions, RELAXED_COVERAGE_FACTOR, RELAXED_PERCENT_FACTOR, TOLERANCE_FRACTION,
};
use crate::filter::rank::Scored;

/// Outcome for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,

    /// Coverage or percent identity under the fixed pre-filter floor.
    BelowFloor,

    /// Failed both threshold clauses for the active selection policy.
    BelowThreshold,

    /// Unspliced, ranked below a spliced best candidate.
    ProcessedPseudogene,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Accepted => "Accepted",
            Verdict::BelowFloor => "BelowFloor",
            Verdict::BelowThreshold => "BelowThreshold",
            Verdict::ProcessedPseudogene => "ProcessedPseudogene",
        };
        write!(f, "{s}")
    }
}

impl Verdict {
    #[inline]
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// Running state of one group's acceptance pass.
///
/// `max_score` and `best_is_spliced` are fixed by the rank-1 candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupState {
    pub rank: usize,
    pub max_score: f64,
    pub best_is_spliced: bool,
}

impl GroupState {
    pub fn new() -> Self {
        Self {
            rank: 0,
            max_score: 0.0,
            best_is_spliced: false,
        }
    }

    /// Advance to the next candidate in rank order and decide on it.
    pub fn step(&mut self, scored: &Scored<'_>, opts: &FilterOptions) -> Verdict {
        self.rank += 1;
        let coverage = scored.metrics.coverage;

        if self.rank == 1 {
            self.max_score = coverage;
            // Only needed by the pseudogene rule.
            if opts.reject_processed_pseudos {
                self.best_is_spliced = scored.candidate.is_spliced();
            }
        } else if opts.reject_processed_pseudos
            && self.best_is_spliced
            && !scored.candidate.is_spliced()
        {
            return Verdict::ProcessedPseudogene;
        }

        if passes_thresholds(coverage, scored.metrics.percent_identity, self.max_score, opts) {
            Verdict::Accepted
        } else {
            Verdict::BelowThreshold
        }
    }
}

impl Default for GroupState {
    fn default() -> Self {
        Self::new()
    }
}

/// Two-clause acceptance test.
///
/// Both clauses require the coverage to be on par with the group's best
/// (equal to it in best-in-genome mode, within `TOLERANCE_FRACTION` of it
/// otherwise). The first clause then requires the configured thresholds;
/// the second trades a slightly higher coverage bar for a lower identity bar.
pub fn passes_thresholds(coverage: f64, percent_id: f64, max_score: f64, opts: &FilterOptions) -> bool {
    let near_best = if opts.best_in_genome {
        coverage == max_score
    } else {
        coverage >= TOLERANCE_FRACTION * max_score
    };

    (near_best && coverage >= opts.min_coverage && percent_id >= opts.min_percent)
        || (near_best
            && coverage >= RELAXED_COVERAGE_FACTOR * opts.min_coverage
            && percent_id >= RELAXED_PERCENT_FACTOR * opts.min_percent)
}
