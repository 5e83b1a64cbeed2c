//! Evidence filter: pick, per evidence sequence, the candidate alignments
//! that best represent a real transcript.
//!
//! Workflow of one call:
//! 1) drop candidates under `PREFILTER_FLOOR` coverage or identity
//! 2) group the rest by source id
//! 3) rank each group (coverage, exon count, percent identity; all descending)
//! 4) walk each ranked group once, deciding on every candidate

pub mod accept;
pub mod options;
pub mod rank;

use std::fmt;

use log::{debug, info};

use crate::error::Result;
use crate::model::candidate::Candidate;
use crate::model::types::{CandidateId, EvidenceMetrics};

pub use accept::{GroupState, Verdict};
pub use options::{FilterOptions, PREFILTER_FLOOR};
use rank::{group_by_source, Scored};

/// The decision taken for one input candidate.
///
/// Borrows the candidate from the caller's collection.
#[derive(Debug, Clone)]
pub struct Decision<'a> {
    pub candidate: &'a Candidate,
    pub source_id: &'a str,
    pub metrics: EvidenceMetrics<'a>,
    /// 1-based position in the ranked group; `None` for pre-filtered candidates.
    pub rank: Option<usize>,
    pub verdict: Verdict,
}

/// Counts per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub candidates: usize,
    pub groups: usize,
    pub accepted: usize,
    pub below_floor: usize,
    pub below_threshold: usize,
    pub processed_pseudogenes: usize,
}

impl FilterStats {
    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Accepted => self.accepted += 1,
            Verdict::BelowFloor => self.below_floor += 1,
            Verdict::BelowThreshold => self.below_threshold += 1,
            Verdict::ProcessedPseudogene => self.processed_pseudogenes += 1,
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates in {} source groups: {} accepted, {} below floor, {} below threshold, {} processed pseudogenes",
            self.candidates,
            self.groups,
            self.accepted,
            self.below_floor,
            self.below_threshold,
            self.processed_pseudogenes
        )
    }
}

/// Accepted candidates plus the decision trail that produced them.
#[derive(Debug, Clone)]
pub struct FilterReport<'a> {
    /// Accepted candidates in group-then-rank order.
    pub accepted: Vec<&'a Candidate>,
    /// One entry per input candidate: pre-filtered ones first (input order),
    /// then every grouped candidate in group-then-rank order.
    pub decisions: Vec<Decision<'a>>,
    pub stats: FilterStats,
}

impl FilterReport<'_> {
    pub fn verdict_of(&self, id: CandidateId) -> Option<Verdict> {
        self.decisions
            .iter()
            .find(|d| d.candidate.id == id)
            .map(|d| d.verdict)
    }
}

/// Stateless apart from its options; one instance can filter any number of
/// candidate sets, from any number of threads.
#[derive(Debug, Clone)]
pub struct EvidenceFilter {
    opts: FilterOptions,
}

impl EvidenceFilter {
    pub fn new(opts: FilterOptions) -> Result<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    pub fn options(&self) -> &FilterOptions {
        &self.opts
    }

    /// Return the accepted subset of `candidates`.
    ///
    /// Every candidate must have at least one exon and evidence on its first
    /// exon; otherwise the call fails with `FilterError::MalformedCandidate`
    /// before any decision is made.
    ///
    /// # Example
    /// ```
    /// use evidence_filter::{Candidate, EvidenceFilter, FilterOptions};
    /// use evidence_filter::types::{Evidence, Exon, Strand};
    ///
    /// let cands = vec![
    ///     Candidate::from_exons(0, "a", vec![
    ///         Exon::new("chr1", 100, 200, Strand::Plus).with_evidence(Evidence::new("NM_1", 95.0, 92.0)),
    ///         Exon::new("chr1", 400, 500, Strand::Plus),
    ///     ]),
    ///     Candidate::from_exons(1, "b", vec![
    ///         Exon::new("chr5", 100, 300, Strand::Plus).with_evidence(Evidence::new("NM_1", 70.0, 99.0)),
    ///     ]),
    /// ];
    ///
    /// let filter = EvidenceFilter::new(FilterOptions::new().min_coverage(80.0)).unwrap();
    /// let kept = filter.filter(&cands).unwrap();
    /// assert_eq!(kept.len(), 1);
    /// assert_eq!(kept[0].name, "a");
    /// ```
    pub fn filter<'a, I>(&self, candidates: I) -> Result<Vec<&'a Candidate>>
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        Ok(self.filter_with_report(candidates)?.accepted)
    }

    /// Like `filter`, but also returns the verdict for every candidate.
    pub fn filter_with_report<'a, I>(&self, candidates: I) -> Result<FilterReport<'a>>
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        // Check every candidate up front, so a malformed one fails the call
        // without a partial result.
        let scored: Vec<Scored<'a>> = candidates
            .into_iter()
            .map(|c| -> Result<Scored<'a>> {
                Ok(Scored {
                    candidate: c,
                    metrics: c.metrics()?,
                })
            })
            .collect::<Result<_>>()?;

        let mut stats = FilterStats {
            candidates: scored.len(),
            ..Default::default()
        };
        let mut decisions: Vec<Decision<'a>> = Vec::with_capacity(scored.len());
        let mut accepted: Vec<&'a Candidate> = Vec::new();

        let (kept, floored): (Vec<Scored<'a>>, Vec<Scored<'a>>) =
            scored.into_iter().partition(|s| {
                s.metrics.coverage >= PREFILTER_FLOOR && s.metrics.percent_identity >= PREFILTER_FLOOR
            });

        for s in floored {
            self.trace(&s, None, Verdict::BelowFloor);
            stats.record(Verdict::BelowFloor);
            decisions.push(Decision {
                candidate: s.candidate,
                source_id: s.metrics.source_id,
                metrics: s.metrics,
                rank: None,
                verdict: Verdict::BelowFloor,
            });
        }

        let mut groups = group_by_source(kept);
        stats.groups = groups.len();

        for group in &mut groups {
            group.rank();

            let mut state = GroupState::new();
            for s in &group.members {
                let verdict = state.step(s, &self.opts);
                self.trace(s, Some(state.rank), verdict);
                stats.record(verdict);

                if verdict.is_accepted() {
                    accepted.push(s.candidate);
                }
                decisions.push(Decision {
                    candidate: s.candidate,
                    source_id: group.source_id,
                    metrics: s.metrics,
                    rank: Some(state.rank),
                    verdict,
                });
            }
        }

        info!("{stats}");

        Ok(FilterReport {
            accepted,
            decisions,
            stats,
        })
    }

    fn trace(&self, s: &Scored<'_>, rank: Option<usize>, verdict: Verdict) {
        debug!(
            "{}\t{}\trank={}\tcoverage={}\tpercent_id={}\texons={}\t{}",
            s.candidate.name,
            s.metrics.source_id,
            rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            s.metrics.coverage,
            s.metrics.percent_identity,
            s.metrics.exon_count,
            verdict
        );
    }
}
