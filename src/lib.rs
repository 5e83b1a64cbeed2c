//! evidence_filter
//!
//! Selects, from candidate transcript alignments of evidence sequences
//! (cDNA, EST, protein) against a genome, the ones that best represent real
//! transcripts, and suppresses likely processed pseudogenes.
//! Candidates are grouped per evidence sequence, ranked by coverage, exon
//! count and percent identity, and accepted by threshold and tie-break rules.

pub mod types;
pub mod error;
pub mod model;
pub mod filter;
pub mod annotation;
pub mod output;

pub use error::FilterError;

pub use filter::{Decision, EvidenceFilter, FilterOptions, FilterReport, FilterStats, Verdict};

pub use annotation::{CandidateLoader, EvidenceKeys};

pub use types::{Evidence, Exon, Strand};

pub use model::candidate::Candidate;
pub use model::types::{CandidateId, EvidenceMetrics};
pub use model::summary::CandidateSummary;
