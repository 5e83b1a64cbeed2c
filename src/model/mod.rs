pub mod types;
pub mod candidate;
pub mod summary;

pub use types::{CandidateId, EvidenceMetrics};
pub use summary::CandidateSummary;
