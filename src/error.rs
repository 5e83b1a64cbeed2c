//! Error types for evidence filtering.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The candidate has no exon, or its first exon carries no evidence.
    #[error("Malformed candidate '{candidate}': {reason}")]
    MalformedCandidate { candidate: String, reason: &'static str },

    #[error("Invalid threshold: {field} must be a finite, non-negative number, got {value}")]
    InvalidThreshold { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, FilterError>;
