/// Internal numeric ID (index into the caller's candidate Vec).
pub type CandidateId = usize;

/// The per-candidate values the filter ranks and tests on.
///
/// Borrowed from the candidate's representative evidence record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvidenceMetrics<'a> {
    pub coverage: f64,
    pub percent_identity: f64,
    pub source_id: &'a str,
    pub exon_count: usize,
}
