use crate::error::{FilterError, Result};
use crate::model::types::{CandidateId, EvidenceMetrics};
use crate::types::{Evidence, Exon, MAX_ARTIFACT_GAP};
use serde::Serialize;

/// A candidate transcript model produced by aligning one evidence sequence
/// to the genome.
///
/// The aligner attaches the evidence record(s) to the first exon; the first
/// evidence record of the first exon stands for the whole candidate.
/// Serialize-only: exon order is maintained by `add_exon`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// Always ordered by (start, end).
    exons: Vec<Exon>,
}

impl Candidate {
    pub fn new(id: CandidateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            exons: Vec::new(),
        }
    }

    /// Build a candidate from exons given in any order.
    pub fn from_exons(id: CandidateId, name: impl Into<String>, exons: Vec<Exon>) -> Self {
        let mut c = Self::new(id, name);
        for e in exons {
            c.add_exon(e);
        }
        c
    }

    /// Insert keeping exons sorted by (start, end); equal exons keep
    /// insertion order. Exons are never merged, the exon count is a
    /// ranking key.
    pub fn add_exon(&mut self, exon: Exon) {
        let key = (exon.start, exon.end);
        let pos = self.exons.partition_point(|e| (e.start, e.end) <= key);
        self.exons.insert(pos, exon);
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    #[inline]
    pub fn exon_count(&self) -> usize {
        self.exons.len()
    }

    pub fn seq_region(&self) -> Option<&str> {
        self.exons.first().map(|e| e.seq_region.as_str())
    }

    /// Genomic span (min start, max end), inclusive.
    pub fn span(&self) -> Option<(u32, u32)> {
        let start = self.exons.iter().map(|e| e.start).min()?;
        let end = self.exons.iter().map(|e| e.end).max()?;
        Some((start, end))
    }

    /// Representative evidence: the first evidence record of the first exon.
    pub fn first_evidence(&self) -> Result<&Evidence> {
        let exon = self.exons.first().ok_or_else(|| FilterError::MalformedCandidate {
            candidate: self.name.clone(),
            reason: "candidate has no exons",
        })?;
        exon.evidence.first().ok_or_else(|| FilterError::MalformedCandidate {
            candidate: self.name.clone(),
            reason: "first exon carries no evidence",
        })
    }

    pub fn metrics(&self) -> Result<EvidenceMetrics<'_>> {
        let ev = self.first_evidence()?;
        Ok(EvidenceMetrics {
            coverage: ev.score,
            percent_identity: ev.percent_identity,
            source_id: ev.source_id.as_str(),
            exon_count: self.exon_count(),
        })
    }

    /// Introns longer than the artifact threshold, in genomic order.
    pub fn introns(&self) -> Vec<(u32, u32)> {
        Exon::introns_from_exons(&self.exons, MAX_ARTIFACT_GAP)
    }

    /// True iff the candidate has more than one exon and at least one gap
    /// between consecutive exons exceeds `MAX_ARTIFACT_GAP` bases.
    pub fn is_spliced(&self) -> bool {
        self.exons.len() > 1 && !self.introns().is_empty()
    }
}
