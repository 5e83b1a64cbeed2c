use serde::{Deserialize, Serialize};

/// Gaps of this many bases or fewer between consecutive exons are
/// frameshifts or alignment artifacts, not introns.
pub const MAX_ARTIFACT_GAP: u32 = 9;

/// Genomic strand/orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    Plus,
    Minus,
    Unknown,
}

impl Strand {
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" | "1" => Some(Strand::Plus),
            "-" | "-1" => Some(Strand::Minus),
            "." | "?" | "0" => Some(Strand::Unknown),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unknown => '.',
        }
    }
}

/// Quality metrics of one evidence alignment, as reported by the aligner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Accession of the aligned evidence sequence (RNA, EST, protein...).
    pub source_id: String,
    /// Coverage of the evidence sequence, roughly 0..=100.
    pub score: f64,
    pub percent_identity: f64,
}

impl Evidence {
    pub fn new(source_id: impl Into<String>, score: f64, percent_identity: f64) -> Self {
        Self {
            source_id: source_id.into(),
            score,
            percent_identity,
        }
    }
}

/// One aligned exon.
/// Coordinates are 1-based, inclusive: [start, end]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exon {
    pub seq_region: String,
    pub start: u32,
    pub end: u32,
    pub strand: Strand,
    pub evidence: Vec<Evidence>,
}

impl Exon {
    /// Create a new exon without evidence. Panics if start > end.
    pub fn new(seq_region: impl Into<String>, start: u32, end: u32, strand: Strand) -> Self {
        assert!(start <= end, "Exon requires start <= end");
        Self {
            seq_region: seq_region.into(),
            start,
            end,
            strand,
            evidence: Vec::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    /// Number of bases strictly between this exon and `next`.
    /// Overlapping or touching exons have a gap of 0.
    #[inline]
    pub fn gap_to(&self, next: &Exon) -> u32 {
        next.start.saturating_sub(self.end.saturating_add(1))
    }

    /// Introns implied by an ordered list of exons, as inclusive (start, end) pairs.
    ///
    /// Gaps of at most `max_artifact_gap` bases are alignment artifacts and
    /// do NOT produce introns. Fewer than two exons yield an empty vec.
    pub fn introns_from_exons(exons: &[Exon], max_artifact_gap: u32) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        if exons.len() < 2 {
            return out;
        }

        for w in exons.windows(2) {
            let a = &w[0];
            let b = &w[1];

            let gap = a.gap_to(b);
            if gap == 0 || gap <= max_artifact_gap {
                continue;
            }

            out.push((a.end + 1, b.start - 1));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exon(start: u32, end: u32) -> Exon {
        Exon::new("chr1", start, end, Strand::Plus)
    }

    #[test]
    fn gap_is_bases_between_exons() {
        assert_eq!(exon(100, 200).gap_to(&exon(205, 300)), 4);
        assert_eq!(exon(100, 200).gap_to(&exon(215, 300)), 14);
        assert_eq!(exon(100, 200).gap_to(&exon(201, 300)), 0);
        // overlapping
        assert_eq!(exon(100, 200).gap_to(&exon(150, 300)), 0);
    }

    #[test]
    fn introns_skip_artifact_gaps() {
        let exons = vec![exon(100, 200), exon(205, 300), exon(400, 500)];
        assert_eq!(
            Exon::introns_from_exons(&exons, MAX_ARTIFACT_GAP),
            vec![(301, 399)]
        );
        assert_eq!(
            Exon::introns_from_exons(&exons, 0),
            vec![(201, 204), (301, 399)]
        );
    }

    #[test]
    fn gap_of_exactly_nine_is_an_artifact() {
        let exons = vec![exon(100, 200), exon(210, 300)];
        assert_eq!(exons[0].gap_to(&exons[1]), 9);
        assert!(Exon::introns_from_exons(&exons, MAX_ARTIFACT_GAP).is_empty());
    }

    #[test]
    fn strand_symbols() {
        assert_eq!(Strand::from_symbol("+"), Some(Strand::Plus));
        assert_eq!(Strand::from_symbol("-1"), Some(Strand::Minus));
        assert_eq!(Strand::from_symbol("x"), None);
        assert_eq!(Strand::Minus.symbol(), '-');
    }
}
