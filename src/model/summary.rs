use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::model::candidate::Candidate;

/// Human-readable overview of a candidate set, before any filtering.
///
/// Global summary:
/// - number of candidates, how many are spliced, how many are malformed
/// - number of distinct evidence sequences
///
/// Per-sequence-region summary:
/// - candidates and distinct evidence sequences aligned there
///
/// Meant for logging and the `inspect` command, not machine-readable output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSummary {
    pub candidates: usize,
    pub spliced: usize,
    pub malformed: usize,
    pub sources: usize,
    /// seq region -> (candidates, distinct sources)
    pub per_region: BTreeMap<String, (usize, usize)>,
}

impl CandidateSummary {
    pub fn from_candidates<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        let mut out = CandidateSummary::default();
        let mut sources: HashSet<&str> = HashSet::new();
        let mut region_sources: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();

        for c in candidates {
            out.candidates += 1;
            if c.is_spliced() {
                out.spliced += 1;
            }

            let region = c.seq_region().unwrap_or("<none>");
            out.per_region.entry(region.to_string()).or_default().0 += 1;

            match c.metrics() {
                Ok(m) => {
                    sources.insert(m.source_id);
                    region_sources.entry(region).or_default().insert(m.source_id);
                }
                Err(_) => out.malformed += 1,
            }
        }

        out.sources = sources.len();
        for (region, srcs) in region_sources {
            if let Some(entry) = out.per_region.get_mut(region) {
                entry.1 = srcs.len();
            }
        }
        out
    }
}

impl fmt::Display for CandidateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} candidates ({} spliced, {} malformed) from {} evidence sequences",
            self.candidates, self.spliced, self.malformed, self.sources
        )?;
        for (region, (n, srcs)) in &self.per_region {
            writeln!(f, "  - {}: candidates={}, sources={}", region, n, srcs)?;
        }
        Ok(())
    }
}
