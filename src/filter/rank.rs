use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::candidate::Candidate;
use crate::model::types::EvidenceMetrics;

/// A candidate paired with its representative metrics.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub candidate: &'a Candidate,
    pub metrics: EvidenceMetrics<'a>,
}

/// All candidates aligned from one evidence sequence.
#[derive(Debug, Clone)]
pub struct SourceGroup<'a> {
    pub source_id: &'a str,
    pub members: Vec<Scored<'a>>,
}

/// Ranking order inside a group: coverage desc, then exon count desc,
/// then percent identity desc.
pub fn rank_cmp(a: &EvidenceMetrics<'_>, b: &EvidenceMetrics<'_>) -> Ordering {
    b.coverage
        .total_cmp(&a.coverage)
        .then_with(|| b.exon_count.cmp(&a.exon_count))
        .then_with(|| b.percent_identity.total_cmp(&a.percent_identity))
}

/// Partition candidates by source id.
///
/// Groups come out in first-seen order of their source id; members keep
/// input order until `rank` is called.
pub fn group_by_source<'a, I>(scored: I) -> Vec<SourceGroup<'a>>
where
    I: IntoIterator<Item = Scored<'a>>,
{
    let mut key_to_idx: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<SourceGroup<'a>> = Vec::new();

    for s in scored {
        let idx = *key_to_idx.entry(s.metrics.source_id).or_insert_with(|| {
            groups.push(SourceGroup {
                source_id: s.metrics.source_id,
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[idx].members.push(s);
    }

    groups
}

impl SourceGroup<'_> {
    /// Stable sort, so full ties keep their input order.
    pub fn rank(&mut self) {
        self.members.sort_by(|a, b| rank_cmp(&a.metrics, &b.metrics));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Evidence, Exon, Strand};

    fn cand(id: usize, src: &str, cov: f64, pid: f64, n_exons: u32) -> Candidate {
        let exons = (0..n_exons)
            .map(|i| {
                let e = Exon::new("chr1", 1000 * i + 1, 1000 * i + 100, Strand::Plus);
                if i == 0 {
                    e.with_evidence(Evidence::new(src, cov, pid))
                } else {
                    e
                }
            })
            .collect();
        Candidate::from_exons(id, format!("c{id}"), exons)
    }

    fn scored(c: &Candidate) -> Scored<'_> {
        Scored {
            candidate: c,
            metrics: c.metrics().unwrap(),
        }
    }

    #[test]
    fn ranking_cascades_through_all_three_keys() {
        let cands = vec![
            cand(0, "S", 90.0, 99.0, 3),
            cand(1, "S", 95.0, 91.0, 1),
            cand(2, "S", 95.0, 92.0, 2),
            cand(3, "S", 95.0, 93.0, 2),
        ];
        let mut groups = group_by_source(cands.iter().map(scored));
        assert_eq!(groups.len(), 1);
        groups[0].rank();

        let order: Vec<usize> = groups[0].members.iter().map(|s| s.candidate.id).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let cands = vec![
            cand(0, "S", 80.0, 90.0, 2),
            cand(1, "S", 80.0, 90.0, 2),
            cand(2, "S", 80.0, 90.0, 2),
        ];
        let mut groups = group_by_source(cands.iter().map(scored));
        groups[0].rank();
        let order: Vec<usize> = groups[0].members.iter().map(|s| s.candidate.id).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn groups_are_first_seen_ordered() {
        let cands = vec![
            cand(0, "B", 80.0, 90.0, 1),
            cand(1, "A", 80.0, 90.0, 1),
            cand(2, "B", 70.0, 90.0, 1),
        ];
        let groups = group_by_source(cands.iter().map(scored));
        let keys: Vec<&str> = groups.iter().map(|g| g.source_id).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[1].members.len(), 1);
    }
}
