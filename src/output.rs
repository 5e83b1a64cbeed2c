//! Tab-separated output of filter results.

use std::io::{self, Write};

use crate::filter::{Decision, FilterReport};

pub const ACCEPTED_HEADER: &str =
    "name\tsource_id\tseq_region\tstart\tend\tstrand\texon_count\tcoverage\tpercent_id\tspliced";

pub const DECISION_HEADER: &str =
    "name\tsource_id\trank\tcoverage\tpercent_id\texon_count\tspliced\tverdict";

/// One row per accepted candidate, in the order of `report.accepted`.
pub fn write_accepted<W: Write>(out: &mut W, report: &FilterReport<'_>) -> io::Result<()> {
    writeln!(out, "{ACCEPTED_HEADER}")?;
    for d in report.decisions.iter().filter(|d| d.verdict.is_accepted()) {
        let (c, m) = (d.candidate, &d.metrics);
        let (start, end) = c.span().unwrap_or((0, 0));
        let strand = c.exons().first().map(|e| e.strand.symbol()).unwrap_or('.');
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            c.name,
            m.source_id,
            c.seq_region().unwrap_or("."),
            start,
            end,
            strand,
            m.exon_count,
            m.coverage,
            m.percent_identity,
            c.is_spliced()
        )?;
    }
    Ok(())
}

/// One row per decision, in report order.
pub fn write_decisions<W: Write>(out: &mut W, report: &FilterReport<'_>) -> io::Result<()> {
    writeln!(out, "{DECISION_HEADER}")?;
    for d in &report.decisions {
        write_decision(out, d)?;
    }
    Ok(())
}

fn write_decision<W: Write>(out: &mut W, d: &Decision<'_>) -> io::Result<()> {
    let rank = d.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        d.candidate.name,
        d.source_id,
        rank,
        d.metrics.coverage,
        d.metrics.percent_identity,
        d.metrics.exon_count,
        d.candidate.is_spliced(),
        d.verdict
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{EvidenceFilter, FilterOptions};
    use crate::model::candidate::Candidate;
    use crate::types::{Evidence, Exon, Strand};

    fn pool() -> Vec<Candidate> {
        vec![
            Candidate::from_exons(
                0,
                "aln1",
                vec![
                    Exon::new("chr1", 101, 200, Strand::Plus).with_evidence(Evidence::new("NM_1", 95.0, 92.5)),
                    Exon::new("chr1", 401, 500, Strand::Plus),
                ],
            ),
            Candidate::from_exons(
                1,
                "aln2",
                vec![Exon::new("chr9", 11, 300, Strand::Minus).with_evidence(Evidence::new("NM_1", 95.0, 92.0))],
            ),
        ]
    }

    #[test]
    fn accepted_rows() {
        let cands = pool();
        let f = EvidenceFilter::new(FilterOptions::new().reject_processed_pseudos(true)).unwrap();
        let report = f.filter_with_report(&cands).unwrap();

        let mut buf = Vec::new();
        write_accepted(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![ACCEPTED_HEADER, "aln1\tNM_1\tchr1\t101\t500\t+\t2\t95\t92.5\ttrue"]);
    }

    #[test]
    fn one_accepted_row_per_accepted_candidate() {
        let mut cands = pool();
        cands.push(Candidate::from_exons(
            2,
            "aln3",
            vec![Exon::new("chr3", 1, 100, Strand::Plus).with_evidence(Evidence::new("NM_2", 80.0, 99.0))],
        ));
        cands.push(Candidate::from_exons(
            3,
            "aln4",
            vec![Exon::new("chr4", 1, 100, Strand::Plus).with_evidence(Evidence::new("NM_3", 30.0, 99.0))],
        ));
        let f = EvidenceFilter::new(FilterOptions::new()).unwrap();
        let report = f.filter_with_report(&cands).unwrap();

        let mut buf = Vec::new();
        write_accepted(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let names: Vec<&str> = text.lines().skip(1).map(|l| l.split('\t').next().unwrap()).collect();
        let expected: Vec<&str> = report.accepted.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, expected);
        assert_eq!(names, vec!["aln1", "aln2", "aln3"]);
    }

    #[test]
    fn decision_rows() {
        let cands = pool();
        let f = EvidenceFilter::new(FilterOptions::new().reject_processed_pseudos(true)).unwrap();
        let report = f.filter_with_report(&cands).unwrap();

        let mut buf = Vec::new();
        write_decisions(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "aln1\tNM_1\t1\t95\t92.5\t2\ttrue\tAccepted");
        assert_eq!(lines[2], "aln2\tNM_1\t2\t95\t92\t1\tfalse\tProcessedPseudogene");
    }
}
