use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::{info, warn};

use crate::annotation::io::{AnnotationReader, AnnotationRecord, ParseError};
use crate::model::candidate::Candidate;
use crate::model::types::CandidateId;
use crate::types::{Evidence, Exon};

/// Configure which attribute keys are used to extract:
/// - the candidate (alignment) identifier that groups exon lines
/// - the source id of the aligned evidence sequence
/// - coverage and percent identity of the alignment
///
/// We allow multiple keys per category; first present wins.
#[derive(Debug, Clone)]
pub struct EvidenceKeys {
    pub candidate_id_keys: Vec<String>,
    pub source_id_keys: Vec<String>,
    pub coverage_keys: Vec<String>,
    pub percent_id_keys: Vec<String>,

    /// Feature types that count as exon blocks (default: ["exon"])
    pub exon_feature_types: Vec<String>,
}

impl Default for EvidenceKeys {
    fn default() -> Self {
        Self {
            candidate_id_keys: vec!["transcript_id".into(), "Parent".into(), "ID".into()],
            source_id_keys: vec![
                "Target".into(),
                "target_id".into(),
                "source_id".into(),
                "hit_name".into(),
            ],
            coverage_keys: vec!["coverage".into(), "cov".into()],
            percent_id_keys: vec!["percent_id".into(), "pid".into(), "identity".into()],
            exon_feature_types: vec!["exon".into()],
        }
    }
}

/// Builds candidates from aligner output in GTF/GFF3 form.
///
/// Exon records sharing a candidate id become one candidate, in first-seen
/// order. An exon gets evidence when its record names a source id, a coverage
/// and a percent identity.
#[derive(Debug, Clone, Default)]
pub struct CandidateLoader {
    pub keys: EvidenceKeys,
}

impl CandidateLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidate_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.candidate_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn source_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.source_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn coverage_keys(mut self, keys: &[&str]) -> Self {
        self.keys.coverage_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn percent_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.percent_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn exon_feature_types(mut self, types: &[&str]) -> Self {
        self.keys.exon_feature_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Load candidates from anything implementing `BufRead`.
    pub fn load_from_reader<R: BufRead>(&self, reader: R) -> Result<Vec<Candidate>, ParseError> {
        let mut key_to_id: HashMap<String, CandidateId> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;

            if !rec.is_exon_feature(&self.keys.exon_feature_types) {
                continue;
            }

            let key = rec
                .pick_first_attr(&self.keys.candidate_id_keys)
                .ok_or_else(|| ParseError::MalformedLine {
                    line_no: rec.line_no,
                    problem: format!(
                        "missing candidate id attribute (tried keys: {:?})",
                        self.keys.candidate_id_keys
                    ),
                    line: format!("{}:{}-{}", rec.seqname, rec.start, rec.end),
                })?;

            let id = *key_to_id.entry(key.clone()).or_insert_with(|| {
                candidates.push(Candidate::new(candidates.len(), key));
                candidates.len() - 1
            });

            let mut exon = Exon::new(rec.seqname.as_str(), rec.start, rec.end, rec.strand);
            if let Some(ev) = self.evidence_of(&rec)? {
                exon = exon.with_evidence(ev);
            }
            candidates[id].add_exon(exon);
        }

        for c in &candidates {
            if c.exons().first().map_or(true, |e| e.evidence.is_empty()) {
                warn!("candidate {} has no evidence on its first exon", c.name);
            }
        }

        Ok(candidates)
    }

    /// Load candidates from a file path.
    ///
    /// If path ends with `.gz`, the file is decompressed on the fly.
    pub fn load_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Candidate>> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("open alignment file {}", path.display()))?;

        let is_gz = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let loaded = if is_gz {
            self.load_from_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            self.load_from_reader(BufReader::new(file))
        };
        let candidates =
            loaded.with_context(|| format!("load candidates from {}", path.display()))?;

        info!("loaded {} candidates from {}", candidates.len(), path.display());
        Ok(candidates)
    }

    fn evidence_of(&self, rec: &AnnotationRecord) -> Result<Option<Evidence>, ParseError> {
        let (Some(source), Some(cov), Some(pid)) = (
            rec.pick_first_attr(&self.keys.source_id_keys),
            rec.pick_first_attr(&self.keys.coverage_keys),
            rec.pick_first_attr(&self.keys.percent_id_keys),
        ) else {
            return Ok(None);
        };

        let number = |what: &str, v: &str| -> Result<f64, ParseError> {
            v.parse::<f64>().map_err(|_| ParseError::MalformedLine {
                line_no: rec.line_no,
                problem: format!("{what} '{v}' is not a number"),
                line: format!("{}:{}-{}", rec.seqname, rec.start, rec.end),
            })
        };

        Ok(Some(Evidence::new(
            target_name(&source),
            number("coverage", cov.as_str())?,
            number("percent identity", pid.as_str())?,
        )))
    }
}

/// GFF3 `Target` values look like "NM_0001 1 200 +"; only the name counts.
fn target_name(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const GFF: &str = "\
##gff-version 3
chr1\texonerate\texon\t101\t200\t.\t+\t.\tParent=aln1;Target=NM_1 1 100 +;coverage=95;percent_id=92.5
chr1\texonerate\texon\t401\t500\t.\t+\t.\tParent=aln1
chr7\texonerate\texon\t11\t300\t.\t-\t.\tParent=aln2;Target=NM_1 1 290 +;coverage=91;percent_id=99
chr1\texonerate\tmatch\t101\t500\t.\t+\t.\tID=aln1
";

    #[test]
    fn gff3_exons_become_candidates() {
        let cands = CandidateLoader::new()
            .load_from_reader(Cursor::new(GFF.as_bytes()))
            .unwrap();

        assert_eq!(cands.len(), 2);
        assert_eq!(cands[0].name, "aln1");
        assert_eq!(cands[0].exon_count(), 2);
        assert!(cands[0].is_spliced());

        let m = cands[0].metrics().unwrap();
        assert_eq!(m.source_id, "NM_1");
        assert_eq!(m.coverage, 95.0);
        assert_eq!(m.percent_identity, 92.5);
        assert!(cands[0].exons()[1].evidence.is_empty());

        assert_eq!(cands[1].id, 1);
        assert_eq!(cands[1].seq_region(), Some("chr7"));
        assert_eq!(cands[1].metrics().unwrap().coverage, 91.0);
    }

    #[test]
    fn gtf_gives_same_candidates() {
        let gtf = "\
chr1\texonerate\texon\t101\t200\t.\t+\t.\ttranscript_id \"aln1\"; target_id \"NM_1\"; coverage \"95\"; percent_id \"92.5\";
chr1\texonerate\texon\t401\t500\t.\t+\t.\ttranscript_id \"aln1\";
chr7\texonerate\texon\t11\t300\t.\t-\t.\ttranscript_id \"aln2\"; target_id \"NM_1\"; coverage \"91\"; percent_id \"99\";
";
        let loader = CandidateLoader::new();
        let from_gtf = loader.load_from_reader(Cursor::new(gtf.as_bytes())).unwrap();
        let from_gff = loader.load_from_reader(Cursor::new(GFF.as_bytes())).unwrap();
        assert_eq!(from_gtf, from_gff);
    }

    #[test]
    fn exons_are_sorted_after_loading() {
        let gff = "\
chr1\tsrc\texon\t401\t500\t.\t+\t.\tParent=a
chr1\tsrc\texon\t101\t200\t.\t+\t.\tParent=a;Target=X;cov=80;pid=90
";
        let cands = CandidateLoader::new()
            .load_from_reader(Cursor::new(gff.as_bytes()))
            .unwrap();
        assert_eq!(cands[0].exons()[0].start, 101);
        assert_eq!(cands[0].metrics().unwrap().source_id, "X");
    }

    #[test]
    fn custom_keys_and_feature_types() {
        let gff = "chr1\tsrc\tcDNA_match\t1\t50\t.\t+\t.\tName=m1;acc=BC123;qcov=70;ident=88\n";
        let cands = CandidateLoader::new()
            .candidate_id_keys(&["Name"])
            .source_id_keys(&["acc"])
            .coverage_keys(&["qcov"])
            .percent_id_keys(&["ident"])
            .exon_feature_types(&["cDNA_match"])
            .load_from_reader(Cursor::new(gff.as_bytes()))
            .unwrap();
        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].metrics().unwrap().source_id, "BC123");
    }

    #[test]
    fn bad_numbers_and_missing_ids_are_errors() {
        let bad_cov = "chr1\tsrc\texon\t1\t50\t.\t+\t.\tParent=a;Target=X;coverage=lots;pid=9\n";
        let err = CandidateLoader::new()
            .load_from_reader(Cursor::new(bad_cov.as_bytes()))
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedLine { line_no: 1, .. }));

        let no_id = "chr1\tsrc\texon\t1\t50\t.\t+\t.\tTarget=X;coverage=1;pid=9\n";
        assert!(CandidateLoader::new()
            .load_from_reader(Cursor::new(no_id.as_bytes()))
            .is_err());
    }

    #[test]
    fn loads_gzipped_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aln.gff3.gz");
        {
            let f = File::create(&path).unwrap();
            let mut gz = flate2::write::GzEncoder::new(f, flate2::Compression::default());
            gz.write_all(GFF.as_bytes()).unwrap();
            gz.finish().unwrap();
        }

        let cands = CandidateLoader::new().load_from_path(&path).unwrap();
        assert_eq!(cands.len(), 2);
    }

    #[test]
    fn missing_path_reports_context() {
        let err = CandidateLoader::new()
            .load_from_path("/nonexistent/aln.gff3")
            .unwrap_err();
        assert!(format!("{err:#}").contains("open alignment file"));
    }
}
