use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::types::Strand;

/// File dialect detected from attribute syntax.
///
/// - GFF3 typically uses: key=value;key2=value2
/// - GTF typically uses: key "value"; key2 "value2";
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gff3,
    Gtf,
    Unknown,
}

/// A single parsed record line from GTF/GFF3.
///
/// Coordinates are kept as written: 1-based, inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub seqname: String,      // chromosome / contig
    pub source: String,       // column 2
    pub feature_type: String, // column 3
    pub start: u32,
    pub end: u32,
    pub score: Option<f64>, // '.' => None
    pub strand: Strand,     // + / - / . / ?
    pub phase: Option<u8>,  // '.' => None, else 0/1/2
    pub attrs: HashMap<String, String>,
    pub dialect: Dialect,
}

impl AnnotationRecord {
    /// Convenience: get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_exon_feature(&self, exon_types: &[String]) -> bool {
        exon_types.iter().any(|t| t == &self.feature_type)
    }

    pub fn pick_first_attr(&self, keys: &[String]) -> Option<String> {
        for k in keys {
            if let Some(v) = self.attr(k) {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v.to_string());
                }
            }
        }
        None
    }
}

/// Parsing errors for GTF/GFF3. Line numbers are 1-based.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error while reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed GTF/GFF line {line_no}: {problem}: {line}")]
    MalformedLine {
        line_no: usize,
        problem: String,
        line: String,
    },

    #[error("Bad coordinates in line {line_no}: {line}")]
    BadCoordinates { line_no: usize, line: String },
}

/// Streaming parser for GTF/GFF3 alignment files.
///
/// Most users should go through [`crate::annotation::CandidateLoader`],
/// which turns exon records into candidates.
///
/// # Example
/// ```
/// use std::io::Cursor;
/// use evidence_filter::annotation::AnnotationReader;
///
/// let gff = "##gff-version 3\nchr1\texonerate\texon\t101\t150\t.\t+\t.\tParent=aln1\n";
/// let recs: Vec<_> = AnnotationReader::new(Cursor::new(gff))
///     .records()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(recs.len(), 1);
/// assert_eq!((recs[0].start, recs[0].end), (101, 150));
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns an iterator over parsed records.
    ///
    /// - Skips blank lines
    /// - Skips comment lines starting with '#'
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, ParseError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(ParseError::Io {
                        path: "<reader>".to_string(),
                        source: e,
                    }))
                }
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse a single non-comment line into an `AnnotationRecord`.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord, ParseError> {
    let malformed = |problem: &str| ParseError::MalformedLine {
        line_no,
        problem: problem.to_string(),
        line: line.to_string(),
    };

    // seqname source feature start end score strand phase attributes
    let cols: Vec<&str> = line.split('\t').collect();
    if cols.len() != 9 {
        return Err(malformed(&format!("expected 9 tab-separated columns, found {}", cols.len())));
    }

    let bad_coords = || ParseError::BadCoordinates {
        line_no,
        line: line.to_string(),
    };
    let start: u32 = cols[3].parse().map_err(|_| bad_coords())?;
    let end: u32 = cols[4].parse().map_err(|_| bad_coords())?;
    if start == 0 || end < start {
        return Err(bad_coords());
    }

    let score = match cols[5] {
        "." => None,
        s => Some(s.parse::<f64>().map_err(|_| malformed("score is not a number"))?),
    };

    let strand = Strand::from_symbol(cols[6]).ok_or_else(|| malformed("unknown strand"))?;

    let phase = match cols[7] {
        "." => None,
        s => match s.parse::<u8>() {
            Ok(p) if p <= 2 => Some(p),
            _ => return Err(malformed("phase must be 0, 1, 2 or '.'")),
        },
    };

    let (dialect, attrs) = parse_attributes(cols[8]);

    Ok(AnnotationRecord {
        line_no,
        seqname: cols[0].to_string(),
        source: cols[1].to_string(),
        feature_type: cols[2].to_string(),
        start,
        end,
        score,
        strand,
        phase,
        attrs,
        dialect,
    })
}

/// Parse the attributes field for either GFF3 or GTF.
///
/// Heuristics:
/// - If it contains '=' => treat as GFF3
/// - Else if it contains quotes => treat as GTF
/// - Else Unknown, parsed as GTF-style `key value` pairs
pub fn parse_attributes(s: &str) -> (Dialect, HashMap<String, String>) {
    let s = s.trim();

    let dialect = if s.contains('=') {
        Dialect::Gff3
    } else if s.contains('"') {
        Dialect::Gtf
    } else {
        Dialect::Unknown
    };

    let mut map = HashMap::new();
    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = match dialect {
            Dialect::Gff3 => match part.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (part, ""),
            },
            Dialect::Gtf | Dialect::Unknown => match part.split_once(char::is_whitespace) {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (part, ""),
            },
        };
        if key.is_empty() {
            continue;
        }
        let value = unquote(value);
        if dialect != Dialect::Gff3 && value.is_empty() {
            continue;
        }
        map.insert(key.to_string(), value);
    }

    (dialect, map)
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}
