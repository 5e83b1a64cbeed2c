pub mod builder;
pub mod io;

pub use builder::{CandidateLoader, EvidenceKeys};
pub use io::{AnnotationReader, AnnotationRecord, Dialect, ParseError};
