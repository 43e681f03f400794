//! transcript-core: Backend-independent data types and algorithms.
//!
//! This crate provides the foundational types (Token, Line, Record, Totals)
//! and algorithms (line clustering, line classification, section tracking,
//! grade aggregation and prognosis) used by the transcript extractor.
//! It knows nothing about PDF files: the parse crate turns documents into
//! page token streams and everything downstream of that lives here.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod extract;
pub mod lines;
pub mod prognosis;
pub mod token;

pub use aggregate::{GradeBucket, GradeDistribution, Totals, parse_locale_decimal};
pub use classify::{LineClassifier, LineKind, SectionCode};
pub use error::{ExtractResult, ExtractWarning, ExtractWarningCode, TranscriptError};
pub use extract::{
    ExtractOptions, Record, RecordExtractor, SectionTracker, extract_records, normalize_line,
};
pub use lines::cluster_tokens_into_lines;
pub use prognosis::{Prognosis, ProgramOptions, Projection, project};
pub use token::{Line, Token};
