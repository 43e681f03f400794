//! transcript: Extract course records and grade prognoses from transcript PDFs.
//!
//! This is the public API facade crate. It re-exports types from
//! transcript-core and uses transcript-parse to turn documents into page
//! token streams.
//!
//! # Architecture
//!
//! - **transcript-core**: Backend-independent data types and algorithms
//! - **transcript-parse**: PDF reading and content stream interpretation
//! - **transcript** (this crate): Public API that ties everything together
//!
//! # Example
//!
//! ```ignore
//! let parsed = transcript::parse("transcript.pdf")?;
//! println!("{:.1} ECTS, average {:.3}", parsed.total_credit_weight(), parsed.average_grade());
//! for row in transcript::project(
//!     parsed.total_credit_weight(),
//!     parsed.average_grade(),
//!     parsed.calc_credit_weight(),
//! ) {
//!     println!("{:.1}: {:.2}", row.target_grade, row.required_average);
//! }
//! ```

mod parsed;
mod transcript;

pub use parsed::{ParsedTranscript, extract_pages, parse, parse_pages, parse_with_options, project};
pub use transcript::{PagesIter, Transcript};

pub use transcript_core::{
    ExtractOptions, ExtractResult, ExtractWarning, ExtractWarningCode, GradeBucket,
    GradeDistribution, Line, LineClassifier, LineKind, Prognosis, ProgramOptions, Projection,
    Record, RecordExtractor, SectionCode, SectionTracker, Token, Totals, TranscriptError,
    cluster_tokens_into_lines, normalize_line, parse_locale_decimal,
};

pub use transcript_core;
pub use transcript_parse;
