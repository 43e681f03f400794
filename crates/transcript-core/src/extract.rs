//! Section tracking and record extraction.
//!
//! The scan over a document is an explicit fold: the only state is the
//! currently active [`SectionCode`], and each classified line moves it
//! forward and optionally yields a [`Record`]. [`RecordExtractor`] drives
//! that fold across pages, clustering each page's tokens into lines first.

use unicode_normalization::UnicodeNormalization;

use crate::classify::{LineClassifier, LineKind, SectionCode};
use crate::error::{ExtractResult, ExtractWarning, ExtractWarningCode, TranscriptError};
use crate::lines::cluster_tokens_into_lines;
use crate::token::Token;

/// Options for record extraction, matching the default transcript layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Maximum vertical distance between tokens grouped into one line.
    pub line_tolerance: f64,
    /// Letters that may start a section header (each followed by a digit 1-9).
    pub section_letters: Vec<char>,
    /// Semester-stamp prefixes; a line starting with one of these plus two
    /// digits is skipped.
    pub noise_prefixes: Vec<String>,
    /// Section whose courses count toward total progress but not the average.
    pub excluded_section: SectionCode,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            section_letters: vec!['A', 'B'],
            noise_prefixes: vec!["WS".to_string(), "SS".to_string()],
            excluded_section: SectionCode::DEFAULT_EXCLUDED,
        }
    }
}

/// A parsed course entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Section the course was listed under.
    pub section: SectionCode,
    /// Course name.
    pub name: String,
    /// Grade as printed, comma decimal separator (e.g. `"1,3"`).
    pub grade: String,
    /// Credit points.
    pub credit_weight: f64,
}

impl Record {
    pub fn new(
        section: SectionCode,
        name: impl Into<String>,
        grade: impl Into<String>,
        credit_weight: f64,
    ) -> Self {
        Self {
            section,
            name: name.into(),
            grade: grade.into(),
            credit_weight,
        }
    }

    /// Numeric grade value, reading the comma as a decimal point.
    pub fn grade_value(&self) -> Option<f64> {
        crate::aggregate::parse_locale_decimal(&self.grade)
    }
}

/// The fold state of a document scan: the currently active section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionTracker {
    current: Option<SectionCode>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active section, if a header has been seen.
    pub fn current(&self) -> Option<SectionCode> {
        self.current
    }

    /// Pure fold step: `(state, line) -> (new_state, optional record)`.
    ///
    /// Headers replace the active section. Data lines become records only
    /// while a section is active. Noise and unrecognized lines leave the
    /// state untouched.
    pub fn advance(self, kind: LineKind) -> (SectionTracker, Option<Record>) {
        match kind {
            LineKind::SectionHeader(code) => (
                SectionTracker {
                    current: Some(code),
                },
                None,
            ),
            LineKind::DataLine {
                name,
                grade,
                credit_weight,
            } => {
                let record = self
                    .current
                    .map(|section| Record::new(section, name, grade, credit_weight));
                (self, record)
            }
            LineKind::Noise | LineKind::Unrecognized => (self, None),
        }
    }

    /// In-place variant of [`advance`](SectionTracker::advance).
    pub fn step(&mut self, kind: LineKind) -> Option<Record> {
        let (next, record) = self.advance(kind);
        *self = next;
        record
    }
}

/// Drives classification and section tracking over a whole document.
///
/// Feed pages in document order; section context carries over page breaks.
#[derive(Debug)]
pub struct RecordExtractor {
    classifier: LineClassifier,
    tolerance: f64,
    tracker: SectionTracker,
    records: Vec<Record>,
    warnings: Vec<ExtractWarning>,
}

impl RecordExtractor {
    /// # Errors
    ///
    /// Returns an error if the line patterns cannot be compiled.
    pub fn new(options: &ExtractOptions) -> Result<Self, TranscriptError> {
        Ok(Self {
            classifier: LineClassifier::new(options)?,
            tolerance: options.line_tolerance,
            tracker: SectionTracker::new(),
            records: Vec::new(),
            warnings: Vec::new(),
        })
    }

    /// Cluster one page's tokens into lines and scan them top to bottom.
    pub fn feed_page(&mut self, page: usize, tokens: &[Token]) {
        for line in cluster_tokens_into_lines(tokens, self.tolerance) {
            self.feed_line(page, &line.text());
        }
    }

    /// Scan a single line of text, normalized with [`normalize_line`].
    pub fn feed_line(&mut self, page: usize, text: &str) {
        let text = normalize_line(text);
        let text = text.as_str();
        let kind = self.classifier.classify(text);
        let orphan = matches!(kind, LineKind::DataLine { .. }) && self.tracker.current().is_none();

        if let Some(record) = self.tracker.step(kind) {
            self.records.push(record);
        } else if orphan {
            self.warnings.push(
                ExtractWarning::with_code(
                    ExtractWarningCode::OrphanRecord,
                    "course line before any section header was dropped",
                )
                .on_page(page)
                .for_line(text),
            );
        }
    }

    /// Active section at this point of the scan.
    pub fn current_section(&self) -> Option<SectionCode> {
        self.tracker.current()
    }

    /// Finish the scan, returning the records in document order.
    pub fn finish(self) -> ExtractResult<Vec<Record>> {
        ExtractResult::with_warnings(self.records, self.warnings)
    }
}

/// NFC-normalize a line's text, so decomposed umlauts yield the same course
/// names as composed ones.
pub fn normalize_line(text: &str) -> String {
    text.nfc().collect()
}

/// Extract records from a sequence of page token streams.
///
/// # Errors
///
/// Returns an error only if the options yield invalid line patterns.
pub fn extract_records<'a, I>(
    pages: I,
    options: &ExtractOptions,
) -> Result<ExtractResult<Vec<Record>>, TranscriptError>
where
    I: IntoIterator<Item = &'a [Token]>,
{
    let mut extractor = RecordExtractor::new(options)?;
    for (page, tokens) in pages.into_iter().enumerate() {
        extractor.feed_page(page, tokens);
    }
    Ok(extractor.finish())
}
