//! Error and warning types for transcript extraction.
//!
//! Provides [`TranscriptError`] for fatal errors that stop processing,
//! [`ExtractWarning`] for non-fatal issues that allow best-effort continuation,
//! and [`ExtractResult`] for pairing a value with collected warnings.

use std::fmt;

/// Fatal error types for transcript processing.
///
/// Only a document that cannot be opened or scanned at all produces one of
/// these. Malformed lines inside a readable document never do.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptError {
    /// Error parsing the document structure or syntax.
    ParseError(String),
    /// I/O error reading the document.
    IoError(String),
    /// Error resolving font or encoding information.
    FontError(String),
    /// The document is encrypted and cannot be read without a password.
    PasswordRequired,
    /// Any other error not covered by specific variants.
    Other(String),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::ParseError(msg) => write!(f, "parse error: {msg}"),
            TranscriptError::IoError(msg) => write!(f, "I/O error: {msg}"),
            TranscriptError::FontError(msg) => write!(f, "font error: {msg}"),
            TranscriptError::PasswordRequired => {
                write!(f, "document is encrypted and requires a password")
            }
            TranscriptError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TranscriptError {}

impl From<std::io::Error> for TranscriptError {
    fn from(err: std::io::Error) -> Self {
        TranscriptError::IoError(err.to_string())
    }
}

impl From<regex::Error> for TranscriptError {
    fn from(err: regex::Error) -> Self {
        TranscriptError::Other(format!("invalid line pattern: {err}"))
    }
}

/// Machine-readable warning code for categorizing extraction issues.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", content = "detail")
)]
pub enum ExtractWarningCode {
    /// A record-shaped line appeared before any section header and was dropped.
    OrphanRecord,
    /// A referenced font was not found in page resources.
    MissingFont,
    /// Character decoding fell back to a default mapping.
    EncodingFallback,
    /// Any other warning not covered by specific variants.
    Other(String),
}

impl ExtractWarningCode {
    /// Returns the string tag for this warning code.
    pub fn as_str(&self) -> &str {
        match self {
            ExtractWarningCode::OrphanRecord => "ORPHAN_RECORD",
            ExtractWarningCode::MissingFont => "MISSING_FONT",
            ExtractWarningCode::EncodingFallback => "ENCODING_FALLBACK",
            ExtractWarningCode::Other(_) => "OTHER",
        }
    }
}

impl fmt::Display for ExtractWarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal warning encountered during extraction.
///
/// Carries a structured [`code`](ExtractWarning::code), a human-readable
/// description, and optional context: the 0-based page index and the line
/// text that triggered it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractWarning {
    /// Machine-readable warning code.
    pub code: ExtractWarningCode,
    /// Human-readable description of the warning.
    pub description: String,
    /// Page where the warning occurred (0-indexed), if applicable.
    pub page: Option<usize>,
    /// The line text involved, if any.
    pub line: Option<String>,
}

impl ExtractWarning {
    /// Create a warning with a specific code and description.
    pub fn with_code(code: ExtractWarningCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            page: None,
            line: None,
        }
    }

    /// Attach a page index (builder pattern).
    pub fn on_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach the offending line text (builder pattern).
    pub fn for_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.description)?;
        if let Some(page) = self.page {
            write!(f, " (page {})", page + 1)?;
        }
        if let Some(ref line) = self.line {
            write!(f, " [{line}]")?;
        }
        Ok(())
    }
}

/// Result wrapper that pairs a value with collected warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractResult<T> {
    /// The extracted value.
    pub value: T,
    /// Warnings collected during extraction.
    pub warnings: Vec<ExtractWarning>,
}

impl<T> ExtractResult<T> {
    /// Create a result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<ExtractWarning>) -> Self {
        Self { value, warnings }
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Number of warnings carrying the given code.
    pub fn count(&self, code: &ExtractWarningCode) -> usize {
        self.warnings.iter().filter(|w| &w.code == code).count()
    }

    /// Transform the value while preserving warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractResult<U> {
        ExtractResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
