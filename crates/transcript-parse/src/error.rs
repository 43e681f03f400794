//! Error types for the document backend.
//!
//! Uses [`thiserror`] for the backend-facing [`BackendError`], which converts
//! into the core [`TranscriptError`] at the facade boundary.

use thiserror::Error;
use transcript_core::TranscriptError;

/// Error type for document backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading document data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Malformed content stream.
    #[error("content stream error: {0}")]
    Content(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] TranscriptError),
}

impl From<BackendError> for TranscriptError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) | BackendError::Content(msg) => {
                TranscriptError::ParseError(msg)
            }
            BackendError::Io(e) => TranscriptError::IoError(e.to_string()),
            BackendError::Font(msg) => TranscriptError::FontError(msg),
            BackendError::Core(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_message() {
        let err = BackendError::Parse("invalid xref table".to_string());
        assert_eq!(err.to_string(), "PDF parse error: invalid xref table");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: BackendError = io_err.into();
        assert!(matches!(err, BackendError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn content_error_becomes_parse_error() {
        let err: TranscriptError = BackendError::Content("unterminated array".to_string()).into();
        assert_eq!(
            err,
            TranscriptError::ParseError("unterminated array".to_string())
        );
    }

    #[test]
    fn font_error_conversion() {
        let err: TranscriptError = BackendError::Font("bad cmap".to_string()).into();
        assert_eq!(err, TranscriptError::FontError("bad cmap".to_string()));
    }

    #[test]
    fn io_error_conversion_keeps_message() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TranscriptError = BackendError::Io(io_err).into();
        assert!(matches!(err, TranscriptError::IoError(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn core_error_passes_through() {
        let err: TranscriptError = BackendError::Core(TranscriptError::PasswordRequired).into();
        assert_eq!(err, TranscriptError::PasswordRequired);
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(BackendError::Font("x".to_string()));
        assert!(err.to_string().contains("x"));
    }
}
