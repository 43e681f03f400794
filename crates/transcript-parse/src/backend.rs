//! Document backend trait.
//!
//! Defines the [`DocumentBackend`] trait that abstracts turning a binary
//! document into per-page token streams. The extraction pipeline only ever
//! sees [`Token`]s, so any layout engine that can position text on a page
//! can stand in for the lopdf implementation.

use transcript_core::{ExtractResult, Token, TranscriptError};

/// Trait abstracting the document-layout collaborator.
///
/// # Associated Types
///
/// - `Document`: the parsed document, released when dropped.
/// - `Error`: backend-specific error type, convertible to [`TranscriptError`].
///
/// # Usage
///
/// ```ignore
/// let doc = MyBackend::open(bytes)?;
/// for index in 0..MyBackend::page_count(&doc) {
///     let tokens = MyBackend::page_tokens(&doc, index)?;
/// }
/// ```
pub trait DocumentBackend {
    /// The parsed document type.
    type Document;

    /// Backend-specific error type, convertible to [`TranscriptError`].
    type Error: std::error::Error + Into<TranscriptError>;

    /// Parse document bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a readable document.
    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error>;

    /// Number of pages in the document.
    fn page_count(doc: &Self::Document) -> usize;

    /// Text tokens of the page at 0-based `index`, in content-stream order,
    /// with `top` measured from the page's top edge.
    ///
    /// Recoverable problems (an unknown font, a fallback encoding) are
    /// returned as warnings next to the tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the page's content
    /// cannot be read.
    fn page_tokens(doc: &Self::Document, index: usize)
    -> Result<ExtractResult<Vec<Token>>, Self::Error>;
}
