//! Top-level document type.

use transcript_core::{ExtractResult, Token, TranscriptError};
use transcript_parse::{DocumentBackend, LopdfBackend, LopdfDocument};

/// Iterator over the token streams of a [`Transcript`]'s pages.
///
/// Created by [`Transcript::pages`]. Produces exactly
/// [`Transcript::page_count`] items; a page that cannot be interpreted
/// yields its error.
pub struct PagesIter<'a> {
    transcript: &'a Transcript,
    current: usize,
    count: usize,
}

impl Iterator for PagesIter<'_> {
    type Item = Result<ExtractResult<Vec<Token>>, TranscriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }
        let index = self.current;
        self.current += 1;

        let page = self.transcript.page_tokens(index);
        #[cfg(feature = "tracing")]
        if let Err(err) = &page {
            tracing::debug!(page = index, error = %err, "page could not be interpreted");
        }
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

/// A transcript document opened for extraction.
///
/// Wraps a parsed PDF. The document is released when the value is dropped.
///
/// # Example
///
/// ```ignore
/// let transcript = Transcript::open_file("transcript.pdf")?;
/// for page in transcript.pages() {
///     for token in &page?.value {
///         println!("{:>8.2} {}", token.top, token.text);
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Transcript {
    doc: LopdfDocument,
}

impl Transcript {
    /// Open a transcript from a file path.
    ///
    /// Reads the file into memory, then calls [`Transcript::open`].
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::IoError`] if the file cannot be read, or any
    /// error [`Transcript::open`] returns.
    #[cfg(feature = "std")]
    pub fn open_file(path: impl AsRef<std::path::Path>) -> Result<Self, TranscriptError> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| TranscriptError::IoError(format!("{}: {e}", path.as_ref().display())))?;
        Self::open(&bytes)
    }

    /// Open a transcript from PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::PasswordRequired`] if the PDF is encrypted,
    /// or [`TranscriptError::ParseError`] if the bytes are not a valid PDF.
    pub fn open(bytes: &[u8]) -> Result<Self, TranscriptError> {
        let doc = LopdfBackend::open(bytes).map_err(TranscriptError::from)?;
        Ok(Self { doc })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        LopdfBackend::page_count(&self.doc)
    }

    /// Tokens of the page at 0-based `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range or the page's content
    /// cannot be interpreted.
    pub fn page_tokens(&self, index: usize) -> Result<ExtractResult<Vec<Token>>, TranscriptError> {
        LopdfBackend::page_tokens(&self.doc, index).map_err(TranscriptError::from)
    }

    /// Token streams for every page, in document order.
    pub fn pages(&self) -> PagesIter<'_> {
        PagesIter {
            transcript: self,
            current: 0,
            count: self.page_count(),
        }
    }

    /// Access the backend document.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
        use lopdf::{Object, Stream, dictionary};

        let mut doc = lopdf::Document::with_version("1.5");
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for content in pages {
            let content_id = doc.add_object(Stream::new(
                lopdf::Dictionary::new(),
                content.unwrap_or_default().as_bytes().to_vec(),
            ));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            };
            // `None` pages get no MediaBox, which makes them unreadable.
            if content.is_some() {
                page.set(
                    "MediaBox",
                    vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(612),
                        Object::Integer(792),
                    ],
                );
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn open_reads_page_count() {
        let bytes = pdf_with_pages(&[
            Some("BT /F1 12 Tf 72 720 Td (One) Tj ET"),
            Some("BT /F1 12 Tf 72 720 Td (Two) Tj ET"),
        ]);
        let transcript = Transcript::open(&bytes).unwrap();
        assert_eq!(transcript.page_count(), 2);
        assert_eq!(transcript.pages().len(), 2);
    }

    #[test]
    fn open_rejects_garbage() {
        let err = Transcript::open(b"not a pdf").unwrap_err();
        assert!(matches!(err, TranscriptError::ParseError(_)));
    }

    #[test]
    fn open_file_missing_is_io_error() {
        let err = Transcript::open_file("/nonexistent/path/transcript.pdf").unwrap_err();
        assert!(matches!(err, TranscriptError::IoError(_)));
    }

    #[test]
    fn page_tokens_have_top_from_page_edge() {
        let bytes = pdf_with_pages(&[Some("BT /F1 12 Tf 72 720 Td (Logik) Tj ET")]);
        let transcript = Transcript::open(&bytes).unwrap();
        let page = transcript.page_tokens(0).unwrap();
        assert_eq!(page.value, vec![Token::new("Logik", 72.0)]);
        assert!(transcript.page_tokens(1).is_err());
    }

    #[test]
    fn unreadable_page_yields_its_error() {
        let bytes = pdf_with_pages(&[
            Some("BT /F1 12 Tf 72 720 Td (First) Tj ET"),
            None,
            Some("BT /F1 12 Tf 72 720 Td (Third) Tj ET"),
        ]);
        let transcript = Transcript::open(&bytes).unwrap();
        let pages: Vec<_> = transcript.pages().collect();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].as_ref().unwrap().value.len(), 1);
        assert!(pages[1].is_err());
        assert_eq!(pages[2].as_ref().unwrap().value[0].text, "Third");
    }

    #[test]
    fn unreadable_page_fails_extraction() {
        let bytes = pdf_with_pages(&[
            Some("BT /F1 12 Tf 14 TL 72 720 Td (A1 Grundlagen) Tj T* (Math 1,3 6,0) Tj ET"),
            None,
        ]);
        let transcript = Transcript::open(&bytes).unwrap();
        assert!(
            transcript
                .extract(&transcript_core::ExtractOptions::default())
                .is_err()
        );
    }
}
