//! lopdf-based document backend.
//!
//! Implements [`DocumentBackend`] using the [lopdf](https://crates.io/crates/lopdf)
//! crate. Pages are walked in page-tree order; each page's content streams
//! are concatenated and handed to the interpreter.

use transcript_core::{ExtractResult, Token, TranscriptError};

use crate::backend::DocumentBackend;
use crate::error::BackendError;
use crate::interpreter::{PageInterpreter, decode_stream, object_to_f64, resolve};
use crate::text_state::{GraphicsState, TextState};

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Page object ids in page order.
    page_ids: Vec<lopdf::ObjectId>,
}

impl LopdfDocument {
    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

/// The lopdf-based backend.
///
/// # Example
///
/// ```ignore
/// use transcript_parse::{DocumentBackend, LopdfBackend};
///
/// let doc = LopdfBackend::open(pdf_bytes)?;
/// let first = LopdfBackend::page_tokens(&doc, 0)?;
/// ```
pub struct LopdfBackend;

/// Look up a key on the page, walking up `/Parent` links if absent.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: lopdf::ObjectId,
    key: &[u8],
) -> Result<Option<&'a lopdf::Object>, BackendError> {
    let mut current = page_id;
    loop {
        let dict = doc
            .get_object(current)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(resolve(doc, value)));
        }

        match dict.get(b"Parent") {
            Ok(parent) => {
                current = parent
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

/// Upper edge of the page's MediaBox.
fn page_top(doc: &lopdf::Document, page_id: lopdf::ObjectId) -> Result<f64, BackendError> {
    let media_box = resolve_inherited(doc, page_id, b"MediaBox")?
        .ok_or_else(|| BackendError::Parse("MediaBox not found on page or ancestors".into()))?
        .as_array()
        .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
    let values: Option<Vec<f64>> = media_box.iter().map(object_to_f64).collect();
    match values.as_deref() {
        Some([_, y0, _, y1]) => Ok(y0.max(*y1)),
        _ => Err(BackendError::Parse(format!(
            "expected 4 numbers in MediaBox, got {media_box:?}"
        ))),
    }
}

/// Content bytes of a page; `/Contents` may be one stream or an array.
fn page_content(
    doc: &lopdf::Document,
    page_dict: &lopdf::Dictionary,
) -> Result<Vec<u8>, BackendError> {
    let Ok(contents) = page_dict.get(b"Contents") else {
        return Ok(Vec::new());
    };

    match resolve(doc, contents) {
        lopdf::Object::Stream(stream) => decode_stream(stream),
        lopdf::Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                let stream = resolve(doc, part).as_stream().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a stream: {e}"))
                })?;
                if !content.is_empty() {
                    content.push(b'\n');
                }
                content.extend_from_slice(&decode_stream(stream)?);
            }
            Ok(content)
        }
        other => Err(BackendError::Parse(format!(
            "/Contents is not a stream or array: {other:?}"
        ))),
    }
}

/// Resources of a page, inherited if needed; an empty dictionary when absent.
fn page_resources(
    doc: &lopdf::Document,
    page_id: lopdf::ObjectId,
) -> Result<&lopdf::Dictionary, BackendError> {
    match resolve_inherited(doc, page_id, b"Resources")? {
        Some(obj) => obj
            .as_dict()
            .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
        None => {
            static EMPTY_DICT: std::sync::LazyLock<lopdf::Dictionary> =
                std::sync::LazyLock::new(lopdf::Dictionary::new);
            Ok(&EMPTY_DICT)
        }
    }
}

impl DocumentBackend for LopdfBackend {
    type Document = LopdfDocument;
    type Error = BackendError;

    fn open(bytes: &[u8]) -> Result<Self::Document, Self::Error> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;

        if inner.is_encrypted() {
            return Err(BackendError::Core(TranscriptError::PasswordRequired));
        }

        let page_ids: Vec<lopdf::ObjectId> = inner.get_pages().values().copied().collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(pages = page_ids.len(), "opened PDF document");

        Ok(LopdfDocument { inner, page_ids })
    }

    fn page_count(doc: &Self::Document) -> usize {
        doc.page_ids.len()
    }

    fn page_tokens(
        doc: &Self::Document,
        index: usize,
    ) -> Result<ExtractResult<Vec<Token>>, Self::Error> {
        let page_id = *doc.page_ids.get(index).ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                doc.page_ids.len()
            ))
        })?;
        let inner = &doc.inner;

        let page_dict = inner
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;
        let top = page_top(inner, page_id)?;
        let content = page_content(inner, page_dict)?;
        let resources = page_resources(inner, page_id)?;

        let mut interpreter = PageInterpreter::new(inner, index, top);
        interpreter.run(
            &content,
            resources,
            0,
            &mut GraphicsState::new(),
            &mut TextState::new(),
        )?;
        let result = interpreter.finish();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            page = index,
            tokens = result.value.len(),
            warnings = result.warnings.len(),
            "interpreted page"
        );

        Ok(result)
    }
}

/// Build a PDF from per-page content streams, with Helvetica as `/F1`.
#[cfg(test)]
fn create_test_pdf(pages: &[&[u8]]) -> Vec<u8> {
    use lopdf::{Document, Object, ObjectId, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(lopdf::Dictionary::new(), content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Save a hand-assembled document with a single page.
#[cfg(test)]
fn save_single_page(
    mut doc: lopdf::Document,
    pages_id: lopdf::ObjectId,
    page: lopdf::Dictionary,
) -> Vec<u8> {
    use lopdf::{Object, dictionary};

    let page_id = doc.add_object(page);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}
