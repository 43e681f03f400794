//! transcript-parse: document backend for the transcript extractor.
//!
//! Turns PDF pages into positioned text tokens. The [`DocumentBackend`]
//! trait is the seam between documents and the extraction pipeline in
//! transcript-core; [`LopdfBackend`] implements it with lopdf and a small
//! content stream interpreter (text state, CTM, font encodings and
//! ToUnicode maps).

pub mod backend;
pub mod cmap;
pub mod content;
pub mod encoding;
pub mod error;
pub mod font_metrics;
mod interpreter;
pub mod lopdf_backend;
pub mod text_state;

pub use backend::DocumentBackend;
pub use error::BackendError;
pub use interpreter::MAX_FORM_DEPTH;
pub use lopdf_backend::{LopdfBackend, LopdfDocument};
pub use transcript_core;
