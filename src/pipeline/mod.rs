//! Pipeline stages for PDF text extraction.
//!
//! Each submodule implements exactly one step. The orchestrator in
//! [`fallback`] only talks to the steps through the [`TextExtractor`],
//! [`render::RasterConverter`] and [`ocr::OcrEngine`] traits, so any of them
//! can be swapped (or spied on in tests) without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ native ──▶ structured ──▶ render ──▶ preprocess ──▶ encode ──▶ ocr ──▶ postprocess
//! (path/URL) (lopdf)    (pdfium text)  (pdfium)   (Otsu)         (PNG)      (tesseract) (cleanup)
//!              │            │
//!              └── detect ──┘  usable text short-circuits the chain
//! ```
//!
//! 1. [`input`]     : turn the user-supplied path or URL into a [`DocumentSource`]
//! 2. [`native`]    : tier 1, pure-Rust text extraction
//! 3. [`structured`]: tier 2, pdfium's text layer
//! 4. [`detect`]    : "looks scanned" verdict on a tier's text
//! 5. [`render`]    : rasterise a bounded page window; blocking, runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 6. [`preprocess`]: grayscale and Otsu binarisation per page
//! 7. [`encode`]    : PNG for the OCR engine
//! 8. [`ocr`]       : recognise one page; failures stay on that page
//! 9. [`postprocess`]: OCR text cleanup and the final character cap

pub mod detect;
pub mod encode;
pub mod fallback;
pub mod input;
pub mod native;
pub mod ocr;
pub mod postprocess;
pub mod preprocess;
pub mod render;
pub mod structured;

use crate::error::TierError;
use crate::output::Provenance;
use crate::source::DocumentSource;

/// One text-layer extraction tier.
///
/// Implementations rewind `source` themselves and return the concatenated
/// per-page text, each page followed by `\n`. A document the tier cannot
/// parse is an `Err`, never a panic; the pipeline falls through to the next
/// tier.
pub trait TextExtractor: Send + Sync {
    /// Which tier this is.
    fn provenance(&self) -> Provenance;

    /// Extract all text from the document.
    fn extract(&self, source: &mut DocumentSource) -> Result<String, TierError>;
}
