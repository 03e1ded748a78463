//! # pdf2text
//!
//! Extract usable plain text from PDF documents, scanned or not.
//!
//! ## Why this crate?
//!
//! Digitally produced PDFs carry their text; pulling it out is fast and
//! exact. Scanned PDFs carry only page images, and the text layer comes back
//! empty. This crate tries the cheap options first and only pays for OCR
//! when the text layer is missing, so callers get text from both kinds of
//! document through one call.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       resolve local file or download from URL
//!  ├─ 2. Native      lopdf text extraction          ── usable? → done
//!  ├─ 3. Structured  pdfium text layer              ── usable? → done
//!  ├─ 4. Render      first N pages at 150 DPI (pdfium, spawn_blocking)
//!  ├─ 5. Binarise    BT.601 grayscale + Otsu threshold per page
//!  ├─ 6. OCR         tesseract per page, failures stay on their page
//!  └─ 7. Output      concatenated text cut to char_limit, with provenance
//! ```
//!
//! "Usable" means at least 100 characters once surrounding whitespace is
//! trimmed; below that a tier's text "looks scanned" and the next tier runs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2text::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::builder()
//!         .pages_to_ocr(3)
//!         .char_limit(6000)
//!         .build()?;
//!     let output = extract("scan.pdf", &config).await?;
//!     println!("{}", output.text);
//!     eprintln!("{} chars via {} tier", output.char_count, output.provenance);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2text` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2text = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime Requirements
//!
//! | Tier | Needs |
//! |------|-------|
//! | native | nothing |
//! | structured | the pdfium shared library (`PDFIUM_LIB_PATH`, `./`, or system path) |
//! | ocr | pdfium plus the `tesseract` binary with English data |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, OCR_DPI, SCANNED_TEXT_THRESHOLD};
pub use error::{PageError, Pdf2TextError, TierError};
pub use extract::{extract, extract_from_bytes, extract_sync, extract_to_file, inspect};
pub use output::{
    DocumentMetadata, ExtractionOutput, ExtractionResult, ExtractionStats, PageResult, Provenance,
};
pub use pipeline::detect::ScanDetector;
pub use pipeline::fallback::ExtractionPipeline;
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
pub use pipeline::preprocess::BinarizedImage;
pub use pipeline::render::{PageImage, PageSink, RasterConverter};
pub use pipeline::TextExtractor;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use source::DocumentSource;
