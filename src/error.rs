//! Error types for the pdf2text library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`Pdf2TextError`]: **Fatal**: the request cannot produce text at all
//!   (missing file, corrupt container, nothing usable after every tier).
//!   Returned as `Err(Pdf2TextError)` from the top-level `extract*` functions.
//!
//! * [`TierError`]: **Non-fatal**: one extraction tier could not parse the
//!   document. The pipeline records it and falls through to the next tier.
//!
//! * [`PageError`]: **Non-fatal**: a single OCR page failed. That page
//!   contributes an empty segment and the remaining pages still run. Stored
//!   inside [`crate::output::PageResult`].

use crate::output::Provenance;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2text library.
#[derive(Debug, Error)]
pub enum Pdf2TextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Extraction outcomes ───────────────────────────────────────────────
    /// No tier could parse the byte stream as a PDF container.
    #[error(
        "'{document}' could not be read as a PDF: {detail}\n\
The file is probably corrupt or not a PDF. Try re-exporting or re-downloading it."
    )]
    UnreadableDocument { document: String, detail: String },

    /// Every tier ran but the final text is too short to be useful.
    #[error(
        "Could not extract usable text from '{document}' ({chars} chars, need {min}).\n\
If this is a scan, try a clearer, higher-contrast copy."
    )]
    TextTooWeak {
        document: String,
        chars: usize,
        min: usize,
    },

    /// A required native engine (pdfium library or OCR binary) is missing.
    #[error(
        "Extraction engine unavailable: {0}\n\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing pdfium copy.\n\
  • Install tesseract (e.g. apt install tesseract-ocr) or pass --tesseract <PATH>.\n"
    )]
    EngineUnavailable(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2TextError {
    /// Stable, machine-readable identifier for the error kind.
    ///
    /// Calling layers key user-facing messages off this rather than the
    /// `Display` text, which may change between releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Pdf2TextError::FileNotFound { .. } => "file-not-found",
            Pdf2TextError::PermissionDenied { .. } => "permission-denied",
            Pdf2TextError::InvalidInput { .. } => "invalid-input",
            Pdf2TextError::DownloadFailed { .. } => "download-failed",
            Pdf2TextError::DownloadTimeout { .. } => "download-timeout",
            Pdf2TextError::UnreadableDocument { .. } => "unreadable-document",
            Pdf2TextError::TextTooWeak { .. } => "text-too-weak",
            Pdf2TextError::EngineUnavailable(_) => "engine-unavailable",
            Pdf2TextError::OutputWriteFailed { .. } => "output-write-failed",
            Pdf2TextError::InvalidConfig(_) => "invalid-config",
            Pdf2TextError::Internal(_) => "internal",
        }
    }
}

/// A non-fatal failure of one extraction tier.
///
/// The pipeline logs it with the tier identity and moves on to the next tier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TierError {
    /// The tier's library could not parse the document.
    #[error("{tier} tier could not parse the document: {detail}")]
    Parse { tier: Provenance, detail: String },

    /// The tier's native engine could not be loaded.
    #[error("{tier} tier engine unavailable: {detail}")]
    EngineUnavailable { tier: Provenance, detail: String },

    /// Rasterisation of a page failed; the OCR tier stops at that page.
    #[error("rasterisation failed on page {page}: {detail}")]
    Render { page: usize, detail: String },
}

impl TierError {
    /// `true` when the failure is about the environment, not the document.
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, TierError::EngineUnavailable { .. })
    }
}

/// A non-fatal error for a single OCR page.
///
/// Stored alongside [`crate::output::PageResult`] when a page fails.
/// Pages are 1-indexed in messages.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Grayscale/binarisation or image encoding failed.
    #[error("Page {page}: preprocessing failed: {detail}")]
    PreprocessFailed { page: usize, detail: String },

    /// The OCR engine ran but reported an error.
    #[error("Page {page}: recognition failed: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// The OCR engine could not be started at all.
    #[error("Page {page}: OCR engine unavailable: {detail}")]
    EngineUnavailable { page: usize, detail: String },

    /// The worker running this page panicked or was cancelled.
    #[error("Page {page}: internal error: {detail}")]
    Internal { page: usize, detail: String },
}
