//! Output types returned by the extraction pipeline.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tier produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Tier 1: fast parse of the encoded text objects.
    Native,
    /// Tier 2: pdfium's layout-aware text layer.
    Structured,
    /// Tier 3: rasterise + binarise + OCR.
    Ocr,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Native => "native",
            Provenance::Structured => "structured",
            Provenance::Ocr => "ocr",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text produced by a single tier, before truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub provenance: Provenance,
    /// Number of Unicode scalar values in `text`.
    pub char_count: usize,
}

impl ExtractionResult {
    pub fn new(text: String, provenance: Provenance) -> Self {
        let char_count = text.chars().count();
        Self {
            text,
            provenance,
            char_count,
        }
    }

    /// The result a failed tier stands in with.
    pub fn empty(provenance: Provenance) -> Self {
        Self::new(String::new(), provenance)
    }
}

/// Result of OCR on a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 0-based page index within the document.
    pub page_index: usize,
    /// Cleaned OCR text; empty when `error` is set.
    pub text: String,
    /// Otsu threshold chosen for this page, if preprocessing ran.
    pub threshold: Option<u8>,
    /// Wall-clock time for preprocess + recognise.
    pub duration_ms: u64,
    /// Set when the page failed; the page still contributes an empty segment.
    pub error: Option<PageError>,
}

impl PageResult {
    /// 1-based page number for display.
    pub fn page_num(&self) -> usize {
        self.page_index + 1
    }
}

/// Timing and counters for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Tiers in the order they were attempted.
    pub tiers_attempted: Vec<Provenance>,
    /// Tiers that returned a parse or engine error.
    pub tiers_failed: Vec<Provenance>,
    /// Pages handed to the OCR engine.
    pub ocr_pages: usize,
    /// OCR pages that produced an error.
    pub ocr_failed_pages: usize,
    /// Characters before the `char_limit` cut.
    pub untruncated_chars: usize,
    pub total_duration_ms: u64,
    pub ocr_duration_ms: u64,
}

/// Final output of a successful extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Caller-supplied document name (file stem for path/URL inputs).
    pub document_name: String,
    /// Extracted text, at most `char_limit` characters.
    pub text: String,
    pub provenance: Provenance,
    /// Number of characters in `text`.
    pub char_count: usize,
    /// `true` when the `char_limit` cut removed text.
    pub truncated: bool,
    /// Per-page OCR results; empty unless `provenance == Ocr`.
    pub pages: Vec<PageResult>,
    pub stats: ExtractionStats,
}

/// PDF document metadata, as reported by pdfium.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
