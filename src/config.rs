//! Configuration types for PDF text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Every deployment-specific constant
//! (OCR page window, output cap, scan threshold) lives here rather than in
//! the pipeline, so two deployments differ only in config.

use crate::error::Pdf2TextError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Stripped-text length below which a tier's output "looks scanned".
///
/// A coarse heuristic: short but genuinely text-based documents fall under it
/// and trigger OCR. Override with [`ExtractionConfigBuilder::scan_threshold`].
pub const SCANNED_TEXT_THRESHOLD: usize = 100;

/// Resolution used when rasterising pages for OCR.
pub const OCR_DPI: u32 = 150;

/// Configuration for a PDF text extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2text::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .pages_to_ocr(3)
///     .char_limit(6000)
///     .build()
///     .unwrap();
/// assert_eq!(config.char_limit, 6000);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Maximum number of pages rasterised and OCR'd. Default: 5.
    ///
    /// OCR costs seconds per page; this is the only bound on OCR latency.
    pub pages_to_ocr: usize,

    /// Maximum number of characters returned. Default: 20000.
    ///
    /// The cut is a literal prefix (may split a word).
    pub char_limit: usize,

    /// Scanned-document threshold in stripped characters. Default: 100.
    pub scan_threshold: usize,

    /// Minimum characters the final text must have. Default: 100.
    ///
    /// Below this the request fails with [`Pdf2TextError::TextTooWeak`].
    /// Must not exceed `scan_threshold` or `char_limit`, so text a tier
    /// accepted as usable always passes this check.
    pub min_text_chars: usize,

    /// Rendering DPI for OCR rasterisation. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Tesseract language code. Default: "eng".
    pub ocr_language: String,

    /// Maximum concurrent OCR invocations. Default: 1 (sequential).
    ///
    /// Pages are independent once rasterised, so raising this cuts wall-clock
    /// time on multi-core hosts. Peak image memory grows with it.
    pub ocr_concurrency: usize,

    /// Tesseract executable name or path. Default: "tesseract".
    pub tesseract_path: PathBuf,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional observer for tier and page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pages_to_ocr: 5,
            char_limit: 20_000,
            scan_threshold: SCANNED_TEXT_THRESHOLD,
            min_text_chars: 100,
            dpi: OCR_DPI,
            ocr_language: "eng".to_string(),
            ocr_concurrency: 1,
            tesseract_path: PathBuf::from("tesseract"),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("pages_to_ocr", &self.pages_to_ocr)
            .field("char_limit", &self.char_limit)
            .field("scan_threshold", &self.scan_threshold)
            .field("min_text_chars", &self.min_text_chars)
            .field("dpi", &self.dpi)
            .field("ocr_language", &self.ocr_language)
            .field("ocr_concurrency", &self.ocr_concurrency)
            .field("tesseract_path", &self.tesseract_path)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn pages_to_ocr(mut self, n: usize) -> Self {
        self.config.pages_to_ocr = n;
        self
    }

    pub fn char_limit(mut self, n: usize) -> Self {
        self.config.char_limit = n;
        self
    }

    pub fn scan_threshold(mut self, n: usize) -> Self {
        self.config.scan_threshold = n;
        self
    }

    pub fn min_text_chars(mut self, n: usize) -> Self {
        self.config.min_text_chars = n;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn ocr_concurrency(mut self, n: usize) -> Self {
        self.config.ocr_concurrency = n.max(1);
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2TextError> {
        let c = &self.config;
        if c.pages_to_ocr == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "pages_to_ocr must be ≥ 1".into(),
            ));
        }
        if c.char_limit == 0 {
            return Err(Pdf2TextError::InvalidConfig("char_limit must be ≥ 1".into()));
        }
        if c.scan_threshold == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "scan_threshold must be ≥ 1".into(),
            ));
        }
        if c.min_text_chars > c.scan_threshold {
            return Err(Pdf2TextError::InvalidConfig(format!(
                "min_text_chars ({}) exceeds scan_threshold ({}); a usable tier could still be rejected as too weak",
                c.min_text_chars, c.scan_threshold
            )));
        }
        if c.min_text_chars > c.char_limit {
            return Err(Pdf2TextError::InvalidConfig(format!(
                "min_text_chars ({}) exceeds char_limit ({})",
                c.min_text_chars, c.char_limit
            )));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(Pdf2TextError::InvalidConfig(
                "ocr_language must not be empty".into(),
            ));
        }
        if c.ocr_concurrency == 0 {
            return Err(Pdf2TextError::InvalidConfig(
                "ocr_concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
