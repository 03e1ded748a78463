//! OCR: recognise text on a binarised page.
//!
//! The pipeline only sees the [`OcrEngine`] trait; [`TesseractEngine`] is the
//! production implementation and drives the `tesseract` command-line binary.
//! Every failure is a [`PageError`] for that page alone: the caller records
//! it and moves on to the next page.

use super::encode::write_png;
use super::postprocess::clean_ocr_text;
use super::preprocess::{binarize_page, BinarizedImage};
use super::render::PageImage;
use crate::error::PageError;
use crate::output::PageResult;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, warn};

/// Recognises text from a binarised page image.
pub trait OcrEngine: Send + Sync {
    /// Short engine name for logs.
    fn name(&self) -> &str;

    /// Return the recognised text for `image`.
    fn recognize(&self, image: &BinarizedImage) -> Result<String, PageError>;
}

/// Tesseract OCR via its command-line binary.
///
/// The page is written to a temporary PNG, then
/// `tesseract <png> stdout -l <lang>` is run and its stdout captured. The
/// temporary file is removed when the call returns, on every path.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", "eng")
    }
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn run(&self, image_path: &Path, page: usize) -> Result<String, PageError> {
        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => Err(PageError::RecognitionFailed {
                page,
                detail: format!(
                    "{} exited with {}: {}",
                    self.binary.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PageError::EngineUnavailable {
                    page,
                    detail: format!(
                        "'{}' not found (install tesseract-ocr)",
                        self.binary.display()
                    ),
                })
            }
            Err(e) => Err(PageError::RecognitionFailed {
                page,
                detail: e.to_string(),
            }),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &BinarizedImage) -> Result<String, PageError> {
        let page = image.index + 1;
        let preprocess_err = |detail: String| PageError::PreprocessFailed { page, detail };

        let mut tmp = tempfile::Builder::new()
            .prefix("pdf2text-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| preprocess_err(format!("tempfile: {e}")))?;
        write_png(image, tmp.as_file_mut()).map_err(|e| preprocess_err(e.to_string()))?;

        self.run(tmp.path(), page)
    }
}

/// Preprocess and recognise one page, never failing.
///
/// The colour bitmap and the binarised copy are both owned by this call and
/// dropped before it returns, whatever the outcome.
pub fn recognize_page(engine: &dyn OcrEngine, page: PageImage) -> PageResult {
    let start = Instant::now();
    let page_index = page.index;

    let binarized = binarize_page(page);
    let threshold = binarized.threshold;
    let result = engine.recognize(&binarized);
    drop(binarized);

    let duration_ms = start.elapsed().as_millis() as u64;
    match result {
        Ok(raw) => {
            let text = clean_ocr_text(&raw);
            debug!(
                "Page {}: {} recognised {} chars in {}ms",
                page_index + 1,
                engine.name(),
                text.chars().count(),
                duration_ms
            );
            PageResult {
                page_index,
                text,
                threshold: Some(threshold),
                duration_ms,
                error: None,
            }
        }
        Err(e) => {
            warn!("{}", e);
            PageResult {
                page_index,
                text: String::new(),
                threshold: Some(threshold),
                duration_ms,
                error: Some(e),
            }
        }
    }
}
