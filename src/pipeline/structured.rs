//! Tier 2: layout-aware extraction from pdfium's text layer.
//!
//! pdfium orders characters by their position on the page and handles the
//! font encodings (CID fonts, ToUnicode maps) that trip up the native tier.
//! It is slower and needs the native library, so it only runs when tier 1
//! looks scanned.

use super::TextExtractor;
use crate::engine::bind_pdfium;
use crate::error::TierError;
use crate::output::Provenance;
use crate::source::DocumentSource;
use tracing::debug;

/// Tier 2 extractor backed by pdfium.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredTextExtractor;

impl TextExtractor for StructuredTextExtractor {
    fn provenance(&self) -> Provenance {
        Provenance::Structured
    }

    fn extract(&self, source: &mut DocumentSource) -> Result<String, TierError> {
        let pdfium = bind_pdfium().map_err(|detail| TierError::EngineUnavailable {
            tier: Provenance::Structured,
            detail,
        })?;

        source.rewind();
        let document = pdfium
            .load_pdf_from_byte_slice(source.read_all(), None)
            .map_err(|e| TierError::Parse {
                tier: Provenance::Structured,
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        debug!("structured: {} pages", pages.len());

        let mut text = String::new();
        for (idx, page) in pages.iter().enumerate() {
            match page.text() {
                Ok(page_text) => {
                    let extracted = page_text.all();
                    if !extracted.is_empty() {
                        text.push_str(&extracted);
                        text.push('\n');
                    }
                }
                Err(e) => debug!("structured: page {} skipped: {:?}", idx + 1, e),
            }
        }

        Ok(text)
    }
}
