//! Tier 1: fast native text extraction with `lopdf`.
//!
//! Parses the object graph in pure Rust and decodes each page's text-show
//! operators. No layout analysis, no native library, so it is cheap enough
//! to try first on every document. Documents with exotic font encodings or
//! broken content streams come out empty or garbled here and are picked up
//! by the structured tier.

use super::TextExtractor;
use crate::error::TierError;
use crate::output::Provenance;
use crate::source::DocumentSource;
use lopdf::Document;
use tracing::debug;

/// Tier 1 extractor backed by `lopdf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTextExtractor;

impl TextExtractor for NativeTextExtractor {
    fn provenance(&self) -> Provenance {
        Provenance::Native
    }

    fn extract(&self, source: &mut DocumentSource) -> Result<String, TierError> {
        source.rewind();
        let document = Document::load_mem(source.read_all()).map_err(|e| TierError::Parse {
            tier: Provenance::Native,
            detail: e.to_string(),
        })?;

        let pages = document.get_pages();
        debug!("native: {} pages", pages.len());

        let mut text = String::new();
        for &page_num in pages.keys() {
            // A page whose content stream fails to decode contributes nothing;
            // the rest of the document is still worth having.
            match document.extract_text(&[page_num]) {
                Ok(extracted) if !extracted.is_empty() => {
                    text.push_str(&extracted);
                    text.push('\n');
                }
                Ok(_) => {}
                Err(e) => debug!("native: page {} skipped: {}", page_num, e),
            }
        }

        Ok(text)
    }
}
