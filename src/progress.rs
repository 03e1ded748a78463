//! Progress-callback trait for tier and page events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to observe
//! the fallback chain as it runs: which tier is being tried, whether its
//! text was usable, and how each OCR page went.
//!
//! # Example
//!
//! ```rust
//! use pdf2text::{ExtractionConfig, ExtractionProgressCallback, Provenance};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct TierCounter {
//!     tiers: AtomicUsize,
//! }
//!
//! impl ExtractionProgressCallback for TierCounter {
//!     fn on_tier_start(&self, tier: Provenance) {
//!         self.tiers.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("trying {tier}");
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(TierCounter { tiers: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::Provenance;
use std::sync::Arc;

/// Called by the extraction pipeline as it moves through tiers and pages.
///
/// All methods have default no-op implementations. With
/// `ocr_concurrency > 1` the page methods may be called concurrently from
/// different threads, so shared state needs `Mutex`/atomics.
pub trait ExtractionProgressCallback: Send + Sync {
    /// A tier is about to run.
    fn on_tier_start(&self, tier: Provenance) {
        let _ = tier;
    }

    /// A tier produced text; `usable` is the scan-detector verdict.
    fn on_tier_complete(&self, tier: Provenance, chars: usize, usable: bool) {
        let _ = (tier, chars, usable);
    }

    /// A tier could not parse the document.
    fn on_tier_failed(&self, tier: Provenance, error: &str) {
        let _ = (tier, error);
    }

    /// The rasteriser opened the document and OCR will cover `pages` pages,
    /// the smaller of `pages_to_ocr` and the page count. Not called when the
    /// document cannot be opened for rendering.
    fn on_ocr_start(&self, pages: usize) {
        let _ = pages;
    }

    /// A page was recognised (1-indexed).
    fn on_page_complete(&self, page_num: usize, chars: usize) {
        let _ = (page_num, chars);
    }

    /// A page failed and contributes an empty segment (1-indexed).
    fn on_page_error(&self, page_num: usize, error: &str) {
        let _ = (page_num, error);
    }

    /// The pipeline finished with text from `tier`.
    fn on_extraction_complete(&self, tier: Provenance, chars: usize) {
        let _ = (tier, chars);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
