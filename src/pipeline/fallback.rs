//! The three-tier fallback chain.
//!
//! ```text
//! native ──usable?──▶ done
//!   │ no / failed
//! structured ──usable?──▶ done
//!   │ no / failed
//! OCR over pages 0..pages_to_ocr ──▶ done
//! ```
//!
//! Each tier returns `Result<String, TierError>`; the scan detector is only
//! consulted on `Ok` text. A failed tier stands in with an empty result and
//! the next tier runs. The chain stops at the first usable tier, then the
//! text is cut to `char_limit` characters.
//!
//! The OCR tier is a small producer/consumer: a blocking task rasterises
//! pages into a bounded channel while up to `ocr_concurrency` pages are
//! binarised and recognised on the blocking pool. Images are moved into
//! each page job and dropped with it.

use super::detect::ScanDetector;
use super::native::NativeTextExtractor;
use super::ocr::{recognize_page, OcrEngine, TesseractEngine};
use super::postprocess::truncate_chars;
use super::render::{PageImage, PageSink, PdfiumRasterizer, RasterConverter};
use super::structured::StructuredTextExtractor;
use super::TextExtractor;
use crate::config::ExtractionConfig;
use crate::error::{PageError, Pdf2TextError, TierError};
use crate::output::{ExtractionOutput, ExtractionResult, ExtractionStats, PageResult, Provenance};
use crate::progress::{ExtractionProgressCallback, ProgressCallback};
use crate::source::DocumentSource;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

/// Orchestrates the extraction tiers for one configuration.
///
/// Holds no per-document state: every [`run`](Self::run) owns its
/// [`DocumentSource`], so one pipeline can serve concurrent requests.
pub struct ExtractionPipeline {
    native: Arc<dyn TextExtractor>,
    structured: Arc<dyn TextExtractor>,
    rasterizer: Arc<dyn RasterConverter>,
    ocr: Arc<dyn OcrEngine>,
    detector: ScanDetector,
    config: ExtractionConfig,
}

impl ExtractionPipeline {
    /// Pipeline with the production components: lopdf, pdfium, tesseract.
    pub fn new(config: ExtractionConfig) -> Self {
        let ocr = TesseractEngine::new(config.tesseract_path.clone(), config.ocr_language.clone());
        Self::with_components(
            config,
            Arc::new(NativeTextExtractor),
            Arc::new(StructuredTextExtractor),
            Arc::new(PdfiumRasterizer),
            Arc::new(ocr),
        )
    }

    /// Pipeline with caller-supplied components.
    pub fn with_components(
        config: ExtractionConfig,
        native: Arc<dyn TextExtractor>,
        structured: Arc<dyn TextExtractor>,
        rasterizer: Arc<dyn RasterConverter>,
        ocr: Arc<dyn OcrEngine>,
    ) -> Self {
        Self {
            native,
            structured,
            rasterizer,
            ocr,
            detector: ScanDetector::new(config.scan_threshold),
            config,
        }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run the fallback chain over `source`.
    ///
    /// # Errors
    /// - [`Pdf2TextError::UnreadableDocument`] when no tier could parse the bytes
    /// - [`Pdf2TextError::EngineUnavailable`] when the failure was a missing
    ///   pdfium library or OCR binary rather than the document
    /// - [`Pdf2TextError::TextTooWeak`] when the final text is shorter than
    ///   `min_text_chars`
    pub async fn run(&self, source: DocumentSource) -> Result<ExtractionOutput, Pdf2TextError> {
        let total_start = Instant::now();
        let document = source.name().to_string();
        info!("Extracting text from '{}' ({} bytes)", document, source.len());

        let mut source = source;
        let mut stats = ExtractionStats::default();
        let mut failures: Vec<TierError> = Vec::new();
        let mut latest: Option<ExtractionResult> = None;

        // ── Tiers 1 and 2: text layer ────────────────────────────────────
        for extractor in [&self.native, &self.structured] {
            let tier = extractor.provenance();
            stats.tiers_attempted.push(tier);
            self.notify(|cb| cb.on_tier_start(tier));

            let (returned, outcome) = run_tier(Arc::clone(extractor), source).await?;
            source = returned;

            match outcome {
                Ok(text) => {
                    let result = ExtractionResult::new(text, tier);
                    let usable = self.detector.is_usable(&result.text);
                    info!(
                        "{} tier: {} chars, {}",
                        tier,
                        result.char_count,
                        if usable { "usable" } else { "looks scanned" }
                    );
                    self.notify(|cb| cb.on_tier_complete(tier, result.char_count, usable));
                    if usable {
                        return self.finish(document, result, Vec::new(), stats, total_start);
                    }
                    latest = Some(result);
                }
                Err(e) => {
                    warn!("{}", e);
                    stats.tiers_failed.push(tier);
                    self.notify(|cb| cb.on_tier_failed(tier, &e.to_string()));
                    failures.push(e);
                    latest = Some(ExtractionResult::empty(tier));
                }
            }
        }

        // ── Tier 3: OCR ──────────────────────────────────────────────────
        stats.tiers_attempted.push(Provenance::Ocr);
        self.notify(|cb| cb.on_tier_start(Provenance::Ocr));

        let ocr_start = Instant::now();
        let (pages, render_outcome) = self.run_ocr(source).await?;
        stats.ocr_duration_ms = ocr_start.elapsed().as_millis() as u64;
        stats.ocr_pages = pages.len();
        stats.ocr_failed_pages = pages.iter().filter(|p| p.error.is_some()).count();

        match render_outcome {
            Err(e @ TierError::Render { .. }) => {
                warn!("OCR stopped early, keeping {} pages: {}", pages.len(), e);
            }
            Err(e) => {
                warn!("{}", e);
                stats.tiers_failed.push(Provenance::Ocr);
                self.notify(|cb| cb.on_tier_failed(Provenance::Ocr, &e.to_string()));
                // Without a rasteriser no page was ever looked at, so the
                // scan cannot be called weak.
                if e.is_engine_unavailable() {
                    return Err(Pdf2TextError::EngineUnavailable(e.to_string()));
                }
                failures.push(e);
                if failures.len() == stats.tiers_attempted.len() {
                    return Err(classify_failures(&document, &failures));
                }
                // An earlier tier parsed the document; its text stands.
                let result = latest.unwrap_or_else(|| ExtractionResult::empty(Provenance::Ocr));
                return self.finish(document, result, Vec::new(), stats, total_start);
            }
            Ok(rendered) => debug!("Rasteriser delivered {} pages", rendered),
        }

        if !pages.is_empty()
            && pages
                .iter()
                .all(|p| matches!(p.error, Some(PageError::EngineUnavailable { .. })))
        {
            let detail = pages
                .iter()
                .find_map(|p| p.error.as_ref())
                .map(|e| e.to_string())
                .unwrap_or_default();
            return Err(Pdf2TextError::EngineUnavailable(detail));
        }

        let mut text = String::new();
        for page in &pages {
            text.push_str(&page.text);
            text.push('\n');
        }
        let result = ExtractionResult::new(text, Provenance::Ocr);
        info!(
            "ocr tier: {} chars from {} pages ({} failed)",
            result.char_count, stats.ocr_pages, stats.ocr_failed_pages
        );
        self.notify(|cb| {
            cb.on_tier_complete(
                Provenance::Ocr,
                result.char_count,
                self.detector.is_usable(&result.text),
            )
        });

        self.finish(document, result, pages, stats, total_start)
    }

    /// Rasterise and recognise up to `pages_to_ocr` pages.
    ///
    /// Returns the page results in page order plus the converter's outcome.
    /// Pages delivered before a render failure are kept.
    async fn run_ocr(
        &self,
        source: DocumentSource,
    ) -> Result<(Vec<PageResult>, Result<usize, TierError>), Pdf2TextError> {
        let max_pages = self.config.pages_to_ocr;
        let dpi = self.config.dpi;

        // Capacity 1: the converter renders at most one page ahead.
        let (tx, rx) = mpsc::channel::<PageImage>(1);
        let rasterizer = Arc::clone(&self.rasterizer);
        let callback = self.config.progress_callback.clone();
        let mut sink = ChannelSink {
            tx,
            callback: callback.clone(),
        };
        let render_task = tokio::task::spawn_blocking(move || {
            let mut source = source;
            rasterizer.render(&mut source, max_pages, dpi, &mut sink)
        });

        let engine = Arc::clone(&self.ocr);
        let mut pages: Vec<PageResult> = ReceiverStream::new(rx)
            .take(max_pages)
            .map(|page| {
                let engine = Arc::clone(&engine);
                let callback = callback.clone();
                async move {
                    let page_index = page.index;
                    let result = tokio::task::spawn_blocking(move || {
                        recognize_page(&*engine, page)
                    })
                    .await
                    .unwrap_or_else(|e| PageResult {
                        page_index,
                        text: String::new(),
                        threshold: None,
                        duration_ms: 0,
                        error: Some(PageError::Internal {
                            page: page_index + 1,
                            detail: e.to_string(),
                        }),
                    });

                    if let Some(ref cb) = callback {
                        match &result.error {
                            None => cb.on_page_complete(result.page_num(), result.text.chars().count()),
                            Some(e) => cb.on_page_error(result.page_num(), &e.to_string()),
                        }
                    }
                    result
                }
            })
            .buffer_unordered(self.config.ocr_concurrency)
            .collect()
            .await;

        pages.sort_by_key(|p| p.page_index);

        let render_outcome = render_task
            .await
            .map_err(|e| Pdf2TextError::Internal(format!("rasteriser task failed: {e}")))?;
        Ok((pages, render_outcome))
    }

    /// Apply the character cap and the minimum-length check.
    fn finish(
        &self,
        document: String,
        result: ExtractionResult,
        pages: Vec<PageResult>,
        mut stats: ExtractionStats,
        total_start: Instant,
    ) -> Result<ExtractionOutput, Pdf2TextError> {
        stats.untruncated_chars = result.char_count;
        let (cut, truncated) = truncate_chars(&result.text, self.config.char_limit);
        let text = cut.to_string();
        let char_count = if truncated {
            self.config.char_limit
        } else {
            result.char_count
        };

        if char_count < self.config.min_text_chars {
            warn!(
                "'{}': {} tier produced only {} chars",
                document, result.provenance, char_count
            );
            return Err(Pdf2TextError::TextTooWeak {
                document,
                chars: char_count,
                min: self.config.min_text_chars,
            });
        }

        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        info!(
            "Extraction complete: '{}' via {} tier, {} chars{}, {}ms",
            document,
            result.provenance,
            char_count,
            if truncated { " (truncated)" } else { "" },
            stats.total_duration_ms
        );
        self.notify(|cb| cb.on_extraction_complete(result.provenance, char_count));

        Ok(ExtractionOutput {
            document_name: document,
            text,
            provenance: result.provenance,
            char_count,
            truncated,
            pages,
            stats,
        })
    }

    fn notify(&self, f: impl FnOnce(&dyn ExtractionProgressCallback)) {
        if let Some(ref cb) = self.config.progress_callback {
            f(cb.as_ref());
        }
    }
}

/// Forwards rendered pages into the OCR channel.
struct ChannelSink {
    tx: mpsc::Sender<PageImage>,
    callback: Option<ProgressCallback>,
}

impl PageSink for ChannelSink {
    fn window(&mut self, pages: usize) {
        if let Some(ref cb) = self.callback {
            cb.on_ocr_start(pages);
        }
    }

    fn page(&mut self, page: PageImage) -> bool {
        // A closed channel means the consumer has all the pages it wants.
        self.tx.blocking_send(page).is_ok()
    }
}

/// Run one text-layer tier on the blocking pool, handing the source back.
async fn run_tier(
    extractor: Arc<dyn TextExtractor>,
    mut source: DocumentSource,
) -> Result<(DocumentSource, Result<String, TierError>), Pdf2TextError> {
    tokio::task::spawn_blocking(move || {
        let outcome = extractor.extract(&mut source);
        (source, outcome)
    })
    .await
    .map_err(|e| Pdf2TextError::Internal(format!("extraction task failed: {e}")))
}

/// Fatal error for a document every tier failed on.
fn classify_failures(document: &str, failures: &[TierError]) -> Pdf2TextError {
    if let Some(engine) = failures.iter().find(|e| e.is_engine_unavailable()) {
        return Pdf2TextError::EngineUnavailable(engine.to_string());
    }
    Pdf2TextError::UnreadableDocument {
        document: document.to_string(),
        detail: failures
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    }
}
