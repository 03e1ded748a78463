//! Fallback-chain integration tests.
//!
//! Every tier, the rasteriser and the OCR engine are replaced by spies, so
//! these tests need neither the pdfium library nor a tesseract binary. They
//! check which tiers run, how many pages reach OCR, and what text comes out.

use image::{DynamicImage, GrayImage, Luma};
use pdf2text::{
    BinarizedImage, DocumentSource, ExtractionConfig, ExtractionPipeline,
    ExtractionProgressCallback, OcrEngine, PageError, PageImage, PageSink, Provenance,
    RasterConverter, TextExtractor, TierError,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Spies ────────────────────────────────────────────────────────────────────

struct SpyExtractor {
    tier: Provenance,
    outcome: Result<String, TierError>,
    calls: AtomicUsize,
}

impl SpyExtractor {
    fn ok(tier: Provenance, text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            tier,
            outcome: Ok(text.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn unparseable(tier: Provenance) -> Arc<Self> {
        Arc::new(Self {
            tier,
            outcome: Err(TierError::Parse {
                tier,
                detail: "invalid file header".into(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for SpyExtractor {
    fn provenance(&self) -> Provenance {
        self.tier
    }

    fn extract(&self, source: &mut DocumentSource) -> Result<String, TierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        source.rewind();
        assert_eq!(source.position(), 0, "tier must start at the beginning");
        let _ = source.read_all();
        self.outcome.clone()
    }
}

#[derive(Default)]
struct SpyRasterizer {
    page_count: usize,
    /// Fail before rendering anything.
    open_error: Option<TierError>,
    /// Fail when reaching this 0-based page.
    fail_at: Option<usize>,
    /// Render every page, ignoring `max_pages`.
    ignore_window: bool,
    calls: AtomicUsize,
    rendered: AtomicUsize,
}

impl SpyRasterizer {
    fn with_pages(page_count: usize) -> Self {
        Self {
            page_count,
            ..Default::default()
        }
    }
}

impl RasterConverter for SpyRasterizer {
    fn render(
        &self,
        source: &mut DocumentSource,
        max_pages: usize,
        dpi: u32,
        sink: &mut dyn PageSink,
    ) -> Result<usize, TierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(dpi, 150);
        source.rewind();

        if let Some(ref e) = self.open_error {
            return Err(e.clone());
        }

        let window = if self.ignore_window {
            self.page_count
        } else {
            max_pages.min(self.page_count)
        };
        sink.window(window);

        let mut delivered = 0;
        for index in 0..window {
            if self.fail_at == Some(index) {
                return Err(TierError::Render {
                    page: index + 1,
                    detail: "bitmap allocation failed".into(),
                });
            }
            self.rendered.fetch_add(1, Ordering::SeqCst);
            delivered += 1;
            let page = PageImage {
                index,
                image: DynamicImage::ImageLuma8(GrayImage::from_fn(16, 16, |x, _| {
                    if x < 8 {
                        Luma([20])
                    } else {
                        Luma([230])
                    }
                })),
            };
            if !sink.page(page) {
                break;
            }
        }
        Ok(delivered)
    }
}

#[derive(Default)]
struct SpyOcr {
    /// 0-based pages that fail recognition.
    failing: HashSet<usize>,
    /// Every page reports the engine as missing.
    missing_binary: bool,
    /// Every page returns this instead of its usual text.
    fixed_text: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    seen: Mutex<Vec<usize>>,
}

impl SpyOcr {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn page_text(index: usize) -> String {
    format!(
        "Page {} of the scanned lease. The tenant agrees to the terms set out below.",
        index + 1
    )
}

impl OcrEngine for SpyOcr {
    fn name(&self) -> &str {
        "spy"
    }

    fn recognize(&self, image: &BinarizedImage) -> Result<String, PageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.seen.lock().unwrap().push(image.index);

        assert!(image.pixels.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let page = image.index + 1;
        if self.missing_binary {
            return Err(PageError::EngineUnavailable {
                page,
                detail: "'tesseract' not found".into(),
            });
        }
        if self.failing.contains(&image.index) {
            return Err(PageError::RecognitionFailed {
                page,
                detail: "engine crashed".into(),
            });
        }
        Ok(self
            .fixed_text
            .clone()
            .unwrap_or_else(|| format!("{}\n", page_text(image.index))))
    }
}

struct Harness {
    native: Arc<SpyExtractor>,
    structured: Arc<SpyExtractor>,
    rasterizer: Arc<SpyRasterizer>,
    ocr: Arc<SpyOcr>,
}

impl Harness {
    fn new(native: Arc<SpyExtractor>, structured: Arc<SpyExtractor>) -> Self {
        Self {
            native,
            structured,
            rasterizer: Arc::new(SpyRasterizer::with_pages(3)),
            ocr: Arc::new(SpyOcr::default()),
        }
    }

    fn scanned() -> Self {
        Self::new(
            SpyExtractor::ok(Provenance::Native, ""),
            SpyExtractor::ok(Provenance::Structured, " \n \n"),
        )
    }

    fn rasterizer(mut self, rasterizer: SpyRasterizer) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    fn ocr(mut self, ocr: SpyOcr) -> Self {
        self.ocr = Arc::new(ocr);
        self
    }

    fn pipeline(&self, config: ExtractionConfig) -> ExtractionPipeline {
        ExtractionPipeline::with_components(
            config,
            self.native.clone(),
            self.structured.clone(),
            self.rasterizer.clone(),
            self.ocr.clone(),
        )
    }
}

fn source() -> DocumentSource {
    DocumentSource::new("lease", b"%PDF-1.7 spy document".to_vec())
}

fn config() -> ExtractionConfig {
    ExtractionConfig::default()
}

/// `len` characters of varied, non-whitespace-edged text.
fn prose(len: usize) -> String {
    "The quick brown fox jumps over the lazy dog. "
        .chars()
        .cycle()
        .take(len - 1)
        .chain(std::iter::once('.'))
        .collect()
}

// ── Short-circuiting ─────────────────────────────────────────────────────────

#[tokio::test]
async fn native_text_short_circuits_the_chain() {
    let text = prose(5_000);
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, text.clone()),
        SpyExtractor::ok(Provenance::Structured, prose(500)),
    );

    let out = h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(out.provenance, Provenance::Native);
    assert_eq!(out.char_count, 5_000);
    assert_eq!(out.text, text);
    assert!(!out.truncated);
    assert_eq!(h.native.calls(), 1);
    assert_eq!(h.structured.calls(), 0);
    assert_eq!(h.rasterizer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.ocr.calls(), 0);
    assert_eq!(out.stats.tiers_attempted, vec![Provenance::Native]);
    assert!(out.pages.is_empty());
}

#[tokio::test]
async fn structured_runs_when_native_looks_scanned() {
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, "Page 1\n"),
        SpyExtractor::ok(Provenance::Structured, prose(800)),
    );

    let out = h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(out.provenance, Provenance::Structured);
    assert_eq!(out.char_count, 800);
    assert_eq!(h.structured.calls(), 1);
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn structured_runs_when_native_cannot_parse() {
    let h = Harness::new(
        SpyExtractor::unparseable(Provenance::Native),
        SpyExtractor::ok(Provenance::Structured, prose(300)),
    );

    let out = h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(out.provenance, Provenance::Structured);
    assert_eq!(out.stats.tiers_failed, vec![Provenance::Native]);
}

#[tokio::test]
async fn whitespace_padding_does_not_count_as_text() {
    // 99 real characters padded with whitespace still looks scanned.
    let padded = format!("\n\n   {}   \n\n", prose(99));
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, padded),
        SpyExtractor::ok(Provenance::Structured, prose(100)),
    );

    let out = h.pipeline(config()).run(source()).await.unwrap();
    assert_eq!(out.provenance, Provenance::Structured);
}

#[tokio::test]
async fn scan_threshold_is_configurable() {
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, prose(150)),
        SpyExtractor::ok(Provenance::Structured, prose(400)),
    );
    let config = ExtractionConfig::builder()
        .scan_threshold(200)
        .build()
        .unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();
    assert_eq!(out.provenance, Provenance::Structured);
}

// ── OCR tier ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn image_only_document_is_ocrd_page_by_page() {
    let h = Harness::scanned();

    let out = h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(out.provenance, Provenance::Ocr);
    assert_eq!(h.ocr.calls(), 3);
    assert_eq!(out.pages.len(), 3);
    let expected = format!("{}\n{}\n{}\n", page_text(0), page_text(1), page_text(2));
    assert_eq!(out.text, expected);
    assert_eq!(out.char_count, expected.chars().count());
    assert_eq!(
        out.stats.tiers_attempted,
        vec![Provenance::Native, Provenance::Structured, Provenance::Ocr]
    );
    assert_eq!(out.stats.ocr_pages, 3);
    assert_eq!(out.stats.ocr_failed_pages, 0);
    assert!(out.pages.iter().all(|p| p.threshold.is_some()));
}

#[tokio::test]
async fn ocr_page_window_is_bounded() {
    let h = Harness::scanned().rasterizer(SpyRasterizer::with_pages(40));
    let config = ExtractionConfig::builder().pages_to_ocr(3).build().unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();

    assert_eq!(h.ocr.calls(), 3);
    assert_eq!(out.pages.len(), 3);
    assert_eq!(h.rasterizer.rendered.load(Ordering::SeqCst), 3);
    assert_eq!(
        out.pages.iter().map(|p| p.page_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn page_bound_holds_even_if_converter_overruns() {
    let rasterizer = SpyRasterizer {
        page_count: 25,
        ignore_window: true,
        ..Default::default()
    };
    let h = Harness::scanned().rasterizer(rasterizer);
    let config = ExtractionConfig::builder().pages_to_ocr(4).build().unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();

    assert_eq!(h.ocr.calls(), 4);
    assert_eq!(out.pages.len(), 4);
    // The converter is stopped once the consumer has what it needs.
    assert!(h.rasterizer.rendered.load(Ordering::SeqCst) < 25);
}

#[tokio::test]
async fn failed_page_contributes_empty_segment() {
    let ocr = SpyOcr {
        failing: HashSet::from([1]),
        ..Default::default()
    };
    let h = Harness::scanned().ocr(ocr);

    let out = h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(h.ocr.calls(), 3);
    assert_eq!(out.text, format!("{}\n\n{}\n", page_text(0), page_text(2)));
    assert_eq!(out.stats.ocr_failed_pages, 1);
    assert!(matches!(
        out.pages[1].error,
        Some(PageError::RecognitionFailed { page: 2, .. })
    ));
    assert_eq!(out.pages[1].text, "");
    assert!(out.pages[0].error.is_none());
    assert!(out.pages[2].error.is_none());
}

#[tokio::test]
async fn render_failure_keeps_earlier_pages() {
    let rasterizer = SpyRasterizer {
        page_count: 5,
        fail_at: Some(2),
        ..Default::default()
    };
    let h = Harness::scanned().rasterizer(rasterizer);

    let out = h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(out.provenance, Provenance::Ocr);
    assert_eq!(out.pages.len(), 2);
    assert_eq!(out.text, format!("{}\n{}\n", page_text(0), page_text(1)));
    assert!(out.stats.tiers_failed.is_empty());
}

#[tokio::test]
async fn ocr_concurrency_is_bounded() {
    let ocr = SpyOcr {
        delay: Some(Duration::from_millis(30)),
        ..Default::default()
    };
    let h = Harness::scanned()
        .rasterizer(SpyRasterizer::with_pages(6))
        .ocr(ocr);
    let config = ExtractionConfig::builder()
        .pages_to_ocr(6)
        .ocr_concurrency(2)
        .build()
        .unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();

    assert_eq!(h.ocr.calls(), 6);
    assert!(h.ocr.max_in_flight.load(Ordering::SeqCst) <= 2);
    // Output order follows the document, not completion order.
    let expected: String = (0..6).map(|i| format!("{}\n", page_text(i))).collect();
    assert_eq!(out.text, expected);
}

#[tokio::test]
async fn sequential_ocr_by_default() {
    let ocr = SpyOcr {
        delay: Some(Duration::from_millis(10)),
        ..Default::default()
    };
    let h = Harness::scanned().ocr(ocr);

    h.pipeline(config()).run(source()).await.unwrap();

    assert_eq!(h.ocr.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(*h.ocr.seen.lock().unwrap(), vec![0, 1, 2]);
}

// ── Truncation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn output_is_a_literal_prefix_of_char_limit() {
    let text = prose(10_000);
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, text.clone()),
        SpyExtractor::ok(Provenance::Structured, ""),
    );
    let config = ExtractionConfig::builder().char_limit(6_000).build().unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();

    assert_eq!(out.char_count, 6_000);
    assert_eq!(out.text, &text[..6_000]);
    assert!(out.truncated);
    assert_eq!(out.stats.untruncated_chars, 10_000);
}

#[tokio::test]
async fn truncation_counts_characters_not_bytes() {
    let text: String = "Ünïcödé prose, ".chars().cycle().take(500).collect();
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, text.clone()),
        SpyExtractor::ok(Provenance::Structured, ""),
    );
    let config = ExtractionConfig::builder().char_limit(120).build().unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();

    assert_eq!(out.text.chars().count(), 120);
    assert!(text.starts_with(&out.text));
}

#[tokio::test]
async fn ocr_text_is_truncated_too() {
    let h = Harness::scanned().rasterizer(SpyRasterizer::with_pages(5));
    let config = ExtractionConfig::builder().char_limit(150).build().unwrap();

    let out = h.pipeline(config).run(source()).await.unwrap();

    let full: String = (0..5).map(|i| format!("{}\n", page_text(i))).collect();
    assert_eq!(out.provenance, Provenance::Ocr);
    assert_eq!(out.char_count, 150);
    assert!(full.starts_with(&out.text));
}

// ── Fatal outcomes ───────────────────────────────────────────────────────────

#[tokio::test]
async fn not_a_pdf_is_unreadable() {
    let rasterizer = SpyRasterizer {
        open_error: Some(TierError::Parse {
            tier: Provenance::Ocr,
            detail: "invalid file header".into(),
        }),
        ..Default::default()
    };
    let h = Harness::new(
        SpyExtractor::unparseable(Provenance::Native),
        SpyExtractor::unparseable(Provenance::Structured),
    )
    .rasterizer(rasterizer);

    let err = h.pipeline(config()).run(source()).await.unwrap_err();

    assert_eq!(err.kind(), "unreadable-document");
    assert!(err.to_string().contains("lease"));
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn missing_pdfium_is_engine_unavailable() {
    let rasterizer = SpyRasterizer {
        open_error: Some(TierError::EngineUnavailable {
            tier: Provenance::Ocr,
            detail: "pdfium library not found".into(),
        }),
        ..Default::default()
    };
    let h = Harness::new(
        SpyExtractor::unparseable(Provenance::Native),
        Arc::new(SpyExtractor {
            tier: Provenance::Structured,
            outcome: Err(TierError::EngineUnavailable {
                tier: Provenance::Structured,
                detail: "pdfium library not found".into(),
            }),
            calls: AtomicUsize::new(0),
        }),
    )
    .rasterizer(rasterizer);

    let err = h.pipeline(config()).run(source()).await.unwrap_err();
    assert_eq!(err.kind(), "engine-unavailable");
}

#[tokio::test]
async fn missing_pdfium_on_image_only_pdf_is_engine_unavailable() {
    // lopdf parses the file but finds no text; pdfium is needed for the rest.
    let rasterizer = SpyRasterizer {
        open_error: Some(TierError::EngineUnavailable {
            tier: Provenance::Ocr,
            detail: "pdfium library not found".into(),
        }),
        ..Default::default()
    };
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, ""),
        Arc::new(SpyExtractor {
            tier: Provenance::Structured,
            outcome: Err(TierError::EngineUnavailable {
                tier: Provenance::Structured,
                detail: "pdfium library not found".into(),
            }),
            calls: AtomicUsize::new(0),
        }),
    )
    .rasterizer(rasterizer);

    let err = h.pipeline(config()).run(source()).await.unwrap_err();
    assert_eq!(err.kind(), "engine-unavailable");
    assert_eq!(h.ocr.calls(), 0);
}

#[tokio::test]
async fn ocr_start_reports_pages_actually_rendered() {
    let recorder = Arc::new(Recorder::default());
    let h = Harness::scanned().rasterizer(SpyRasterizer::with_pages(2));
    let config = ExtractionConfig::builder()
        .pages_to_ocr(5)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    h.pipeline(config).run(source()).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert!(events.contains(&"ocr 2".to_string()), "{events:?}");
    assert!(!events.iter().any(|e| e == "ocr 5"));
}

#[tokio::test]
async fn blank_scan_is_text_too_weak() {
    let ocr = SpyOcr {
        fixed_text: Some("  \n\x0c".into()),
        ..Default::default()
    };
    let h = Harness::scanned().ocr(ocr);

    let err = h.pipeline(config()).run(source()).await.unwrap_err();

    assert_eq!(err.kind(), "text-too-weak");
    assert_eq!(h.ocr.calls(), 3);
}

#[tokio::test]
async fn readable_document_with_failed_ocr_open_is_weak_not_unreadable() {
    let rasterizer = SpyRasterizer {
        open_error: Some(TierError::Parse {
            tier: Provenance::Ocr,
            detail: "unsupported encryption".into(),
        }),
        ..Default::default()
    };
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, "Title page"),
        SpyExtractor::ok(Provenance::Structured, "Title page\n"),
    )
    .rasterizer(rasterizer);

    let err = h.pipeline(config()).run(source()).await.unwrap_err();
    assert_eq!(err.kind(), "text-too-weak");
}

#[tokio::test]
async fn missing_ocr_binary_is_engine_unavailable() {
    let ocr = SpyOcr {
        missing_binary: true,
        ..Default::default()
    };
    let h = Harness::scanned().ocr(ocr);

    let err = h.pipeline(config()).run(source()).await.unwrap_err();
    assert_eq!(err.kind(), "engine-unavailable");
}

// ── Progress events ──────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ExtractionProgressCallback for Recorder {
    fn on_tier_start(&self, tier: Provenance) {
        self.push(format!("start {tier}"));
    }

    fn on_tier_complete(&self, tier: Provenance, _chars: usize, usable: bool) {
        self.push(format!("done {tier} usable={usable}"));
    }

    fn on_tier_failed(&self, tier: Provenance, _error: &str) {
        self.push(format!("failed {tier}"));
    }

    fn on_ocr_start(&self, max_pages: usize) {
        self.push(format!("ocr {max_pages}"));
    }

    fn on_page_complete(&self, page_num: usize, _chars: usize) {
        self.push(format!("page {page_num}"));
    }

    fn on_page_error(&self, page_num: usize, _error: &str) {
        self.push(format!("page {page_num} error"));
    }

    fn on_extraction_complete(&self, tier: Provenance, _chars: usize) {
        self.push(format!("complete {tier}"));
    }
}

#[tokio::test]
async fn progress_events_follow_the_chain() {
    let recorder = Arc::new(Recorder::default());
    let ocr = SpyOcr {
        failing: HashSet::from([2]),
        ..Default::default()
    };
    let h = Harness::new(
        SpyExtractor::unparseable(Provenance::Native),
        SpyExtractor::ok(Provenance::Structured, ""),
    )
    .ocr(ocr);
    let config = ExtractionConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();

    h.pipeline(config).run(source()).await.unwrap();

    let events = recorder.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start native",
            "failed native",
            "start structured",
            "done structured usable=false",
            "start ocr",
            "ocr 3",
            "page 1",
            "page 2",
            "page 3 error",
            "done ocr usable=true",
            "complete ocr",
        ]
    );
}

// ── Isolation ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_runs_keep_their_own_documents() {
    let h = Harness::new(
        SpyExtractor::ok(Provenance::Native, prose(400)),
        SpyExtractor::ok(Provenance::Structured, ""),
    );
    let pipeline = Arc::new(h.pipeline(config()));

    let names = ["alpha", "beta", "gamma", "delta"];
    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let pipeline = Arc::clone(&pipeline);
            let source = DocumentSource::new(*name, b"%PDF".to_vec());
            tokio::spawn(async move { pipeline.run(source).await })
        })
        .collect();

    for (name, handle) in names.iter().zip(handles) {
        let out = handle.await.unwrap().unwrap();
        assert_eq!(out.document_name, *name);
    }
}
