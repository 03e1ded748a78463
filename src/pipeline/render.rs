//! PDF rasterisation for the OCR tier, plus metadata inspection.
//!
//! Pages are rendered one at a time at a fixed DPI and handed to a
//! [`PageSink`] as soon as they exist. The converter never holds more than the
//! page it is currently drawing; the sink decides how many rendered pages
//! may be in flight downstream. All calls here block (pdfium is CPU-bound
//! and not async-safe) and must run inside `spawn_blocking`.

use crate::engine::bind_pdfium;
use crate::error::TierError;
use crate::output::{DocumentMetadata, Provenance};
use crate::source::DocumentSource;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// A rendered page bitmap with its 0-based index.
pub struct PageImage {
    pub index: usize,
    pub image: DynamicImage,
}

/// Receives rendered pages from a [`RasterConverter`].
pub trait PageSink {
    /// The document is open and `pages` pages will be rendered. Called once,
    /// before the first page.
    fn window(&mut self, pages: usize) {
        let _ = pages;
    }

    /// Take one page. Returning `false` stops rendering.
    fn page(&mut self, page: PageImage) -> bool;
}

/// Renders a bounded window of pages to bitmaps.
pub trait RasterConverter: Send + Sync {
    /// Render pages `0..min(max_pages, page_count)` in order at `dpi`.
    ///
    /// The window size goes to [`PageSink::window`] first, then each page is
    /// passed by value to [`PageSink::page`]; rendering stops early when the
    /// sink returns `false`. Returns the number of pages handed over.
    /// A failure to open the document returns [`TierError::Parse`] or
    /// [`TierError::EngineUnavailable`]; a failure on a later page returns
    /// [`TierError::Render`] after the earlier pages were already delivered.
    fn render(
        &self,
        source: &mut DocumentSource,
        max_pages: usize,
        dpi: u32,
        sink: &mut dyn PageSink,
    ) -> Result<usize, TierError>;
}

/// pdfium-backed [`RasterConverter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumRasterizer;

impl RasterConverter for PdfiumRasterizer {
    fn render(
        &self,
        source: &mut DocumentSource,
        max_pages: usize,
        dpi: u32,
        sink: &mut dyn PageSink,
    ) -> Result<usize, TierError> {
        let pdfium = bind_pdfium().map_err(|detail| TierError::EngineUnavailable {
            tier: Provenance::Ocr,
            detail,
        })?;

        source.rewind();
        let document = pdfium
            .load_pdf_from_byte_slice(source.read_all(), None)
            .map_err(|e| TierError::Parse {
                tier: Provenance::Ocr,
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        let total_pages = pages.len() as usize;
        let window = max_pages.min(total_pages);
        info!(
            "Rasterising {} of {} pages at {} DPI",
            window, total_pages, dpi
        );

        sink.window(window);

        // PDF user space is 72 units per inch.
        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

        let mut delivered = 0;
        for idx in 0..window {
            let page = pages.get(idx as u16).map_err(|e| TierError::Render {
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;

            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| TierError::Render {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            delivered += 1;
            if !sink.page(PageImage { index: idx, image }) {
                debug!("Raster consumer stopped after page {}", idx + 1);
                break;
            }
        }

        Ok(delivered)
    }
}

/// Extract document metadata without extracting text.
pub fn extract_metadata(source: &mut DocumentSource) -> Result<DocumentMetadata, TierError> {
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

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
    })
}
