//! Page image preprocessing: grayscale, Otsu threshold, binarise.
//!
//! OCR engines read clean black-on-white text far more reliably than
//! anti-aliased colour scans with uneven backgrounds. Each page gets its own
//! global threshold chosen from its intensity histogram, so a dark scan and
//! a faded one are both split at the right level.

use super::render::PageImage;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use tracing::debug;

/// A page reduced to pure foreground/background pixels.
///
/// Pixels are 0 (at or below the threshold) or 255 (above it), matching
/// a standard binary threshold.
pub struct BinarizedImage {
    pub index: usize,
    pub threshold: u8,
    pub pixels: GrayImage,
}

impl BinarizedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Run the full preprocessing chain on a rendered page.
///
/// Consumes the page so its colour bitmap is freed as soon as the grayscale
/// copy exists.
pub fn binarize_page(page: PageImage) -> BinarizedImage {
    let PageImage { index, image } = page;
    let gray = to_grayscale(&image);
    drop(image);

    // Ties keep the lowest level; a uniform page yields 0.
    let level = otsu_level(&gray);
    let pixels = threshold(&gray, level, ThresholdType::Binary);
    debug!(
        "Page {}: Otsu threshold {} on {}x{}",
        index + 1,
        level,
        pixels.width(),
        pixels.height()
    );

    BinarizedImage {
        index,
        threshold: level,
        pixels,
    }
}

/// Convert to single-channel luma with the ITU-R BT.601 weights
/// (0.299 R + 0.587 G + 0.114 B), rounded to nearest.
///
/// Written out because `image`'s `to_luma8` uses the Rec. 709 weights.
///
/// Alpha is ignored; pdfium renders pages onto an opaque white background.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    for (x, y, px) in rgb.enumerate_pixels() {
        let [r, g, b] = px.0;
        let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000;
        gray.put_pixel(x, y, Luma([luma as u8]));
    }
    gray
}
