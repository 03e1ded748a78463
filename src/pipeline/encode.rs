//! Image encoding: `BinarizedImage` → PNG for the OCR engine.
//!
//! PNG is lossless, so the hard black/white edges produced by binarisation
//! reach the OCR engine intact. A 1-channel 8-bit PNG of a mostly-white page
//! also compresses to a fraction of the raw bitmap.

use super::preprocess::BinarizedImage;
use image::ImageFormat;
use std::io::{Seek, Write};

/// Encode a binarised page as PNG into any seekable writer.
pub fn write_png<W: Write + Seek>(
    img: &BinarizedImage,
    writer: &mut W,
) -> Result<(), image::ImageError> {
    img.pixels.write_to(writer, ImageFormat::Png)
}
