//! Scanned-document detection.
//!
//! A tier's text is "usable" when, with leading and trailing whitespace
//! removed, it has at least `threshold` characters. Anything shorter looks
//! like an image-only (scanned) document and sends the pipeline to the next
//! tier.

use crate::config::SCANNED_TEXT_THRESHOLD;

/// Classifies extracted text as usable or scanned-looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDetector {
    threshold: usize,
}

impl Default for ScanDetector {
    fn default() -> Self {
        Self::new(SCANNED_TEXT_THRESHOLD)
    }
}

impl ScanDetector {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// `true` when the stripped text is shorter than the threshold.
    ///
    /// Stops counting once the threshold is reached, so the cost does not
    /// grow with document length.
    pub fn looks_scanned(&self, text: &str) -> bool {
        text.trim().chars().take(self.threshold).count() < self.threshold
    }

    pub fn is_usable(&self, text: &str) -> bool {
        !self.looks_scanned(text)
    }
}
