//! Rewindable byte-stream handle over an uploaded PDF.

use std::path::Path;

/// An immutable PDF byte buffer with a read cursor and a document name.
///
/// Each extraction owns its own `DocumentSource`; it is moved into the
/// pipeline and never shared between concurrent requests. Tiers call
/// [`DocumentSource::rewind`] before reading.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    name: String,
    bytes: Vec<u8>,
    pos: usize,
}

impl DocumentSource {
    /// Wrap in-memory bytes. `name` identifies the document to callers.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            pos: 0,
        }
    }

    /// Name the document after a path or URL segment, dropping the extension.
    ///
    /// `"reports/Q3 summary.pdf"` becomes `"Q3 summary"`.
    pub fn name_from(path_like: &str) -> String {
        let file = Path::new(path_like)
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| path_like.to_string());
        match file.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reset the cursor to the start of the buffer.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Return everything from the cursor to the end and move the cursor there.
    ///
    /// A second call without [`rewind`](Self::rewind) returns an empty slice.
    pub fn read_all(&mut self) -> &[u8] {
        let start = self.pos.min(self.bytes.len());
        self.pos = self.bytes.len();
        &self.bytes[start..]
    }
}
