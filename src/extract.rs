//! Top-level extraction entry points.
//!
//! Each call builds its own [`DocumentSource`] and runs it through an
//! [`ExtractionPipeline`]; nothing about the document outlives the call, so
//! concurrent extractions never see each other's state.

use crate::config::ExtractionConfig;
use crate::error::Pdf2TextError;
use crate::output::{DocumentMetadata, ExtractionOutput};
use crate::pipeline::fallback::ExtractionPipeline;
use crate::pipeline::{input, render};
use crate::source::DocumentSource;
use std::path::Path;
use tracing::info;

/// Extract text from a PDF file or URL.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `input`: Local file path or HTTP/HTTPS URL to a PDF
/// * `config`: Extraction configuration
///
/// # Returns
/// `Ok(ExtractionOutput)` with at most `config.char_limit` characters, even
/// if some OCR pages failed (check `output.stats.ocr_failed_pages`).
///
/// # Errors
/// - File not found / permission denied / download failure
/// - [`Pdf2TextError::UnreadableDocument`]: no tier could parse the bytes
/// - [`Pdf2TextError::TextTooWeak`]: every tier ran, too little text came out
pub async fn extract(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    let source = input::resolve_input(input_str, config.download_timeout_secs).await?;
    ExtractionPipeline::new(config.clone()).run(source).await
}

/// Extract text from PDF bytes already in memory.
///
/// `name` identifies the document in the output and in error messages;
/// pass the original upload's file name (its extension is dropped).
///
/// # Example
/// ```rust,no_run
/// use pdf2text::{extract_from_bytes, ExtractionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes: Vec<u8> = std::fs::read("contract.pdf")?;
/// let output = extract_from_bytes("contract.pdf", bytes, &ExtractionConfig::default()).await?;
/// println!("{} chars via {}", output.char_count, output.provenance);
/// # Ok(())
/// # }
/// ```
pub async fn extract_from_bytes(
    name: impl AsRef<str>,
    bytes: impl Into<Vec<u8>>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    let source = DocumentSource::new(DocumentSource::name_from(name.as_ref()), bytes);
    ExtractionPipeline::new(config.clone()).run(source).await
}

/// Extract text and write it to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    let output = extract(input_str, config).await?;
    let path = output_path.as_ref();
    let write_err = |e: std::io::Error| Pdf2TextError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, &output.text)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!("Wrote {} chars to {}", output.char_count, path.display());
    Ok(output)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally; do not call from inside an
/// async context.
pub fn extract_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Pdf2TextError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2TextError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input_str, config))
}

/// Read PDF metadata without extracting text.
///
/// Needs the pdfium library but not the OCR engine.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<DocumentMetadata, Pdf2TextError> {
    let mut source = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let document = source.name().to_string();

    tokio::task::spawn_blocking(move || render::extract_metadata(&mut source))
        .await
        .map_err(|e| Pdf2TextError::Internal(format!("metadata task failed: {e}")))?
        .map_err(|e| {
            if e.is_engine_unavailable() {
                Pdf2TextError::EngineUnavailable(e.to_string())
            } else {
                Pdf2TextError::UnreadableDocument {
                    document,
                    detail: e.to_string(),
                }
            }
        })
}
