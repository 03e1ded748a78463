//! Input resolution: turn a user-supplied path or URL into a [`DocumentSource`].
//!
//! The whole document is read into memory. Every tier parses from the same
//! buffer, and the pipeline rewinds it between tiers, so there is no temp
//! file to clean up and no second read of the network or disk.
//!
//! Bytes are not checked for a `%PDF` header here: deciding that a stream is
//! unreadable is the extraction tiers' job, and some real-world PDFs carry
//! junk before the header that the parsers tolerate.

use crate::error::Pdf2TextError;
use crate::source::DocumentSource;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory document.
///
/// URLs are downloaded with a `timeout_secs` limit; anything else is read
/// as a local file.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
) -> Result<DocumentSource, Pdf2TextError> {
    let input = input.trim();
    if input.is_empty() || (input.contains("://") && !is_url(input)) {
        return Err(Pdf2TextError::InvalidInput {
            input: input.to_string(),
        });
    }

    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

/// Read a local file, mapping I/O failures to user-facing errors.
async fn read_local(path_str: &str) -> Result<DocumentSource, Pdf2TextError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(Pdf2TextError::FileNotFound { path });
    }
    if path.is_dir() {
        return Err(Pdf2TextError::InvalidInput {
            input: path_str.to_string(),
        });
    }

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2TextError::PermissionDenied { path });
        }
        Err(_) => return Err(Pdf2TextError::FileNotFound { path }),
    };

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(DocumentSource::new(DocumentSource::name_from(path_str), bytes))
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<DocumentSource, Pdf2TextError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Pdf2TextError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let map_send_err = |e: reqwest::Error| {
        if e.is_timeout() {
            Pdf2TextError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            Pdf2TextError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(url).send().await.map_err(map_send_err)?;

    if !response.status().is_success() {
        return Err(Pdf2TextError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(map_send_err)?;
    info!("Downloaded {} bytes", bytes.len());

    Ok(DocumentSource::new(document_name_from_url(url), bytes.to_vec()))
}

/// Name a downloaded document after the last URL path segment.
fn document_name_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return DocumentSource::name_from(last);
                }
            }
        }
    }

    "downloaded".to_string()
}
