//! HTTP utilities for downloading bundler tools.

use crate::bundler::error::{Error, Result};

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. Non-success status codes are
/// reported as [`Error::Download`].
///
/// Used by:
/// - NSIS toolset acquisition (downloads the makensis distribution)
pub async fn download(url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let download_error = |reason: String| Error::Download {
        url: url.to_string(),
        reason,
    };

    let response = reqwest::get(url)
        .await
        .map_err(|e| download_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(download_error(format!("server responded with {status}")));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_error(format!("failed to read response: {e}")))?;

    log::debug!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}
