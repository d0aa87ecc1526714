//! NSIS toolset acquisition and management.
//!
//! makensis is expected at [`ToolchainConfig::makensis_path`]. When it is
//! missing the pinned NSIS release is downloaded once, unpacked into the tools
//! directory and marked executable. There is no retry. Cancelling the stage
//! abandons a download in flight.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    process::LogSink,
    settings::ToolchainConfig,
    utils::{fs, http},
};
use std::{
    io::Cursor,
    path::{Path, PathBuf},
};
use tokio_util::sync::CancellationToken;

/// Path of a usable makensis, downloading the toolset if necessary.
pub async fn ensure_makensis(
    config: &ToolchainConfig,
    sink: &dyn LogSink,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let makensis = config.makensis_path();
    if makensis.is_file() {
        log::debug!("Using makensis at {}", makensis.display());
        return Ok(makensis);
    }

    let url = config.nsis_url();
    sink.write(&format!(
        "makensis not found at {}, downloading NSIS {}",
        makensis.display(),
        config.nsis_version
    ));

    let archive = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(Error::Cancelled),
        archive = http::download(&url) => archive
            .map_err(|e| Error::Installer(format!("failed to download NSIS: {e}")))?,
    };

    fs::create_dir_all(&config.tools_dir, false).await?;
    extract_zip(archive, config.tools_dir.clone())
        .await
        .map_err(|e| Error::Installer(format!("failed to extract NSIS: {e}")))?;

    if !makensis.is_file() {
        return Err(Error::Installer(format!(
            "NSIS archive did not contain {}",
            makensis.display()
        )));
    }
    fs::make_executable(&makensis).await?;

    sink.success(&format!("NSIS {} installed", config.nsis_version));
    Ok(makensis)
}

/// Unpack a zip archive into `dest`, rejecting entries that escape it.
async fn extract_zip(archive: Vec<u8>, dest: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || extract_zip_blocking(&archive, &dest))
        .await
        .map_err(|e| Error::GenericError(format!("extraction task failed: {e}")))?
}

fn extract_zip_blocking(archive: &[u8], dest: &Path) -> Result<()> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).fs_context("creating directory", &target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }
        let mut out = std::fs::File::create(&target).fs_context("creating file", &target)?;
        std::io::copy(&mut entry, &mut out).fs_context("extracting file", &target)?;
    }

    Ok(())
}
