//! NSIS utility functions.
//!
//! Helper functions for version formatting, string escaping and file output.

use crate::bundler::{
    error::{ErrorExt, Result},
    packaging::version_file::version_tuple,
};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Format version string for NSIS VIProductVersion.
///
/// NSIS requires exactly 4 numeric parts (major.minor.patch.build).
/// This function normalizes version strings to meet that requirement:
/// - "1" -> "1.0.0.0"
/// - "1.2" -> "1.2.0.0"
/// - "1.2.3" -> "1.2.3.0"
/// - "1.2.3.4.5" -> "1.2.3.4" (truncates to first 4)
/// - "2.0-rc1" -> "2.0.0.0" (non-numeric suffixes are dropped)
pub fn format_version_for_nsis(version: &str) -> String {
    let [major, minor, patch, build] = version_tuple(version);
    format!("{major}.{minor}.{patch}.{build}")
}

/// Escape a value for use inside a double-quoted NSIS string.
///
/// `$` starts a variable and `"` ends the string, so both are escaped.
pub fn escape_nsis(value: &str) -> String {
    value.replace('$', "$$").replace('"', "$\\\"")
}

/// Escaped path for an NSIS string, in the host's separator convention.
pub fn nsis_path(path: &Path) -> String {
    escape_nsis(&path.display().to_string())
}

/// Write file with UTF-8 BOM (required by NSIS).
///
/// NSIS requires installer scripts to be encoded with UTF-8 BOM (byte order mark).
/// This function writes the BOM (EF BB BF) followed by the content.
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating NSI script file", path)?;

    // Write UTF-8 BOM: EF BB BF
    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_always_has_four_parts() {
        assert_eq!(format_version_for_nsis("1"), "1.0.0.0");
        assert_eq!(format_version_for_nsis("1.2"), "1.2.0.0");
        assert_eq!(format_version_for_nsis("1.2.3"), "1.2.3.0");
        assert_eq!(format_version_for_nsis("1.2.3.4"), "1.2.3.4");
        assert_eq!(format_version_for_nsis("1.2.3.4.5"), "1.2.3.4");
        assert_eq!(format_version_for_nsis("2.0-rc1"), "2.0.0.0");
    }

    #[test]
    fn dollar_and_quote_are_escaped() {
        assert_eq!(escape_nsis("Cost $5"), "Cost $$5");
        assert_eq!(escape_nsis("say \"hi\""), "say $\\\"hi$\\\"");
    }

    #[test]
    fn paths_are_escaped() {
        assert_eq!(nsis_path(Path::new("/tmp/$app/dist")), "/tmp/$$app/dist");
    }

    #[tokio::test]
    async fn script_file_starts_with_bom() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("installer.nsi");
        write_utf8_bom(&path, "Name \"x\"").await.expect("write");

        let bytes = std::fs::read(&path).expect("read");
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(&bytes[3..], b"Name \"x\"");
    }
}
