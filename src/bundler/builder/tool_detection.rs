//! External tool detection on `PATH`.

use std::path::PathBuf;

/// Directory containing the UPX compressor, if it can be found on `PATH`.
///
/// The packaging tool takes the directory rather than the binary, so the
/// parent of the resolved executable is returned.
pub fn find_upx_dir(program: &str) -> Option<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            path.parent().map(|dir| dir.to_path_buf())
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_program_has_no_directory() {
        assert!(find_upx_dir("definitely-not-a-real-upx-binary").is_none());
    }
}
