//! File system helpers shared by the pipeline stages.
//!
//! Every operation here is idempotent: removing a missing directory and
//! creating an existing one both succeed.

use crate::bundler::error::{ErrorExt, Result};
use path_absolutize::Absolutize;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Absolute form of `path`, resolved against the current directory.
///
/// The path does not need to exist.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving absolute path", path)?
        .into_owned())
}

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Whether `path` is a directory holding at least one entry.
pub async fn is_non_empty_dir(path: &Path) -> bool {
    match fs::read_dir(path).await {
        Ok(mut entries) => matches!(entries.next_entry().await, Ok(Some(_))),
        Err(_) => false,
    }
}

/// Marks a downloaded tool as executable.
#[cfg(unix)]
pub async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .fs_context("setting executable permissions", path)
}

/// Marks a downloaded tool as executable.
#[cfg(not(unix))]
pub async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remove_missing_directory_is_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        remove_dir_all(&dir.path().join("nope")).await.expect("remove");
    }

    #[tokio::test]
    async fn create_with_erase_drops_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out");
        create_dir_all(&target, false).await.expect("create");
        std::fs::write(target.join("stale.txt"), "old").expect("write");
        assert!(is_non_empty_dir(&target).await);

        create_dir_all(&target, true).await.expect("recreate");
        assert!(target.is_dir());
        assert!(!is_non_empty_dir(&target).await);
    }

    #[tokio::test]
    async fn missing_directory_is_not_non_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(!is_non_empty_dir(&dir.path().join("absent")).await);
    }
}
