//! Artifact checksum calculation.
//!
//! One-file builds produce a single executable, one-folder builds a directory
//! tree. Both are reduced to one SHA-256 digest for the run report.

use crate::bundler::{
    Result,
    error::{Error, ErrorExt},
};
use sha2::{Digest, Sha256};
use std::{fs::File, io, path::Path};

/// Calculates SHA256 checksum of a file or directory.
///
/// Directories are hashed file by file in sorted path order, feeding each
/// relative path before its content, so the digest is stable across runs.
pub async fn artifact_sha256(path: &Path) -> Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<String> {
        let metadata = std::fs::metadata(&path).fs_context("reading artifact metadata", &path)?;
        if metadata.is_file() {
            let mut hasher = Sha256::new();
            hash_file(&path, &mut hasher)?;
            Ok(hex::encode(hasher.finalize()))
        } else if metadata.is_dir() {
            directory_sha256(&path)
        } else {
            Err(Error::GenericError(format!(
                "{} is neither a file nor a directory",
                path.display()
            )))
        }
    })
    .await
    .map_err(|e| Error::GenericError(format!("checksum task failed: {e}")))?
}

fn hash_file(path: &Path, hasher: &mut Sha256) -> Result<()> {
    let mut file = File::open(path).fs_context("opening file for hashing", path)?;
    io::copy(&mut file, hasher).fs_context("reading file for hash calculation", path)?;
    Ok(())
}

fn directory_sha256(dir: &Path) -> Result<String> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }
    entries.sort();

    let mut hasher = Sha256::new();
    for path in entries {
        if let Ok(rel_path) = path.strip_prefix(dir) {
            hasher.update(rel_path.to_string_lossy().as_bytes());
        }
        hash_file(&path, &mut hasher)?;
    }

    Ok(hex::encode(hasher.finalize()))
}
