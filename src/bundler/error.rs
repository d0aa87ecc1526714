//! Error types for the bundling pipeline.
//!
//! Every stage reports failures through [`Error`]. The orchestrator turns them
//! into a logged line plus a `false` completion value, so none of these cross
//! the worker boundary.

use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

/// Result alias used throughout the bundler.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by pipeline stages.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Runtime environment creation or package installation failed.
    #[error("environment error: {0}")]
    Environment(String),

    /// Packaging tool failed or its inputs could not be prepared.
    #[error("build error: {0}")]
    Build(String),

    /// Installer compiler acquisition or compilation failed.
    #[error("installer error: {0}")]
    Installer(String),

    /// External command could not be started.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Command line that failed to start
        command: String,
        /// Underlying spawn error
        error: std::io::Error,
    },

    /// Filesystem operation failed on a known path.
    #[error("{context} ({}): {error}", path.display())]
    Fs {
        /// What was being attempted
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        error: std::io::Error,
    },

    /// The running task was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// A stage did not finish within its time limit.
    #[error("{task} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// Task that was waited on
        task: String,
        /// Limit that elapsed
        timeout: std::time::Duration,
    },

    /// Tool download failed.
    #[error("download of {url} failed: {reason}")]
    Download {
        /// URL that was requested
        url: String,
        /// Failure description
        reason: String,
    },

    /// Toolchain or project configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Plain IO error without path context.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Archive extraction error.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// Template rendering error.
    #[error(transparent)]
    Template(#[from] handlebars::RenderError),

    /// Directory traversal error.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

/// Attach a path and a description to IO failures.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}
