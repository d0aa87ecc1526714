//! Error types for the command line front end.
//!
//! Library failures arrive as [`crate::bundler::Error`]; everything the CLI
//! adds on top (argument problems, report output) is wrapped here.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Anything that stops the CLI before it can report a pipeline result.
///
/// Stage failures inside a run are not errors at this level; they end up in
/// [`PipelineResult`](crate::bundler::PipelineResult) and the exit code.
#[derive(Error, Debug)]
pub enum BundlerError {
    /// Bad or missing command line arguments
    #[error("{0}")]
    Cli(#[from] CliError),

    /// Terminal, scratch directory or report file I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Run report serialization
    #[error("failed to serialize run report: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration or pipeline setup errors from the library
    #[error(transparent)]
    Bundler(#[from] crate::bundler::Error),

    /// Self-test setup failures, with context
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}
