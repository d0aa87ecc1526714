//! Python script to Windows executable and installer bundler.
//!
//! This library drives external tools to:
//! - maintain an isolated Python environment with the packaging toolchain
//! - package a script into an executable with PyInstaller
//! - wrap the executable into an NSIS installer and sign it
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
