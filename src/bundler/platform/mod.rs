//! Platform-specific installer generation.
//!
//! The installer format is Windows-only, but makensis and signing tools can
//! be driven from any host.

pub mod windows;
