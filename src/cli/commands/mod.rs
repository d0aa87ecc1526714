//! Command execution functions for bundler operations.
//!
//! - [`build`] - interactive pipeline run with progress and summary
//! - [`selftest`] - headless end-to-end check with a fixed exit-code contract

pub mod build;
pub mod selftest;

pub use build::execute_build;
pub use selftest::run_self_test;
