//! Command line interface for the bundling pipeline.
//!
//! This module provides argument parsing, command execution, and user
//! feedback for interactive builds and the headless self-test.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::{BarProgress, OutputManager};

use crate::error::{CliError, Result};

/// Main CLI entry point
///
/// Returns the process exit code: 0 when every requested stage succeeded.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let toolchain = args.toolchain_config()?;

    if args.self_test {
        return commands::run_self_test(toolchain, args.with_installer).await;
    }

    let runtime_config = RuntimeConfig::from(&args);
    commands::execute_build(&args, toolchain, &runtime_config).await
}
