//! NSIS installer build execution.
//!
//! Compiles NSI scripts into Windows installer executables using makensis.

use crate::bundler::{
    error::{Error, Result},
    process::{CommandSpec, ProcessRunner},
};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Arguments passed to makensis ahead of the script path.
const MAKENSIS_ARGS: &[&str] = &["-V3", "-INPUTCHARSET", "UTF8"];

/// Command compiling `nsi_path` with `makensis`.
pub fn makensis_command(makensis: &Path, nsi_path: &Path) -> CommandSpec {
    let command = CommandSpec::new(makensis).args(MAKENSIS_ARGS).arg(nsi_path);
    match nsi_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => command.current_dir(dir),
        _ => command,
    }
}

/// Run makensis to compile NSI script into installer executable.
///
/// Output is streamed through the runner's sink. The installer path is
/// declared inside the script, so success is judged by the exit code here and
/// by the caller checking the file exists.
pub async fn run_makensis(
    runner: &ProcessRunner,
    makensis: &Path,
    nsi_path: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    log::info!("Running makensis...");

    let command = makensis_command(makensis, nsi_path);
    let code = runner.run(&command, cancel).await.map_err(|e| match e {
        Error::CommandFailed { command, error } => {
            Error::Installer(format!("makensis `{command}` could not be started: {error}"))
        }
        other => other,
    })?;

    if code != 0 {
        return Err(Error::Installer(format!(
            "makensis compilation failed with exit code {code}"
        )));
    }

    Ok(())
}
