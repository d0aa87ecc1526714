//! Script-to-executable packaging with PyInstaller.
//!
//! # Process
//!
//! 1. Check the script exists (nothing is launched otherwise)
//! 2. Remove previous output and work directories for clean builds
//! 3. Write the transient version resource file
//! 4. Run the packaging tool, advancing progress per output line
//! 5. Delete the version resource file, whatever the outcome

pub mod command;
pub mod version_file;

use crate::bundler::{
    builder::tool_detection,
    environment::RuntimeEnvironment,
    error::{Error, Result},
    process::{ProcessRunner, ProgressSink},
    settings::{BuildSettings, ToolchainConfig},
    utils::fs,
};
use command::{BuildPaths, CommandExtras};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio_util::sync::CancellationToken;

/// Progress reported when the packaging tool starts.
pub const PROGRESS_START: f64 = 0.1;

/// Progress never exceeds this until the tool exits.
pub const PROGRESS_CEILING: f64 = 0.9;

const PROGRESS_PER_LINE: f64 = 0.005;

/// Progress after `lines` output lines: monotonic, saturating at [`PROGRESS_CEILING`].
pub fn progress_for_line(lines: usize) -> f64 {
    (PROGRESS_START + lines as f64 * PROGRESS_PER_LINE).min(PROGRESS_CEILING)
}

/// Result of a successful build.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    /// Expected executable location.
    pub artifact: PathBuf,
    /// Wall-clock duration of the build.
    pub elapsed: Duration,
}

/// Fail with [`Error::Build`] unless the script exists as a file.
pub fn check_script(settings: &BuildSettings) -> Result<()> {
    if settings.script_path.is_file() {
        Ok(())
    } else {
        Err(Error::Build(format!(
            "script not found: {}",
            settings.script_path.display()
        )))
    }
}

/// Converts a script and its settings into an executable.
pub struct BuildStage<'a> {
    config: &'a ToolchainConfig,
    runner: &'a ProcessRunner,
    progress: &'a dyn ProgressSink,
}

impl<'a> BuildStage<'a> {
    /// Stage reporting output to `runner`'s sink and progress to `progress`.
    pub fn new(
        config: &'a ToolchainConfig,
        runner: &'a ProcessRunner,
        progress: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            config,
            runner,
            progress,
        }
    }

    /// Package `settings.script_path` with the environment's packaging tool.
    pub async fn run(
        &self,
        settings: &BuildSettings,
        env: &RuntimeEnvironment,
        cancel: &CancellationToken,
    ) -> Result<BuildOutcome> {
        let started = Instant::now();
        check_script(settings)?;

        let paths = resolve_paths(settings)?;
        let sink = self.runner.log();

        if settings.clean_build {
            sink.write("Cleaning previous build output");
            fs::remove_dir_all(&paths.dist).await?;
            fs::remove_dir_all(&paths.work).await?;
        }
        fs::create_dir_all(&paths.work, false).await?;

        let version_file = version_file::write(settings, &paths.work)?;

        let upx_dir = if settings.compression {
            let found = tool_detection::find_upx_dir(&self.config.upx_program);
            if found.is_none() {
                sink.write("UPX not found on PATH, building without compression");
            }
            found
        } else {
            None
        };

        let tool = env.tool("pyinstaller");
        let extras = CommandExtras {
            version_file: Some(&*version_file),
            upx_dir: upx_dir.as_deref(),
        };
        let command = command::packaging_command(
            &tool,
            settings,
            &paths,
            &extras,
            command::data_separator(),
        );

        sink.write(&format!("Packaging {}", paths.script.display()));
        self.progress.set(PROGRESS_START);

        let progress = self.progress;
        let exit = self
            .runner
            .run_with_progress(&command, cancel, |lines| {
                progress.set(progress_for_line(lines))
            })
            .await;
        self.progress.set(1.0);

        if let Err(e) = version_file.close() {
            log::warn!("Failed to remove version resource file: {e}");
        }

        let code = exit.map_err(|e| match e {
            Error::CommandFailed { command, error } => Error::Build(format!(
                "packaging tool `{command}` could not be started: {error}"
            )),
            other => other,
        })?;

        if code != 0 {
            return Err(Error::Build(format!("packaging tool exited with code {code}")));
        }

        let elapsed = started.elapsed();
        sink.success(&format!("Build completed in {:.1}s", elapsed.as_secs_f64()));

        Ok(BuildOutcome {
            artifact: settings.artifact_in(&paths.dist),
            elapsed,
        })
    }
}

fn resolve_paths(settings: &BuildSettings) -> Result<BuildPaths> {
    Ok(BuildPaths {
        script: fs::absolute(&settings.script_path)?,
        dist: fs::absolute(&settings.output_dir())?,
        work: fs::absolute(&settings.work_dir())?,
        spec: fs::absolute(&settings.working_dir())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_capped() {
        let mut last = 0.0;
        for lines in 0..1_000 {
            let value = progress_for_line(lines);
            assert!(value >= last);
            assert!(value <= PROGRESS_CEILING);
            last = value;
        }
        assert_eq!(progress_for_line(0), PROGRESS_START);
        assert_eq!(progress_for_line(10_000), PROGRESS_CEILING);
    }
}
