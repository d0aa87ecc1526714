//! Windows NSIS installer creation.
//!
//! Wraps the build output directory into a single setup executable.
//!
//! # Module Organization
//!
//! - `template` - NSI script template constant
//! - `toolset` - makensis location and one-shot download
//! - `script` - NSI script generation from the template
//! - `build` - makensis execution
//! - `utils` - version formatting, escaping and BOM output

mod build;
mod script;
mod template;
mod toolset;
mod utils;

pub use build::makensis_command;
pub use script::{ScriptInput, render as render_script};
pub use toolset::ensure_makensis;
pub use utils::format_version_for_nsis;

use super::sign;
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    process::ProcessRunner,
    settings::{BuildSettings, InstallerSettings, SecuritySettings, ToolchainConfig},
    utils::fs,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Result of a successful installer stage.
#[derive(Clone, Debug)]
pub struct InstallerOutcome {
    /// Generated setup executable.
    pub path: PathBuf,
    /// Whether the installer was signed.
    pub signed: bool,
}

/// Builds and optionally signs the setup executable.
pub struct InstallerStage<'a> {
    config: &'a ToolchainConfig,
    runner: &'a ProcessRunner,
}

impl<'a> InstallerStage<'a> {
    /// Stage using `config` for tool locations and `runner` for commands.
    pub fn new(config: &'a ToolchainConfig, runner: &'a ProcessRunner) -> Self {
        Self { config, runner }
    }

    /// Create the installer for the output of a finished build.
    ///
    /// # Process
    ///
    /// 1. Require a non-empty build output directory (before any download)
    /// 2. Acquire makensis
    /// 3. Create the installer output directory
    /// 4. Generate the NSI script in a scratch directory
    /// 5. Compile it and check the installer exists
    /// 6. Sign it when credentials allow, warning otherwise
    pub async fn run(
        &self,
        build: &BuildSettings,
        installer: &InstallerSettings,
        security: &SecuritySettings,
        cancel: &CancellationToken,
    ) -> Result<InstallerOutcome> {
        let source_dir = fs::absolute(&build.output_dir())?;
        if !fs::is_non_empty_dir(&source_dir).await {
            return Err(Error::Installer(format!(
                "build output {} is missing or empty",
                source_dir.display()
            )));
        }

        let sink = self.runner.log();
        let makensis = toolset::ensure_makensis(self.config, &**sink, cancel).await?;

        let app_name = installer.app_name(build.exe_name());
        let output_dir = fs::absolute(&installer.output_dir())?;
        fs::create_dir_all(&output_dir, false).await?;
        let installer_path = output_dir.join(installer.installer_file_name(app_name));

        let artifact = build.artifact_in(&source_dir);
        let main_exe = main_exe_in_bundle(&artifact, &source_dir);

        let input = ScriptInput {
            app_name,
            company_name: &build.branding.company_name,
            copyright: &build.branding.copyright,
            version: installer.version(),
            output_file: &installer_path,
            source_dir: &source_dir,
            main_exe: &main_exe,
            desktop_shortcut: installer.desktop_shortcut,
            start_menu_shortcut: installer.start_menu_shortcut,
        };

        let scratch = tempfile::Builder::new()
            .prefix("nsis_")
            .tempdir()
            .fs_context("creating NSIS scratch directory", std::env::temp_dir())?;
        let nsi_path = script::generate_nsi_script(&input, scratch.path()).await?;

        sink.write(&format!("Compiling installer {}", installer_path.display()));
        build::run_makensis(self.runner, &makensis, &nsi_path, cancel).await?;

        if !installer_path.is_file() {
            return Err(Error::Installer(format!(
                "makensis succeeded but {} was not created",
                installer_path.display()
            )));
        }
        sink.success(&format!("Installer created: {}", installer_path.display()));

        let signed = match sign::sign_file(
            self.runner,
            security,
            &self.config.signing_timestamp_url,
            &installer_path,
            cancel,
        )
        .await
        {
            Ok(()) => {
                sink.success("Installer signed");
                true
            }
            Err(warning) => {
                sink.warning(&warning.to_string());
                false
            }
        };

        Ok(InstallerOutcome {
            path: installer_path,
            signed,
        })
    }
}

// Executable path inside the install directory, used for shortcuts.
fn main_exe_in_bundle(artifact: &Path, source_dir: &Path) -> PathBuf {
    match artifact.strip_prefix(source_dir) {
        Ok(relative) => {
            // installed executables always carry the Windows extension
            if relative.extension().is_none() {
                relative.with_extension("exe")
            } else {
                relative.to_path_buf()
            }
        }
        Err(_) => PathBuf::from(artifact.file_name().unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_target_is_relative_with_exe_extension() {
        let dist = Path::new("/work/dist");
        assert_eq!(
            main_exe_in_bundle(Path::new("/work/dist/Hello"), dist),
            PathBuf::from("Hello.exe")
        );
        assert_eq!(
            main_exe_in_bundle(Path::new("/work/dist/Hello/Hello.exe"), dist),
            PathBuf::from("Hello/Hello.exe")
        );
    }
}
