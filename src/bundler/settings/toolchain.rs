//! Toolchain locations shared by every stage.

use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// NSIS release downloaded when `makensis` is missing.
pub const DEFAULT_NSIS_VERSION: &str = "3.09";

/// Timestamp authority used when signing.
pub const DEFAULT_TIMESTAMP_URL: &str = "http://timestamp.digicert.com";

/// Packages the runtime environment must contain.
pub const DEFAULT_REQUIRED_PACKAGES: &[&str] = &[
    "pyinstaller",
    "pyinstaller-versionfile",
    "pillow",
    "requests",
    "cryptography",
    "pefile",
    "pipdeptree",
];

/// Immutable description of the external tools the pipeline drives.
///
/// Built once and handed to the [`Pipeline`](crate::bundler::Pipeline); nothing
/// in the crate reads tool paths or URLs from global state.
///
/// # Configuration
///
/// Every field is optional in TOML:
///
/// ```toml
/// environment_root = "C:/Users/me/.pyexe/venv"
/// base_interpreter = "py"
/// required_packages = ["pyinstaller", "pillow"]
/// nsis_version = "3.09"
/// tools_dir = "C:/Users/me/.pyexe/tools"
/// build_timeout_secs = 600
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Root directory of the isolated runtime environment.
    pub environment_root: PathBuf,

    /// System interpreter used to create the environment (`-m venv`).
    pub base_interpreter: PathBuf,

    /// Package names the environment must provide. Versionless.
    pub required_packages: Vec<String>,

    /// NSIS release to download.
    pub nsis_version: String,

    /// Archive URL for the NSIS release.
    ///
    /// Default: the SourceForge zip for [`Self::nsis_version`]
    pub nsis_url: Option<String>,

    /// Directory the NSIS archive is extracted into.
    pub tools_dir: PathBuf,

    /// Explicit `makensis` location, bypassing the tools directory layout.
    pub makensis_path: Option<PathBuf>,

    /// Timestamp authority passed to the signing tool.
    pub signing_timestamp_url: String,

    /// Program name or path of the UPX compressor.
    pub upx_program: String,

    /// Seconds the headless caller waits for environment validation.
    pub environment_timeout_secs: u64,

    /// Seconds the headless caller waits for a build.
    pub build_timeout_secs: u64,

    /// Seconds the headless caller waits for installer generation.
    pub installer_timeout_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("pyexe_bundler");

        Self {
            environment_root: data_dir.join("venv"),
            base_interpreter: PathBuf::from(if cfg!(windows) { "python" } else { "python3" }),
            required_packages: DEFAULT_REQUIRED_PACKAGES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            nsis_version: DEFAULT_NSIS_VERSION.to_string(),
            nsis_url: None,
            tools_dir: data_dir.join("tools"),
            makensis_path: None,
            signing_timestamp_url: DEFAULT_TIMESTAMP_URL.to_string(),
            upx_program: "upx".to_string(),
            environment_timeout_secs: 300,
            build_timeout_secs: 300,
            installer_timeout_secs: 120,
        }
    }
}

impl ToolchainConfig {
    /// Load a configuration file, filling unspecified fields with defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).fs_context("reading toolchain config", path)?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check URLs and required values.
    pub fn validate(&self) -> Result<()> {
        if self.environment_root.as_os_str().is_empty() {
            return Err(Error::Config("environment_root must not be empty".into()));
        }
        url::Url::parse(&self.nsis_url())
            .map_err(|e| Error::Config(format!("nsis_url: {e}")))?;
        url::Url::parse(&self.signing_timestamp_url)
            .map_err(|e| Error::Config(format!("signing_timestamp_url: {e}")))?;
        Ok(())
    }

    /// Archive URL for the configured NSIS release.
    pub fn nsis_url(&self) -> String {
        self.nsis_url.clone().unwrap_or_else(|| {
            format!(
                "https://downloads.sourceforge.net/project/nsis/NSIS%203/{0}/nsis-{0}.zip",
                self.nsis_version
            )
        })
    }

    /// Where `makensis` is expected after extraction.
    pub fn makensis_path(&self) -> PathBuf {
        if let Some(path) = &self.makensis_path {
            return path.clone();
        }
        let binary = if cfg!(windows) { "makensis.exe" } else { "makensis" };
        self.tools_dir
            .join(format!("nsis-{}", self.nsis_version))
            .join(binary)
    }

    /// Timeout for environment validation.
    pub fn environment_timeout(&self) -> Duration {
        Duration::from_secs(self.environment_timeout_secs)
    }

    /// Timeout for a build.
    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Timeout for installer generation.
    pub fn installer_timeout(&self) -> Duration {
        Duration::from_secs(self.installer_timeout_secs)
    }
}
