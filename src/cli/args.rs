//! Command line argument parsing and validation.
//!
//! Settings come from an optional project file and are then overridden by
//! individual flags, so a saved project can be rebuilt with small tweaks.

use crate::bundler::{
    DataPath, InstallerSettings, PipelineRequest, ProjectFile, ToolchainConfig,
};
use crate::error::{CliError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Package a Python script into a Windows executable and installer
#[derive(Parser, Debug)]
#[command(
    name = "pyexe_bundler",
    version,
    about = "Package a Python script into a Windows executable and installer",
    long_about = "Packages a Python script with PyInstaller inside an isolated environment, \
then optionally wraps the result in an NSIS installer and signs it.

Usage:
  pyexe_bundler app.py --name Hello --windowed
  pyexe_bundler --project hello.toml --installer
  pyexe_bundler --self-test

Exit code 0 = every requested stage succeeded."
)]
pub struct Args {
    /// Python script to package
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Toolchain configuration (TOML)
    #[arg(long, env = "PYEXE_TOOLCHAIN", value_name = "TOML")]
    pub toolchain: Option<PathBuf>,

    /// Project file with [build], [installer] and [security] tables
    #[arg(short = 'p', long, value_name = "TOML")]
    pub project: Option<PathBuf>,

    /// Run the pipeline against a generated hello-world script and exit 0/1
    #[arg(long, conflicts_with_all = ["script", "project"])]
    pub self_test: bool,

    /// Also build an installer during --self-test
    #[arg(long, requires = "self_test")]
    pub with_installer: bool,

    /// Executable name (default: MyApp)
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: Option<String>,

    /// Distribution directory (default: ./dist)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory the packaging tool runs in (default: the script's directory)
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Build a folder instead of a single executable
    #[arg(long)]
    pub onedir: bool,

    /// Build a GUI executable without a console window
    #[arg(short = 'w', long)]
    pub windowed: bool,

    /// Icon embedded into the executable
    #[arg(long, value_name = "ICO")]
    pub icon: Option<PathBuf>,

    /// Keep previous build output
    #[arg(long)]
    pub no_clean: bool,

    /// Compress with UPX when it is on PATH
    #[arg(long)]
    pub upx: bool,

    /// Module to include explicitly (repeatable)
    #[arg(long = "hidden-import", value_name = "MODULE")]
    pub hidden_imports: Vec<String>,

    /// Module to leave out (repeatable)
    #[arg(long = "exclude-module", value_name = "MODULE")]
    pub excluded_modules: Vec<String>,

    /// File or directory to bundle (repeatable)
    #[arg(long = "add-data", value_name = "PATH")]
    pub data_paths: Vec<PathBuf>,

    /// Company name for the version resource
    #[arg(long, value_name = "NAME")]
    pub company: Option<String>,

    /// Product name for the version resource
    #[arg(long, value_name = "NAME")]
    pub product_name: Option<String>,

    /// File description for the version resource
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// File and product version, e.g. 1.2.0.0
    #[arg(long, value_name = "VERSION")]
    pub file_version: Option<String>,

    /// Copyright notice for the version resource
    #[arg(long, value_name = "TEXT")]
    pub copyright: Option<String>,

    /// Build an NSIS installer after the executable
    #[arg(long)]
    pub installer: bool,

    /// Installer display name (default: the executable name)
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Installer version (default: 1.0.0)
    #[arg(long, value_name = "VERSION")]
    pub app_version: Option<String>,

    /// Installer output directory (default: ./installer)
    #[arg(long, value_name = "DIR")]
    pub installer_dir: Option<PathBuf>,

    /// Do not create a desktop shortcut
    #[arg(long)]
    pub no_desktop_shortcut: bool,

    /// Do not create start menu entries
    #[arg(long)]
    pub no_start_menu: bool,

    /// Signing tool (signtool.exe)
    #[arg(long, value_name = "PATH")]
    pub signtool: Option<PathBuf>,

    /// PKCS#12 certificate used for signing
    #[arg(long, value_name = "PFX")]
    pub certificate: Option<PathBuf>,

    /// Certificate password
    #[arg(long, env = "PYEXE_CERT_PASSWORD", hide_env_values = true, value_name = "PASSWORD")]
    pub certificate_password: Option<String>,

    /// Re-check the runtime environment even if it looks valid
    #[arg(long)]
    pub revalidate: bool,

    /// Write a JSON run report
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print failures
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.self_test {
            return Ok(());
        }

        if self.script.is_none() && self.project.is_none() {
            return Err("a SCRIPT or --project is required".to_string());
        }

        let installer_flags = self.app_name.is_some()
            || self.app_version.is_some()
            || self.installer_dir.is_some()
            || self.no_desktop_shortcut
            || self.no_start_menu;
        if installer_flags && !self.installer && self.project.is_none() {
            return Err("installer options require --installer".to_string());
        }

        Ok(())
    }

    /// Toolchain from `--toolchain`, or the defaults.
    pub fn toolchain_config(&self) -> Result<ToolchainConfig> {
        let config = match &self.toolchain {
            Some(path) => ToolchainConfig::from_file(path)?,
            None => ToolchainConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Pipeline request from the project file with flag overrides applied.
    pub fn pipeline_request(&self) -> Result<PipelineRequest> {
        let mut request = match &self.project {
            Some(path) => {
                let project = ProjectFile::load(path)?;
                PipelineRequest {
                    build: project.build,
                    installer: project.installer,
                    security: project.security,
                    force_environment: false,
                }
            }
            None => PipelineRequest::default(),
        };

        let build = &mut request.build;
        if let Some(script) = &self.script {
            build.script_path = script.clone();
        }
        if let Some(name) = &self.name {
            build.exe_name = name.clone();
        }
        if let Some(dir) = &self.output_dir {
            build.output_dir = dir.clone();
        }
        if let Some(dir) = &self.workdir {
            build.working_dir = Some(dir.clone());
        }
        if self.onedir {
            build.one_file = false;
        }
        if self.windowed {
            build.windowed = true;
        }
        if self.icon.is_some() {
            build.icon = self.icon.clone();
        }
        if self.no_clean {
            build.clean_build = false;
        }
        if self.upx {
            build.compression = true;
        }
        build.hidden_imports.extend(self.hidden_imports.iter().cloned());
        build.excluded_modules.extend(self.excluded_modules.iter().cloned());
        build
            .data_paths
            .extend(self.data_paths.iter().map(|p| DataPath::detect(p.clone())));

        let branding = &mut build.branding;
        if let Some(company) = &self.company {
            branding.company_name = company.clone();
        }
        if let Some(product) = &self.product_name {
            branding.product_name = product.clone();
        }
        if let Some(description) = &self.description {
            branding.file_description = description.clone();
        }
        if let Some(version) = &self.file_version {
            branding.file_version = version.clone();
            branding.product_version = version.clone();
        }
        if let Some(copyright) = &self.copyright {
            branding.copyright = copyright.clone();
        }

        if build.script_path.as_os_str().is_empty() {
            return Err(CliError::MissingArgument {
                argument: "SCRIPT".to_string(),
            }
            .into());
        }

        if self.installer && request.installer.is_none() {
            request.installer = Some(InstallerSettings::default());
        }
        if let Some(installer) = request.installer.as_mut() {
            if let Some(name) = &self.app_name {
                installer.app_name = name.clone();
            }
            if let Some(version) = &self.app_version {
                installer.version = version.clone();
            }
            if let Some(dir) = &self.installer_dir {
                installer.output_dir = dir.clone();
            }
            if self.no_desktop_shortcut {
                installer.desktop_shortcut = false;
            }
            if self.no_start_menu {
                installer.start_menu_shortcut = false;
            }
        }

        let security = &mut request.security;
        if self.signtool.is_some() {
            security.signtool_path = self.signtool.clone();
        }
        if self.certificate.is_some() {
            security.certificate_path = self.certificate.clone();
        }
        if self.certificate_password.is_some() {
            security.certificate_password = self.certificate_password.clone();
        }

        request.force_environment = self.revalidate;
        Ok(request)
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print an error message, even in quiet mode
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
