//! Builder for constructing [`BuildSettings`].

use super::{Branding, BuildSettings, DataPath};
use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Fluent construction of [`BuildSettings`].
///
/// # Examples
///
/// ```no_run
/// use pyexe_bundler::bundler::{BuildSettingsBuilder, DataPath};
///
/// # fn example() -> pyexe_bundler::bundler::Result<()> {
/// let settings = BuildSettingsBuilder::new()
///     .script_path("app.py")
///     .exe_name("Hello")
///     .windowed(true)
///     .hidden_import("pkg_resources.py2_warn")
///     .data_path(DataPath::directory("assets"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BuildSettingsBuilder {
    settings: BuildSettings,
    script_set: bool,
}

impl BuildSettingsBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the script to package.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn script_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.script_path = path.as_ref().to_path_buf();
        self.script_set = true;
        self
    }

    /// Sets the executable name.
    pub fn exe_name(mut self, name: impl Into<String>) -> Self {
        self.settings.exe_name = name.into();
        self
    }

    /// Sets the distribution directory.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.output_dir = path.as_ref().to_path_buf();
        self
    }

    /// Sets the directory the packaging tool runs in.
    pub fn working_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.settings.working_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// One-file (true) or one-folder (false) output.
    pub fn one_file(mut self, one_file: bool) -> Self {
        self.settings.one_file = one_file;
        self
    }

    /// Windowed (true) or console (false) executable.
    pub fn windowed(mut self, windowed: bool) -> Self {
        self.settings.windowed = windowed;
        self
    }

    /// Sets the executable icon.
    pub fn icon(mut self, icon: Option<PathBuf>) -> Self {
        self.settings.icon = icon;
        self
    }

    /// Clean previous output before building.
    pub fn clean_build(mut self, clean: bool) -> Self {
        self.settings.clean_build = clean;
        self
    }

    /// Compress with UPX when available.
    pub fn compression(mut self, compression: bool) -> Self {
        self.settings.compression = compression;
        self
    }

    /// Appends a hidden import.
    pub fn hidden_import(mut self, module: impl Into<String>) -> Self {
        self.settings.hidden_imports.push(module.into());
        self
    }

    /// Appends an excluded module.
    pub fn exclude_module(mut self, module: impl Into<String>) -> Self {
        self.settings.excluded_modules.push(module.into());
        self
    }

    /// Appends an additional data path.
    pub fn data_path(mut self, data: DataPath) -> Self {
        self.settings.data_paths.push(data);
        self
    }

    /// Sets version resource metadata.
    pub fn branding(mut self, branding: Branding) -> Self {
        self.settings.branding = branding;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if no script path was set.
    pub fn build(self) -> Result<BuildSettings> {
        if !self.script_set || self.settings.script_path.as_os_str().is_empty() {
            return Err(Error::Config("script_path is required".into()));
        }
        Ok(self.settings)
    }
}
