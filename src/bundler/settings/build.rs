//! Packaging settings for a single build run.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Executable name used when none is configured.
pub const DEFAULT_EXE_NAME: &str = "MyApp";

/// Distribution directory used when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "./dist";

/// Settings consumed by the build stage.
///
/// Immutable for the duration of a run. Empty `exe_name` and `output_dir`
/// fall back to [`DEFAULT_EXE_NAME`] and [`DEFAULT_OUTPUT_DIR`] through the
/// accessor methods, so callers should prefer those over the raw fields.
///
/// # Configuration
///
/// ```toml
/// [build]
/// script_path = "app.py"
/// exe_name = "Hello"
/// one_file = true
/// windowed = false
/// hidden_imports = ["pkg_resources.py2_warn"]
///
/// [[build.data_paths]]
/// source = "assets"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Script handed to the packaging tool.
    pub script_path: PathBuf,

    /// Name of the produced executable, without extension.
    pub exe_name: String,

    /// Distribution directory receiving the artifact.
    pub output_dir: PathBuf,

    /// Directory the packaging tool runs in.
    ///
    /// Default: the script's parent directory
    pub working_dir: Option<PathBuf>,

    /// Produce a single self-extracting executable instead of a folder.
    pub one_file: bool,

    /// Build a GUI executable without a console window.
    pub windowed: bool,

    /// Icon embedded into the executable.
    pub icon: Option<PathBuf>,

    /// Remove previous output and work directories before building.
    pub clean_build: bool,

    /// Compress binaries with UPX when it can be found on `PATH`.
    pub compression: bool,

    /// Modules the packaging tool cannot discover on its own, in order.
    pub hidden_imports: Vec<String>,

    /// Modules to leave out of the bundle, in order.
    pub excluded_modules: Vec<String>,

    /// Extra files and directories bundled next to the program.
    pub data_paths: Vec<DataPath>,

    /// Version resource metadata.
    pub branding: Branding,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            script_path: PathBuf::new(),
            exe_name: String::new(),
            output_dir: PathBuf::new(),
            working_dir: None,
            one_file: true,
            windowed: false,
            icon: None,
            clean_build: true,
            compression: false,
            hidden_imports: Vec::new(),
            excluded_modules: Vec::new(),
            data_paths: Vec::new(),
            branding: Branding::default(),
        }
    }
}

impl BuildSettings {
    /// Executable name, falling back to [`DEFAULT_EXE_NAME`].
    pub fn exe_name(&self) -> &str {
        let name = self.exe_name.trim();
        if name.is_empty() { DEFAULT_EXE_NAME } else { name }
    }

    /// Distribution directory, falling back to [`DEFAULT_OUTPUT_DIR`].
    pub fn output_dir(&self) -> PathBuf {
        if self.output_dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        } else {
            self.output_dir.clone()
        }
    }

    /// Directory the packaging tool runs in.
    pub fn working_dir(&self) -> PathBuf {
        match &self.working_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => self
                .script_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// Transient work directory used by the packaging tool.
    pub fn work_dir(&self) -> PathBuf {
        self.working_dir().join("build")
    }

    /// Where the executable is expected once the build succeeds.
    ///
    /// One-file builds land directly in the output directory, one-folder
    /// builds inside a directory named after the executable.
    pub fn artifact_path(&self) -> PathBuf {
        self.artifact_in(&self.output_dir())
    }

    /// Executable location inside an explicit distribution directory.
    pub fn artifact_in(&self, dist: &Path) -> PathBuf {
        let file_name = if cfg!(windows) {
            format!("{}.exe", self.exe_name())
        } else {
            self.exe_name().to_string()
        };

        if self.one_file {
            dist.join(file_name)
        } else {
            dist.join(self.exe_name()).join(file_name)
        }
    }
}

/// Kind of an additional data path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    /// Single file, bundled at the bundle root.
    File,
    /// Directory, bundled under its own base name.
    Directory,
}

/// Additional file or directory bundled with the executable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataPath {
    /// Path on disk.
    pub source: PathBuf,

    /// Explicit kind; probed from the filesystem when absent.
    #[serde(default)]
    pub kind: Option<DataKind>,
}

impl DataPath {
    /// A data file.
    pub fn file(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind: Some(DataKind::File),
        }
    }

    /// A data directory.
    pub fn directory(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind: Some(DataKind::Directory),
        }
    }

    /// A data path whose kind is probed from the filesystem when needed.
    pub fn detect(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            kind: None,
        }
    }

    /// Resolved kind.
    pub fn kind(&self) -> DataKind {
        match self.kind {
            Some(kind) => kind,
            None if self.source.is_dir() => DataKind::Directory,
            None => DataKind::File,
        }
    }

    /// Destination inside the bundle: `.` for files, the base name for directories.
    pub fn destination(&self) -> String {
        match self.kind() {
            DataKind::File => ".".to_string(),
            DataKind::Directory => self
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| ".".to_string()),
        }
    }
}

/// Metadata written into the executable's version resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Publisher shown in file properties.
    pub company_name: String,
    /// Product name shown in file properties.
    pub product_name: String,
    /// One-line description of the executable.
    pub file_description: String,
    /// Dot-separated file version, e.g. `1.2.0.0`.
    pub file_version: String,
    /// Dot-separated product version.
    pub product_version: String,
    /// Copyright notice.
    pub copyright: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            product_name: String::new(),
            file_description: String::new(),
            file_version: "1.0.0.0".to_string(),
            product_version: "1.0.0.0".to_string(),
            copyright: String::new(),
        }
    }
}
