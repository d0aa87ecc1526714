//! Installer generation settings.

use serde::Deserialize;
use std::path::PathBuf;

/// Directory receiving installers when none is configured.
pub const DEFAULT_INSTALLER_DIR: &str = "./installer";

/// Settings consumed by the installer stage.
///
/// Requires a build that already produced a non-empty output directory.
///
/// # Configuration
///
/// ```toml
/// [installer]
/// app_name = "Hello"
/// version = "1.2.0"
/// desktop_shortcut = true
/// start_menu_shortcut = true
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Display name shown in the installer and in Add/Remove Programs.
    pub app_name: String,

    /// Version string shown in the installer.
    pub version: String,

    /// Directory receiving the installer executable.
    pub output_dir: PathBuf,

    /// Create a desktop shortcut.
    pub desktop_shortcut: bool,

    /// Create a start menu entry.
    pub start_menu_shortcut: bool,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            app_name: String::new(),
            version: "1.0.0".to_string(),
            output_dir: PathBuf::new(),
            desktop_shortcut: true,
            start_menu_shortcut: true,
        }
    }
}

impl InstallerSettings {
    /// Display name, falling back to `fallback` (usually the executable name).
    pub fn app_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        let name = self.app_name.trim();
        if name.is_empty() { fallback } else { name }
    }

    /// Version string, falling back to `1.0.0`.
    pub fn version(&self) -> &str {
        let version = self.version.trim();
        if version.is_empty() { "1.0.0" } else { version }
    }

    /// Output directory, falling back to [`DEFAULT_INSTALLER_DIR`].
    pub fn output_dir(&self) -> PathBuf {
        if self.output_dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_INSTALLER_DIR)
        } else {
            self.output_dir.clone()
        }
    }

    /// Installer file name for the given display name.
    pub fn installer_file_name(&self, app_name: &str) -> String {
        format!("{}_{}-setup.exe", sanitize_file_stem(app_name), self.version())
    }
}

/// Replace characters Windows forbids in file names.
fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installer_name_combines_app_and_version() {
        let settings = InstallerSettings {
            version: "2.1.0".into(),
            ..Default::default()
        };
        assert_eq!(
            settings.installer_file_name("My App"),
            "My_App_2.1.0-setup.exe"
        );
    }

    #[test]
    fn empty_fields_fall_back() {
        let settings = InstallerSettings {
            version: " ".into(),
            ..Default::default()
        };
        assert_eq!(settings.app_name("Hello"), "Hello");
        assert_eq!(settings.version(), "1.0.0");
        assert_eq!(settings.output_dir(), PathBuf::from(DEFAULT_INSTALLER_DIR));
    }
}
