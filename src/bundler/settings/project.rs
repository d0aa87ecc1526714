//! Project files bundling all settings of one application.

use super::{BuildSettings, InstallerSettings, SecuritySettings};
use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::path::Path;

/// A saved project: build, installer and signing settings in one TOML file.
///
/// Relative paths inside the file are resolved against the file's directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    /// Packaging settings.
    pub build: BuildSettings,
    /// Installer settings; no installer is produced when absent.
    pub installer: Option<InstallerSettings>,
    /// Signing settings.
    pub security: SecuritySettings,
}

impl ProjectFile {
    /// Read and parse a project file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).fs_context("reading project file", path)?;
        let mut project: Self = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        if let Some(base) = path.parent() {
            project.rebase(base);
        }
        Ok(project)
    }

    fn rebase(&mut self, base: &Path) {
        let rebase = |p: &mut std::path::PathBuf| {
            if !p.as_os_str().is_empty() && p.is_relative() {
                *p = base.join(&*p);
            }
        };

        rebase(&mut self.build.script_path);
        rebase(&mut self.build.output_dir);
        if let Some(dir) = self.build.working_dir.as_mut() {
            rebase(dir);
        }
        if let Some(icon) = self.build.icon.as_mut() {
            rebase(icon);
        }
        for data in &mut self.build.data_paths {
            rebase(&mut data.source);
        }
        if let Some(installer) = self.installer.as_mut() {
            rebase(&mut installer.output_dir);
        }
        if let Some(cert) = self.security.certificate_path.as_mut() {
            rebase(cert);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::DataKind;
    use std::path::PathBuf;

    #[test]
    fn loads_and_rebases_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("project.toml");
        std::fs::write(
            &file,
            r#"
[build]
script_path = "app.py"
exe_name = "Hello"
windowed = true
hidden_imports = ["a", "b"]

[[build.data_paths]]
source = "assets"
kind = "directory"

[installer]
app_name = "Hello World"
version = "1.2.3"
desktop_shortcut = false
"#,
        )
        .expect("write project");

        let project = ProjectFile::load(&file).expect("load project");
        assert_eq!(project.build.script_path, dir.path().join("app.py"));
        assert_eq!(project.build.exe_name(), "Hello");
        assert!(project.build.windowed);
        assert!(project.build.one_file);
        assert!(project.build.clean_build);
        assert_eq!(project.build.hidden_imports, vec!["a", "b"]);
        assert_eq!(project.build.data_paths[0].kind(), DataKind::Directory);
        assert_eq!(project.build.data_paths[0].source, dir.path().join("assets"));

        let installer = project.installer.expect("installer section");
        assert_eq!(installer.version(), "1.2.3");
        assert!(!installer.desktop_shortcut);
        assert!(installer.start_menu_shortcut);
        assert_eq!(project.security.certificate_path, None::<PathBuf>);
    }
}
