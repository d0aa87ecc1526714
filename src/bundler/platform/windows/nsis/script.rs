//! NSIS installer script generation.
//!
//! Generates NSI installer scripts from the template using Handlebars.

use super::{template::NSI_TEMPLATE, utils};
use crate::bundler::error::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Everything the installer script needs to know.
#[derive(Clone, Debug)]
pub struct ScriptInput<'a> {
    /// Display name, also the install folder and registry key name.
    pub app_name: &'a str,
    /// Publisher written to the uninstall registry entry.
    pub company_name: &'a str,
    /// Copyright written to the installer's version resource.
    pub copyright: &'a str,
    /// Version string as entered by the user.
    pub version: &'a str,
    /// Installer executable to produce.
    pub output_file: &'a Path,
    /// Build output tree copied into the install directory.
    pub source_dir: &'a Path,
    /// Main executable, relative to `source_dir`.
    pub main_exe: &'a Path,
    /// Create a desktop shortcut.
    pub desktop_shortcut: bool,
    /// Create a start menu folder with shortcuts.
    pub start_menu_shortcut: bool,
}

#[derive(Serialize)]
struct NsiData {
    app_name: String,
    company_name: String,
    copyright: String,
    version: String,
    version_nsis: String,
    output_file: String,
    install_dir: String,
    uninstall_key: String,
    source_glob: String,
    main_exe: String,
    desktop_shortcut: bool,
    start_menu_shortcut: bool,
}

impl NsiData {
    fn new(input: &ScriptInput<'_>) -> Self {
        let app_name = utils::escape_nsis(input.app_name);
        // Install paths are Windows paths regardless of the build host.
        let main_exe = utils::escape_nsis(&input.main_exe.display().to_string().replace('/', "\\"));

        Self {
            install_dir: format!("$PROGRAMFILES64\\{app_name}"),
            uninstall_key: format!(
                "Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\{app_name}"
            ),
            main_exe: format!("$INSTDIR\\{main_exe}"),
            company_name: utils::escape_nsis(input.company_name),
            copyright: utils::escape_nsis(input.copyright),
            version: utils::escape_nsis(input.version),
            version_nsis: utils::format_version_for_nsis(input.version),
            output_file: utils::nsis_path(input.output_file),
            source_glob: utils::nsis_path(&input.source_dir.join("*")),
            desktop_shortcut: input.desktop_shortcut,
            start_menu_shortcut: input.start_menu_shortcut,
            app_name,
        }
    }
}

/// Render the installer script.
pub fn render(input: &ScriptInput<'_>) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("installer.nsi", NSI_TEMPLATE)
        .map_err(|e| Error::GenericError(format!("failed to register NSI template: {}", e)))?;

    Ok(handlebars.render("installer.nsi", &NsiData::new(input))?)
}

/// Render the installer script and write it to `output_dir/installer.nsi`.
///
/// Writes output with UTF-8 BOM required by NSIS.
pub async fn generate_nsi_script(input: &ScriptInput<'_>, output_dir: &Path) -> Result<PathBuf> {
    let content = render(input)?;
    let nsi_path = output_dir.join("installer.nsi");
    utils::write_utf8_bom(&nsi_path, &content).await?;
    log::debug!("Wrote NSI script to {}", nsi_path.display());
    Ok(nsi_path)
}
