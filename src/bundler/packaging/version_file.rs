//! Windows version resource descriptor consumed by `--version-file`.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::BuildSettings,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::{io::Write, path::Path};
use tempfile::TempPath;

const VERSION_TEMPLATE: &str = r#"# UTF-8
#
# Version resource for {{original_filename}}
VSVersionInfo(
  ffi=FixedFileInfo(
    filevers=({{file_version_tuple}}),
    prodvers=({{product_version_tuple}}),
    mask=0x3f,
    flags=0x0,
    OS=0x40004,
    fileType=0x1,
    subtype=0x0,
    date=(0, 0)
    ),
  kids=[
    StringFileInfo(
      [
      StringTable(
        u'040904B0',
        [StringStruct(u'CompanyName', u'{{company_name}}'),
        StringStruct(u'FileDescription', u'{{file_description}}'),
        StringStruct(u'FileVersion', u'{{file_version}}'),
        StringStruct(u'InternalName', u'{{internal_name}}'),
        StringStruct(u'LegalCopyright', u'{{copyright}}'),
        StringStruct(u'OriginalFilename', u'{{original_filename}}'),
        StringStruct(u'ProductName', u'{{product_name}}'),
        StringStruct(u'ProductVersion', u'{{product_version}}')])
      ]),
    VarFileInfo([VarStruct(u'Translation', [1033, 1200])])
  ]
)
"#;

/// Four numeric components of a dotted version.
///
/// Missing components are zero, extra components are dropped and
/// non-numeric components (`1.2.0-beta`) keep their leading digits.
pub fn version_tuple(version: &str) -> [u16; 4] {
    let mut parts = [0u16; 4];
    for (slot, part) in parts.iter_mut().zip(version.trim().split('.')) {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        *slot = digits.parse().unwrap_or(0);
    }
    parts
}

fn dotted(parts: [u16; 4]) -> String {
    format!("{}.{}.{}.{}", parts[0], parts[1], parts[2], parts[3])
}

fn tuple_literal(parts: [u16; 4]) -> String {
    format!("{}, {}, {}, {}", parts[0], parts[1], parts[2], parts[3])
}

// Values end up inside Python u'' literals.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Serialize)]
struct VersionData {
    file_version_tuple: String,
    product_version_tuple: String,
    company_name: String,
    file_description: String,
    file_version: String,
    internal_name: String,
    copyright: String,
    original_filename: String,
    product_name: String,
    product_version: String,
}

/// Render the descriptor for `settings`.
pub fn render(settings: &BuildSettings) -> Result<String> {
    let branding = &settings.branding;
    let exe_name = settings.exe_name();
    let file_version = version_tuple(&branding.file_version);
    let product_version = version_tuple(&branding.product_version);

    let or_exe = |value: &str| {
        if value.trim().is_empty() {
            quote(exe_name)
        } else {
            quote(value)
        }
    };

    let data = VersionData {
        file_version_tuple: tuple_literal(file_version),
        product_version_tuple: tuple_literal(product_version),
        company_name: quote(&branding.company_name),
        file_description: or_exe(&branding.file_description),
        file_version: dotted(file_version),
        internal_name: quote(exe_name),
        copyright: quote(&branding.copyright),
        original_filename: quote(&format!("{exe_name}.exe")),
        product_name: or_exe(&branding.product_name),
        product_version: dotted(product_version),
    };

    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("version_info", VERSION_TEMPLATE)
        .map_err(|e| Error::GenericError(format!("failed to register version template: {e}")))?;

    Ok(handlebars.render("version_info", &data)?)
}

/// Write the descriptor into `dir`.
///
/// The returned [`TempPath`] deletes the file when dropped, so the file is
/// gone after the build whether the packaging tool succeeded, failed or never
/// started.
pub fn write(settings: &BuildSettings, dir: &Path) -> Result<TempPath> {
    let content = render(settings)?;

    let mut file = tempfile::Builder::new()
        .prefix("version_info_")
        .suffix(".txt")
        .tempfile_in(dir)
        .fs_context("creating version resource file", dir)?;
    file.write_all(content.as_bytes())
        .fs_context("writing version resource file", file.path().to_path_buf())?;
    file.flush()
        .fs_context("writing version resource file", file.path().to_path_buf())?;

    Ok(file.into_temp_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::{Branding, BuildSettingsBuilder};

    #[test]
    fn version_tuple_pads_and_truncates() {
        assert_eq!(version_tuple("1"), [1, 0, 0, 0]);
        assert_eq!(version_tuple("1.2"), [1, 2, 0, 0]);
        assert_eq!(version_tuple("1.2.3"), [1, 2, 3, 0]);
        assert_eq!(version_tuple("1.2.3.4.5"), [1, 2, 3, 4]);
        assert_eq!(version_tuple("2.0.1-beta"), [2, 0, 1, 0]);
        assert_eq!(version_tuple(""), [0, 0, 0, 0]);
    }

    #[test]
    fn descriptor_embeds_branding() {
        let settings = BuildSettingsBuilder::new()
            .script_path("app.py")
            .exe_name("Hello")
            .branding(Branding {
                company_name: "Acme's Tools".into(),
                product_name: "Hello Suite".into(),
                file_description: String::new(),
                file_version: "1.2.3".into(),
                product_version: "4.5".into(),
                copyright: "(c) 2025 Acme".into(),
            })
            .build()
            .expect("settings");

        let text = render(&settings).expect("render");
        assert!(text.contains("filevers=(1, 2, 3, 0)"));
        assert!(text.contains("prodvers=(4, 5, 0, 0)"));
        assert!(text.contains("StringStruct(u'CompanyName', u'Acme\\'s Tools')"));
        assert!(text.contains("StringStruct(u'FileDescription', u'Hello')"));
        assert!(text.contains("StringStruct(u'FileVersion', u'1.2.3.0')"));
        assert!(text.contains("StringStruct(u'OriginalFilename', u'Hello.exe')"));
        assert!(text.contains("StringStruct(u'ProductName', u'Hello Suite')"));
        assert!(text.contains("u'040904B0'"));
        assert!(text.contains("VarStruct(u'Translation', [1033, 1200])"));
    }

    #[test]
    fn written_file_disappears_with_guard() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = BuildSettingsBuilder::new()
            .script_path("app.py")
            .build()
            .expect("settings");

        let guard = write(&settings, dir.path()).expect("write");
        let path = guard.to_path_buf();
        assert!(path.is_file());
        drop(guard);
        assert!(!path.exists());
    }
}
