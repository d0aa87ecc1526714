//! PyInstaller command construction.

use crate::bundler::{
    process::CommandSpec,
    settings::{BuildSettings, DataPath},
};
use std::path::{Path, PathBuf};

/// Separator between source and destination in `--add-data` for this host.
pub fn data_separator() -> char {
    if cfg!(windows) { ';' } else { ':' }
}

/// `--add-data=SRC<SEP>DEST` for one data path.
pub fn add_data_arg(data: &DataPath, separator: char) -> String {
    format!(
        "--add-data={}{}{}",
        data.source.display(),
        separator,
        data.destination()
    )
}

/// Absolute locations handed to the packaging tool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPaths {
    /// Script to package.
    pub script: PathBuf,
    /// Distribution directory (`--distpath`).
    pub dist: PathBuf,
    /// Transient work directory (`--workpath`).
    pub work: PathBuf,
    /// Directory receiving the generated `.spec` file (`--specpath`).
    pub spec: PathBuf,
}

/// Optional inputs decided at run time.
#[derive(Clone, Debug, Default)]
pub struct CommandExtras<'a> {
    /// Generated version resource file.
    pub version_file: Option<&'a Path>,
    /// Directory containing the UPX binary, when compression is on and UPX was found.
    pub upx_dir: Option<&'a Path>,
}

/// Full packaging command for `settings`.
pub fn packaging_command(
    tool: &Path,
    settings: &BuildSettings,
    paths: &BuildPaths,
    extras: &CommandExtras<'_>,
    separator: char,
) -> CommandSpec {
    let mut command = CommandSpec::new(tool)
        .arg(&paths.script)
        .arg("--name")
        .arg(settings.exe_name())
        .arg("--distpath")
        .arg(&paths.dist)
        .arg("--workpath")
        .arg(&paths.work)
        .arg("--specpath")
        .arg(&paths.spec)
        .arg("--noconfirm");

    if settings.clean_build {
        command = command.arg("--clean");
    }

    command = command.arg(if settings.one_file { "--onefile" } else { "--onedir" });
    command = command.arg(if settings.windowed { "--windowed" } else { "--console" });

    if let Some(icon) = &settings.icon {
        command = command.arg("--icon").arg(icon);
    }

    command = match extras.upx_dir {
        Some(dir) => command.arg("--upx-dir").arg(dir),
        None => command.arg("--noupx"),
    };

    for module in &settings.hidden_imports {
        command = command.arg("--hidden-import").arg(module);
    }
    for module in &settings.excluded_modules {
        command = command.arg("--exclude-module").arg(module);
    }
    for data in &settings.data_paths {
        command = command.arg(add_data_arg(data, separator));
    }

    if let Some(version_file) = extras.version_file {
        command = command.arg("--version-file").arg(version_file);
    }

    command.current_dir(&paths.spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::BuildSettingsBuilder;

    fn paths() -> BuildPaths {
        BuildPaths {
            script: PathBuf::from("/src/app.py"),
            dist: PathBuf::from("/src/dist"),
            work: PathBuf::from("/src/build"),
            spec: PathBuf::from("/src"),
        }
    }

    #[test]
    fn default_console_onefile_command() {
        let settings = BuildSettingsBuilder::new()
            .script_path("/src/app.py")
            .build()
            .expect("settings");
        let command = packaging_command(
            Path::new("pyinstaller"),
            &settings,
            &paths(),
            &CommandExtras::default(),
            ':',
        );

        assert_eq!(
            command.arg_strings(),
            vec![
                "/src/app.py",
                "--name",
                "MyApp",
                "--distpath",
                "/src/dist",
                "--workpath",
                "/src/build",
                "--specpath",
                "/src",
                "--noconfirm",
                "--clean",
                "--onefile",
                "--console",
                "--noupx",
            ]
        );
    }

    #[test]
    fn repeated_flags_keep_configured_order() {
        let settings = BuildSettingsBuilder::new()
            .script_path("/src/app.py")
            .exe_name("Tool")
            .one_file(false)
            .windowed(true)
            .clean_build(false)
            .icon(Some(PathBuf::from("/src/app.ico")))
            .hidden_import("b")
            .hidden_import("a")
            .exclude_module("tkinter")
            .data_path(DataPath::file("/src/config.json"))
            .data_path(DataPath::directory("/src/assets"))
            .build()
            .expect("settings");
        let version = PathBuf::from("/src/build/version_info.txt");
        let upx = PathBuf::from("/opt/upx");
        let extras = CommandExtras {
            version_file: Some(&version),
            upx_dir: Some(&upx),
        };
        let args = packaging_command(Path::new("pyinstaller"), &settings, &paths(), &extras, ';')
            .arg_strings();

        assert!(!args.contains(&"--clean".to_string()));
        assert!(args.contains(&"--onedir".to_string()));
        assert!(args.contains(&"--windowed".to_string()));

        let tail: Vec<&str> = args.iter().skip(10).map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "--onedir",
                "--windowed",
                "--icon",
                "/src/app.ico",
                "--upx-dir",
                "/opt/upx",
                "--hidden-import",
                "b",
                "--hidden-import",
                "a",
                "--exclude-module",
                "tkinter",
                "--add-data=/src/config.json;.",
                "--add-data=/src/assets;assets",
                "--version-file",
                "/src/build/version_info.txt",
            ]
        );
    }

    #[test]
    fn data_arguments_use_destination_rules() {
        let dir = tempfile::tempdir().expect("tempdir");
        let assets = dir.path().join("assets");
        std::fs::create_dir(&assets).expect("mkdir");
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{}").expect("write");

        let dir_arg = add_data_arg(&DataPath::detect(&assets), ':');
        let file_arg = add_data_arg(&DataPath::detect(&config), ':');
        assert_eq!(dir_arg, format!("--add-data={}:assets", assets.display()));
        assert_eq!(file_arg, format!("--add-data={}:.", config.display()));

        let windows = add_data_arg(&DataPath::detect(&assets), ';');
        assert!(windows.ends_with(";assets"));
    }

    #[test]
    fn host_separator_matches_platform() {
        if cfg!(windows) {
            assert_eq!(data_separator(), ';');
        } else {
            assert_eq!(data_separator(), ':');
        }
    }
}
