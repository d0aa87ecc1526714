#![cfg(unix)]

mod common;

use assert_cmd::Command;
use common::FakeTools;
use predicates::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

fn write_toolchain(
    tools: &FakeTools,
    base_interpreter: &Path,
    makensis: Option<&Path>,
) -> PathBuf {
    let config = tools.config();
    let mut text = format!(
        "environment_root = '{}'\n\
         base_interpreter = '{}'\n\
         required_packages = ['pyinstaller', 'pefile']\n\
         tools_dir = '{}'\n\
         nsis_url = 'http://127.0.0.1:9/nsis.zip'\n\
         environment_timeout_secs = 30\n\
         build_timeout_secs = 30\n\
         installer_timeout_secs = 30\n",
        config.environment_root.display(),
        base_interpreter.display(),
        config.tools_dir.display(),
    );
    if let Some(makensis) = makensis {
        text.push_str(&format!("makensis_path = '{}'\n", makensis.display()));
    }

    let path = tools.path().join("toolchain.toml");
    fs::write(&path, text).expect("toolchain file");
    path
}

fn bundler(toolchain: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pyexe_bundler").expect("binary");
    cmd.env("PYEXE_TOOLCHAIN", toolchain).env_remove("RUST_LOG");
    cmd
}

#[test]
fn self_test_passes_with_working_tools() {
    let tools = FakeTools::new();
    let toolchain = write_toolchain(&tools, &tools.fakes.join("python3"), None);

    bundler(&toolchain)
        .arg("--self-test")
        .assert()
        .success()
        .stdout(predicate::str::contains("Environment ready"))
        .stdout(predicate::str::contains("Self-test passed"));

    assert_eq!(tools.count("pyinstaller hello onefile"), 1);
    assert_eq!(tools.count("makensis"), 0);
}

#[test]
fn self_test_with_installer_compiles_setup() {
    let tools = FakeTools::new();
    let makensis = tools.install_makensis(&tools.config());
    let toolchain = write_toolchain(&tools, &tools.fakes.join("python3"), Some(&makensis));

    bundler(&toolchain)
        .args(["--self-test", "--with-installer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installer present"))
        .stdout(predicate::str::contains("Hello_1.0.0-setup.exe"));

    assert_eq!(tools.count("makensis"), 1);
}

#[test]
fn self_test_fails_without_base_interpreter() {
    let tools = FakeTools::new();
    let toolchain = write_toolchain(&tools, &tools.path().join("no-such-python"), None);

    bundler(&toolchain)
        .arg("--self-test")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Self-test failed: environment validation failed"));

    assert_eq!(tools.count("pyinstaller"), 0);
}

#[test]
fn build_writes_report() {
    let tools = FakeTools::new();
    let toolchain = write_toolchain(&tools, &tools.fakes.join("python3"), None);
    let script = tools.path().join("app.py");
    fs::write(&script, "print('app')\n").expect("script");
    let report = tools.path().join("reports/run.json");

    bundler(&toolchain)
        .arg(&script)
        .args(["--name", "App", "--onedir", "--output-dir"])
        .arg(tools.path().join("dist"))
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("sha256:"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["environment"], true);
    assert_eq!(json["build"], true);
    assert!(json["installer"].is_null());
    assert_eq!(json["checksum"].as_str().map(str::len), Some(64));
    assert!(tools.path().join("dist/App/App").is_file());
}

#[test]
fn missing_script_exits_nonzero() {
    let tools = FakeTools::new();
    let toolchain = write_toolchain(&tools, &tools.fakes.join("python3"), None);

    bundler(&toolchain)
        .arg(tools.path().join("absent.py"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("script not found"));

    assert_eq!(tools.count("pyinstaller"), 0);
}

#[test]
fn no_arguments_is_a_usage_error() {
    let tools = FakeTools::new();
    let toolchain = write_toolchain(&tools, &tools.fakes.join("python3"), None);

    bundler(&toolchain)
        .assert()
        .failure()
        .stderr(predicate::str::contains("a SCRIPT or --project is required"));
}

#[test]
fn with_installer_requires_self_test() {
    Command::cargo_bin("pyexe_bundler")
        .expect("binary")
        .arg("--with-installer")
        .assert()
        .failure();
}

#[test]
fn unsigned_installer_is_flagged_in_summary() {
    let tools = FakeTools::new();
    let makensis = tools.install_makensis(&tools.config());
    let toolchain = write_toolchain(&tools, &tools.fakes.join("python3"), Some(&makensis));
    let script = tools.path().join("app.py");
    fs::write(&script, "print('app')\n").expect("script");

    bundler(&toolchain)
        .arg(&script)
        .args(["--name", "App", "--installer", "--app-name", "App", "--output-dir"])
        .arg(tools.path().join("dist"))
        .arg("--installer-dir")
        .arg(tools.path().join("installer"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Installer is unsigned"));

    assert!(tools.path().join("installer/App_1.0.0-setup.exe").is_file());
}
