//! Fake external tools for integration tests.
//!
//! Every fake is a POSIX shell script that appends one line per invocation
//! to a shared call log, so tests can assert which tools ran and how.

#![allow(dead_code)]

use pyexe_bundler::bundler::{BuildSettings, BuildSettingsBuilder, ToolchainConfig};
use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    time::Duration,
};
use tempfile::TempDir;

const BASE_INTERPRETER: &str = r#"#!/bin/sh
echo "venv $*" >> "@LOG@"
root=""
for arg in "$@"; do root="$arg"; done
mkdir -p "$root/bin"
cp "@FAKES@/python.sh" "$root/bin/python"
cp "@FAKES@/pip.sh" "$root/bin/pip"
cp "@FAKES@/pyinstaller.sh" "$root/bin/pyinstaller"
chmod 755 "$root/bin/python" "$root/bin/pip" "$root/bin/pyinstaller"
echo "created virtual environment in $root"
"#;

const PYTHON: &str = r#"#!/bin/sh
echo "Python 3.12.0"
"#;

const PIP: &str = r#"#!/bin/sh
root=$(cd "$(dirname "$0")/.." && pwd)
case "$1" in
  freeze)
    echo "pip freeze" >> "@LOG@"
    if [ -f "@FAKES@/pip.slow" ]; then
      sleep 3
      touch "@FAKES@/pip.finished"
    fi
    if [ -f "$root/installed.txt" ]; then cat "$root/installed.txt"; fi
    ;;
  install)
    shift
    shift
    echo "pip install $*" >> "@LOG@"
    if [ -f "@FAKES@/pip.fail" ]; then
      echo "ERROR: could not install $*" >&2
      exit 1
    fi
    for pkg in "$@"; do echo "$pkg==1.0" >> "$root/installed.txt"; done
    echo "Successfully installed $*"
    ;;
esac
"#;

const PYINSTALLER: &str = r#"#!/bin/sh
name=""
dist=""
mode="onefile"
version_file=""
upx=""
while [ $# -gt 0 ]; do
  case "$1" in
    --name) name="$2"; shift ;;
    --distpath) dist="$2"; shift ;;
    --onedir) mode="onedir" ;;
    --onefile) mode="onefile" ;;
    --version-file) version_file="$2"; shift ;;
    --noupx) upx="noupx" ;;
    --upx-dir) upx="upx-dir $2"; shift ;;
  esac
  shift
done
echo "pyinstaller $name $mode" >> "@LOG@"
if [ -n "$upx" ]; then
  echo "upx $upx" >> "@LOG@"
fi
if [ -n "$version_file" ] && [ -f "$version_file" ]; then
  echo "version-file $version_file" >> "@LOG@"
fi
i=0
while [ $i -lt 30 ]; do
  echo "INFO: step $i"
  i=$((i + 1))
done
if [ -f "@FAKES@/pyinstaller.slow" ]; then
  sleep 3
  touch "@FAKES@/pyinstaller.finished"
fi
if [ -f "@FAKES@/pyinstaller.fail" ]; then
  echo "ERROR: packaging failed" >&2
  exit 2
fi
mkdir -p "$dist"
if [ "$mode" = "onefile" ]; then
  printf 'executable' > "$dist/$name"
else
  mkdir -p "$dist/$name"
  printf 'executable' > "$dist/$name/$name"
  printf 'library' > "$dist/$name/lib.so"
fi
echo "INFO: Build complete"
"#;

const MAKENSIS: &str = r#"#!/bin/sh
echo "makensis $*" >> "@LOG@"
for arg in "$@"; do nsi="$arg"; done
out=$(sed -n 's/^OutFile "\(.*\)"$/\1/p' "$nsi")
if [ -z "$out" ]; then
  echo "no OutFile in $nsi" >&2
  exit 1
fi
echo "MakeNSIS v3.09"
printf 'installer' > "$out"
echo "Output: $out"
"#;

const SIGNTOOL: &str = r#"#!/bin/sh
echo "signtool $*" >> "@LOG@"
if [ -f "@FAKES@/signtool.fail" ]; then
  echo "SignTool Error: invalid certificate" >&2
  exit 1
fi
echo "Successfully signed"
"#;

const SLEEPER: &str = r#"#!/bin/sh
echo "sleeper" >> "@LOG@"
echo "working"
sleep 3
touch "@FAKES@/sleeper.finished"
"#;

/// Scratch workspace with fake tools and a call log.
pub struct FakeTools {
    pub dir: TempDir,
    pub fakes: PathBuf,
    pub log: PathBuf,
}

impl FakeTools {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fakes = dir.path().join("fakes");
        fs::create_dir_all(&fakes).expect("fakes dir");
        let log = dir.path().join("calls.log");
        fs::write(&log, "").expect("call log");

        let tools = Self { dir, fakes, log };
        tools.write_fake("python3", BASE_INTERPRETER);
        tools.write_fake("python.sh", PYTHON);
        tools.write_fake("pip.sh", PIP);
        tools.write_fake("pyinstaller.sh", PYINSTALLER);
        tools.write_fake("signtool", SIGNTOOL);
        tools
    }

    fn write_fake(&self, name: &str, template: &str) -> PathBuf {
        let path = self.fakes.join(name);
        write_executable(&path, &self.render(template));
        path
    }

    fn render(&self, template: &str) -> String {
        template
            .replace("@LOG@", &self.log.display().to_string())
            .replace("@FAKES@", &self.fakes.display().to_string())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ToolchainConfig {
        ToolchainConfig {
            environment_root: self.path().join("venv"),
            base_interpreter: self.fakes.join("python3"),
            required_packages: vec!["pyinstaller".into(), "pefile".into()],
            tools_dir: self.path().join("tools"),
            makensis_path: None,
            // never reachable: acquisition must not be attempted in these tests
            nsis_url: Some("http://127.0.0.1:9/nsis.zip".into()),
            environment_timeout_secs: 30,
            build_timeout_secs: 30,
            installer_timeout_secs: 30,
            ..ToolchainConfig::default()
        }
    }

    /// Install the fake makensis where `config` expects it.
    pub fn install_makensis(&self, config: &ToolchainConfig) -> PathBuf {
        let path = config.makensis_path();
        fs::create_dir_all(path.parent().expect("parent")).expect("tools dir");
        write_executable(&path, &self.render(MAKENSIS));
        path
    }

    pub fn signtool(&self) -> PathBuf {
        self.fakes.join("signtool")
    }

    /// Make the named fake fail (`pip`, `pyinstaller` or `signtool`).
    pub fn fail(&self, tool: &str) {
        fs::write(self.fakes.join(format!("{tool}.fail")), "").expect("fail switch");
    }

    /// Make the named fake (`pip freeze` or `pyinstaller`) sleep for three
    /// seconds and then leave a `<tool>.finished` marker.
    pub fn slow(&self, tool: &str) {
        fs::write(self.fakes.join(format!("{tool}.slow")), "").expect("slow switch");
    }

    /// Whether a slow fake ran to completion.
    pub fn finished(&self, tool: &str) -> bool {
        self.fakes.join(format!("{tool}.finished")).exists()
    }

    /// A standalone fake that prints, sleeps, then leaves `sleeper.finished`.
    pub fn sleeper(&self) -> PathBuf {
        self.write_fake("sleeper", SLEEPER)
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .expect("call log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    /// A hello-world script plus default settings writing into this workspace.
    pub fn hello_settings(&self) -> BuildSettings {
        let script = self.path().join("hello.py");
        fs::write(&script, "print(\"hello\")\n").expect("script");
        BuildSettingsBuilder::new()
            .script_path(&script)
            .exe_name("hello")
            .output_dir(self.path().join("dist"))
            .build()
            .expect("settings")
    }
}

pub fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).expect("write fake");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

pub const TIMEOUT: Duration = Duration::from_secs(30);
