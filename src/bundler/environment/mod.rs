//! Isolated runtime environment management.
//!
//! Validation walks `Unvalidated -> Checking -> {Valid, Invalid}`:
//!
//! 1. create the environment if its root or interpreter is missing
//! 2. list installed packages via `pip freeze`
//! 3. diff against the required package list
//! 4. install exactly the missing packages in one `pip install --upgrade`
//!
//! Re-running on a valid environment only performs the listing step.

pub mod packages;

use crate::bundler::{
    error::{Error, Result},
    process::{CommandSpec, ProcessRunner},
    settings::ToolchainConfig,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Validation state of the shared runtime environment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvironmentState {
    /// Never validated in this process.
    #[default]
    Unvalidated,
    /// Validation in progress.
    Checking,
    /// Environment exists and holds every required package.
    Valid,
    /// Creation or installation failed.
    Invalid,
}

/// A filesystem-rooted package environment.
///
/// Created lazily on first validation and never deleted by the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeEnvironment {
    root: PathBuf,
    scripts_dir: PathBuf,
    interpreter: PathBuf,
    package_manager: PathBuf,
}

impl RuntimeEnvironment {
    /// Layout of an environment rooted at `root` on this platform.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let scripts_dir = if cfg!(windows) {
            root.join("Scripts")
        } else {
            root.join("bin")
        };
        let interpreter = scripts_dir.join(executable_name("python"));
        let package_manager = scripts_dir.join(executable_name("pip"));

        Self {
            root,
            scripts_dir,
            interpreter,
            package_manager,
        }
    }

    /// Environment root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Interpreter binary inside the environment.
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    /// Package manager binary inside the environment.
    pub fn package_manager(&self) -> &Path {
        &self.package_manager
    }

    /// Console script installed into the environment, e.g. `pyinstaller`.
    pub fn tool(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(executable_name(name))
    }

    /// Whether the root and the interpreter are present.
    pub fn exists(&self) -> bool {
        self.root.is_dir() && self.interpreter.is_file()
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// Creates and repairs the runtime environment.
pub struct EnvironmentStage<'a> {
    config: &'a ToolchainConfig,
    runner: &'a ProcessRunner,
}

impl<'a> EnvironmentStage<'a> {
    /// Stage using `config` for locations and `runner` for commands.
    pub fn new(config: &'a ToolchainConfig, runner: &'a ProcessRunner) -> Self {
        Self { config, runner }
    }

    /// Ensure the environment exists and holds every required package.
    pub async fn validate(&self, cancel: &CancellationToken) -> Result<RuntimeEnvironment> {
        let env = RuntimeEnvironment::at(&self.config.environment_root);

        if !env.exists() {
            self.create(&env, cancel).await?;
        } else {
            log::debug!("Reusing environment at {}", env.root().display());
        }

        let installed = self.installed_packages(&env, cancel).await?;
        let missing = packages::missing(&self.config.required_packages, &installed);

        if missing.is_empty() {
            log::debug!("All {} required packages present", self.config.required_packages.len());
        } else {
            self.install(&env, &missing, cancel).await?;
        }

        Ok(env)
    }

    async fn create(&self, env: &RuntimeEnvironment, cancel: &CancellationToken) -> Result<()> {
        self.runner
            .log()
            .write(&format!("Creating environment at {}", env.root().display()));

        let mut command = CommandSpec::new(&self.config.base_interpreter).args(["-m", "venv"]);
        if env.root().exists() {
            // a root without an interpreter is a broken environment
            command = command.arg("--clear");
        }
        let command = command.arg(env.root());

        let code = self.runner.run(&command, cancel).await.map_err(|e| match e {
            Error::CommandFailed { command, error } => Error::Environment(format!(
                "interpreter `{command}` could not be started: {error}"
            )),
            other => other,
        })?;

        if code != 0 {
            return Err(Error::Environment(format!(
                "environment creation exited with code {code}"
            )));
        }
        if !env.interpreter().is_file() {
            return Err(Error::Environment(format!(
                "environment created but {} is missing",
                env.interpreter().display()
            )));
        }
        Ok(())
    }

    async fn installed_packages(
        &self,
        env: &RuntimeEnvironment,
        cancel: &CancellationToken,
    ) -> Result<std::collections::BTreeSet<String>> {
        let command = CommandSpec::new(env.package_manager()).arg("freeze");
        let (code, lines) = self
            .runner
            .capture(&command, cancel)
            .await
            .map_err(package_manager_error)?;

        if code != 0 {
            return Err(Error::Environment(format!(
                "listing installed packages exited with code {code}"
            )));
        }
        Ok(packages::parse_freeze(&lines))
    }

    async fn install(
        &self,
        env: &RuntimeEnvironment,
        missing: &[String],
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.runner
            .log()
            .write(&format!("Installing missing packages: {}", missing.join(", ")));

        let command = CommandSpec::new(env.package_manager())
            .args(["install", "--upgrade"])
            .args(missing);
        let code = self
            .runner
            .run(&command, cancel)
            .await
            .map_err(package_manager_error)?;

        if code != 0 {
            return Err(Error::Environment(format!(
                "package installation exited with code {code}"
            )));
        }
        Ok(())
    }
}

fn package_manager_error(e: Error) -> Error {
    match e {
        Error::CommandFailed { command, error } => Error::Environment(format!(
            "package manager `{command}` could not be started: {error}"
        )),
        other => other,
    }
}
