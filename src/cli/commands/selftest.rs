//! Headless end-to-end check.
//!
//! Generates a hello-world script, runs Environment -> Build (-> Installer)
//! with fixed per-stage timeouts, checks the artifacts exist and maps the
//! outcome onto the process exit code: 0 for full success, 1 otherwise.

use crate::bundler::{
    BuildSettingsBuilder, ConsoleSink, FAILURE_MARKER, InstallerSettings, NoProgress, Pipeline,
    SUCCESS_MARKER, SecuritySettings, TaskHandle, ToolchainConfig,
};
use crate::error::Result;
use anyhow::Context;
use std::{sync::Arc, time::Duration};

const SCRIPT: &str = "print(\"hello\")\n";
const EXE_NAME: &str = "hello";
const APP_NAME: &str = "Hello";

/// Run the self-test and return its exit code.
///
/// The installer stage runs on Windows hosts, or anywhere when
/// `with_installer` is set.
pub async fn run_self_test(config: ToolchainConfig, with_installer: bool) -> Result<i32> {
    let scratch = tempfile::Builder::new()
        .prefix("pyexe_selftest_")
        .tempdir()
        .context("creating self-test scratch directory")?;
    let script = scratch.path().join("hello.py");
    tokio::fs::write(&script, SCRIPT)
        .await
        .with_context(|| format!("writing {}", script.display()))?;

    let build = BuildSettingsBuilder::new()
        .script_path(&script)
        .exe_name(EXE_NAME)
        .output_dir(scratch.path().join("dist"))
        .build()?;

    let environment_timeout = config.environment_timeout();
    let build_timeout = config.build_timeout();
    let installer_timeout = config.installer_timeout();
    let pipeline = Pipeline::new(config, Arc::new(ConsoleSink), Arc::new(NoProgress));

    println!("Self-test: validating environment");
    if !wait_stage(pipeline.validate_environment(false, None), environment_timeout).await {
        return Ok(fail("environment validation failed"));
    }

    println!("Self-test: building {}", script.display());
    if !wait_stage(pipeline.build(build.clone(), None), build_timeout).await {
        return Ok(fail("build failed"));
    }

    let artifact = build.artifact_path();
    if !artifact.is_file() {
        return Ok(fail(&format!("expected artifact {} is missing", artifact.display())));
    }
    println!("{SUCCESS_MARKER} Artifact present: {}", artifact.display());

    if with_installer || cfg!(windows) {
        let installer = InstallerSettings {
            app_name: APP_NAME.to_string(),
            output_dir: scratch.path().join("installer"),
            ..InstallerSettings::default()
        };
        let expected = installer
            .output_dir()
            .join(installer.installer_file_name(APP_NAME));

        println!("Self-test: creating installer");
        let handle = pipeline.create_installer(build, installer, SecuritySettings::default(), None);
        if !wait_stage(handle, installer_timeout).await {
            return Ok(fail("installer creation failed"));
        }
        if !expected.is_file() {
            return Ok(fail(&format!("expected installer {} is missing", expected.display())));
        }
        println!("{SUCCESS_MARKER} Installer present: {}", expected.display());
    }

    println!("{SUCCESS_MARKER} Self-test passed");
    Ok(0)
}

// A timeout cancels the stage, which kills its child process.
async fn wait_stage(handle: TaskHandle<bool>, timeout: Duration) -> bool {
    match handle.wait_timeout(timeout).await {
        Ok(ok) => ok,
        Err(e) => {
            println!("{FAILURE_MARKER} {e}");
            false
        }
    }
}

fn fail(reason: &str) -> i32 {
    println!("{FAILURE_MARKER} Self-test failed: {reason}");
    1
}
