//! Interactive pipeline run.

use crate::bundler::{Pipeline, PipelineResult, ToolchainConfig};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use std::{path::Path, sync::Arc};

/// Run the pipeline described by `args`, printing progress and a summary.
///
/// Ctrl-C cancels the run; running tools are killed. Returns exit code 0 when
/// every requested stage succeeded, 1 otherwise.
pub async fn execute_build(
    args: &Args,
    toolchain: ToolchainConfig,
    runtime_config: &RuntimeConfig,
) -> Result<i32> {
    let request = args.pipeline_request()?;
    let output = runtime_config.output().clone();

    runtime_config.section(&format!(
        "Packaging {} as {}",
        request.build.script_path.display(),
        request.build.exe_name()
    ))?;
    runtime_config.verbose_println(&format!(
        "   Environment: {}",
        toolchain.environment_root.display()
    ))?;

    let pipeline = Pipeline::new(
        toolchain,
        Arc::new(output.clone()),
        Arc::new(output.progress_sink()),
    );

    let handle = pipeline.run(request)?;
    let cancel = handle.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling pipeline");
            cancel.cancel();
        }
    });

    let result = handle.wait().await;
    interrupt.abort();
    output.finish_progress();
    let result = result?;

    print_summary(runtime_config, &result)?;

    if let Some(path) = &args.report {
        write_report(path, &result).await?;
        runtime_config.verbose_println(&format!("   Report written to {}", path.display()))?;
    }

    Ok(if result.success() { 0 } else { 1 })
}

fn print_summary(runtime_config: &RuntimeConfig, result: &PipelineResult) -> std::io::Result<()> {
    runtime_config.section("Summary")?;

    let status = |ok: bool| if ok { "ok" } else { "failed" };
    runtime_config.indent(&format!("environment: {}", status(result.environment)))?;
    runtime_config.indent(&format!("build:       {}", status(result.build)))?;
    if let Some(installer) = result.installer {
        runtime_config.indent(&format!("installer:   {}", status(installer)))?;
        runtime_config.indent(&format!(
            "signed:      {}",
            if result.signed { "yes" } else { "no" }
        ))?;
    }
    if let Some(artifact) = &result.artifact {
        runtime_config.indent(&format!("artifact:    {}", artifact.display()))?;
    }
    if let Some(checksum) = &result.checksum {
        runtime_config.indent(&format!("sha256:      {checksum}"))?;
    }

    if result.installer == Some(true) && !result.signed {
        runtime_config.warn(
            "Installer is unsigned; pass --signtool, --certificate and a password to sign it",
        )?;
    }

    if result.success() {
        runtime_config.success(&format!("Done in {:.1}s", result.elapsed_secs))
    } else {
        runtime_config.error("Pipeline failed, see the log above")
    }
}

/// Write `result` as pretty JSON, creating parent directories.
pub async fn write_report(path: &Path, result: &PipelineResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(result)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
