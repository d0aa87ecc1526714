//! Main pipeline orchestration and coordination.
//!
//! This module provides the [`Pipeline`] orchestrator that sequences the
//! environment, build and installer stages and reports their outcome.

use super::{
    checksum::artifact_sha256,
    task::{Completion, TaskHandle},
};
use crate::bundler::{
    environment::{EnvironmentStage, EnvironmentState, RuntimeEnvironment},
    error::{Error, Result},
    packaging::{self, BuildOutcome, BuildStage},
    platform::windows::nsis::{InstallerOutcome, InstallerStage},
    process::{LogSink, ProcessRunner, ProgressSink},
    settings::{BuildSettings, InstallerSettings, SecuritySettings, ToolchainConfig},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio_util::sync::CancellationToken;

/// Everything one full pipeline run needs.
#[derive(Clone, Debug, Default)]
pub struct PipelineRequest {
    /// Packaging settings.
    pub build: BuildSettings,
    /// Installer settings; `None` stops after the build.
    pub installer: Option<InstallerSettings>,
    /// Signing credentials for the installer.
    pub security: SecuritySettings,
    /// Re-validate the environment even if it was validated before.
    pub force_environment: bool,
}

/// Outcome of a full pipeline run.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineResult {
    /// Environment stage succeeded.
    pub environment: bool,
    /// Build stage succeeded.
    pub build: bool,
    /// Installer stage outcome, `None` when it was not requested or not reached.
    pub installer: Option<bool>,
    /// Installer was signed.
    pub signed: bool,
    /// Final artifact: the installer if one was built, else the executable.
    pub artifact: Option<PathBuf>,
    /// SHA-256 of the final artifact.
    pub checksum: Option<String>,
    /// Wall-clock duration of the run.
    pub elapsed_secs: f64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl PipelineResult {
    fn new() -> Self {
        Self {
            environment: false,
            build: false,
            installer: None,
            signed: false,
            artifact: None,
            checksum: None,
            elapsed_secs: 0.0,
            finished_at: Utc::now(),
        }
    }

    /// Every stage that ran succeeded.
    pub fn success(&self) -> bool {
        self.environment && self.build && self.installer.unwrap_or(true)
    }
}

/// Sequences Environment -> Build -> Installer on the tokio runtime.
///
/// Cheap to clone; clones share the environment cache and the run gate.
///
/// Stage launchers return immediately with a [`TaskHandle`]. The optional
/// completion callback runs exactly once on the worker, before the handle
/// resolves. Stage errors never escape: they become a `❌` log line and a
/// `false` result.
///
/// # Examples
///
/// ```no_run
/// use pyexe_bundler::bundler::{LogFacadeSink, NoProgress, Pipeline, ToolchainConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> pyexe_bundler::bundler::Result<()> {
/// let pipeline = Pipeline::new(
///     ToolchainConfig::default(),
///     Arc::new(LogFacadeSink),
///     Arc::new(NoProgress),
/// );
/// let ok = pipeline
///     .validate_environment(false, Some(Box::new(|ok| println!("environment ready: {ok}"))))
///     .wait()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

struct Inner {
    config: ToolchainConfig,
    runner: ProcessRunner,
    progress: Arc<dyn ProgressSink>,
    // serializes validations so two callers never create the environment at once
    validation: tokio::sync::Mutex<()>,
    environment: Mutex<EnvironmentSlot>,
    running: AtomicBool,
    cancel: CancellationToken,
}

#[derive(Default)]
struct EnvironmentSlot {
    state: EnvironmentState,
    env: Option<RuntimeEnvironment>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.inner.config)
            .field("environment_state", &self.environment_state())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Pipeline {
    /// Pipeline using `config` for every tool location.
    pub fn new(
        config: ToolchainConfig,
        log: Arc<dyn LogSink>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                runner: ProcessRunner::new(log),
                progress,
                validation: tokio::sync::Mutex::new(()),
                environment: Mutex::new(EnvironmentSlot::default()),
                running: AtomicBool::new(false),
                cancel: CancellationToken::new(),
            }),
        }
    }

    /// Toolchain configuration.
    pub fn config(&self) -> &ToolchainConfig {
        &self.inner.config
    }

    /// Current validation state of the shared environment.
    pub fn environment_state(&self) -> EnvironmentState {
        self.inner.slot().state
    }

    /// The environment, once validated.
    pub fn environment(&self) -> Option<RuntimeEnvironment> {
        self.inner.valid_environment()
    }

    /// Whether a [`Pipeline::run`] is in progress.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Cancel every task launched from this pipeline.
    ///
    /// The pipeline cannot launch new work afterwards.
    pub fn cancel_all(&self) {
        self.inner.cancel.cancel();
    }

    /// Ensure the runtime environment exists with every required package.
    ///
    /// The result is cached for the lifetime of the pipeline; `force`
    /// re-runs the full check.
    pub fn validate_environment(
        &self,
        force: bool,
        on_complete: Option<Completion>,
    ) -> TaskHandle<bool> {
        let inner = Arc::clone(&self.inner);
        TaskHandle::spawn("environment", &self.inner.cancel, move |cancel| async move {
            let result = inner.ensure_environment(force, &cancel).await;
            complete(inner.settle("Environment validation", &result), on_complete)
        })
    }

    /// Package `settings.script_path` into an executable.
    ///
    /// A missing script fails before anything is launched. The environment
    /// is validated first if that has not happened yet.
    pub fn build(&self, settings: BuildSettings, on_complete: Option<Completion>) -> TaskHandle<bool> {
        let inner = Arc::clone(&self.inner);
        TaskHandle::spawn("build", &self.inner.cancel, move |cancel| async move {
            let result = inner.build(&settings, &cancel).await;
            complete(inner.settle("Build", &result), on_complete)
        })
    }

    /// Wrap the output of a finished build into a setup executable.
    pub fn create_installer(
        &self,
        build: BuildSettings,
        installer: InstallerSettings,
        security: SecuritySettings,
        on_complete: Option<Completion>,
    ) -> TaskHandle<bool> {
        let inner = Arc::clone(&self.inner);
        TaskHandle::spawn("installer", &self.inner.cancel, move |cancel| async move {
            let result = inner
                .installer(&build, &installer, &security, &cancel)
                .await;
            complete(inner.settle("Installer creation", &result), on_complete)
        })
    }

    /// Run Environment -> Build -> (Installer) with the configured timeouts.
    ///
    /// Refuses to start while another run from this pipeline is in progress.
    pub fn run(&self, request: PipelineRequest) -> Result<TaskHandle<PipelineResult>> {
        if self.inner.running.swap(true, Ordering::AcqRel) {
            return Err(Error::GenericError(
                "a pipeline run is already in progress".into(),
            ));
        }

        let gate = RunGate(Arc::clone(&self.inner));
        Ok(TaskHandle::spawn("pipeline", &self.inner.cancel, move |cancel| async move {
            let inner = Arc::clone(&gate.0);
            let result = inner.run(request, &cancel).await;
            drop(gate);
            result
        }))
    }
}

// Releases the run gate when the run ends, even if it panicked.
struct RunGate(Arc<Inner>);

impl Drop for RunGate {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
    }
}

fn complete(ok: bool, on_complete: Option<Completion>) -> bool {
    if let Some(callback) = on_complete {
        callback(ok);
    }
    ok
}

async fn timed<T>(
    stage: &str,
    limit: Duration,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    // dropping the stage future kills its child process
    tokio::time::timeout(limit, future)
        .await
        .unwrap_or_else(|_| {
            Err(Error::Timeout {
                task: stage.to_string(),
                timeout: limit,
            })
        })
}

impl Inner {
    fn slot(&self) -> MutexGuard<'_, EnvironmentSlot> {
        self.environment
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: EnvironmentState, env: Option<RuntimeEnvironment>) {
        let mut slot = self.slot();
        slot.state = state;
        slot.env = env;
    }

    // a cached environment whose interpreter vanished is no longer valid
    fn valid_environment(&self) -> Option<RuntimeEnvironment> {
        let slot = self.slot();
        match (&slot.state, &slot.env) {
            (EnvironmentState::Valid, Some(env)) if env.exists() => Some(env.clone()),
            _ => None,
        }
    }

    fn log(&self) -> &dyn LogSink {
        &**self.runner.log()
    }

    fn settle<T>(&self, stage: &str, result: &Result<T>) -> bool {
        match result {
            Ok(_) => true,
            Err(e) => {
                log::error!("{stage} failed: {e}");
                self.log().failure(&format!("{stage} failed: {e}"));
                false
            }
        }
    }

    async fn ensure_environment(
        &self,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<RuntimeEnvironment> {
        let _validating = self.validation.lock().await;

        if !force {
            if let Some(env) = self.valid_environment() {
                log::debug!("Environment at {} already validated", env.root().display());
                return Ok(env);
            }
        }

        self.set_state(EnvironmentState::Checking, None);
        let result = EnvironmentStage::new(&self.config, &self.runner)
            .validate(cancel)
            .await;

        match &result {
            Ok(env) => {
                self.set_state(EnvironmentState::Valid, Some(env.clone()));
                self.log()
                    .success(&format!("Environment ready at {}", env.root().display()));
            }
            Err(_) => self.set_state(EnvironmentState::Invalid, None),
        }
        result
    }

    async fn build(
        &self,
        settings: &BuildSettings,
        cancel: &CancellationToken,
    ) -> Result<BuildOutcome> {
        packaging::check_script(settings)?;
        let env = self.ensure_environment(false, cancel).await?;
        BuildStage::new(&self.config, &self.runner, &*self.progress)
            .run(settings, &env, cancel)
            .await
    }

    async fn installer(
        &self,
        build: &BuildSettings,
        installer: &InstallerSettings,
        security: &SecuritySettings,
        cancel: &CancellationToken,
    ) -> Result<InstallerOutcome> {
        InstallerStage::new(&self.config, &self.runner)
            .run(build, installer, security, cancel)
            .await
    }

    async fn checksum(&self, path: &Path) -> Option<String> {
        match artifact_sha256(path).await {
            Ok(digest) => {
                self.log()
                    .write(&format!("SHA-256 {}: {digest}", path.display()));
                Some(digest)
            }
            Err(e) => {
                self.log()
                    .warning(&format!("Could not checksum {}: {e}", path.display()));
                None
            }
        }
    }

    async fn run(&self, request: PipelineRequest, cancel: &CancellationToken) -> PipelineResult {
        let started = Instant::now();
        let mut result = PipelineResult::new();

        let env = timed(
            "environment",
            self.config.environment_timeout(),
            self.ensure_environment(request.force_environment, cancel),
        )
        .await;
        if matches!(env, Err(Error::Timeout { .. })) {
            // the dropped validation never reached Valid or Invalid
            self.set_state(EnvironmentState::Invalid, None);
        }
        result.environment = self.settle("Environment validation", &env);

        if result.environment {
            let build = timed(
                "build",
                self.config.build_timeout(),
                self.build(&request.build, cancel),
            )
            .await;
            result.build = self.settle("Build", &build);

            if let Ok(outcome) = build {
                result.checksum = self.checksum(&outcome.artifact).await;
                result.artifact = Some(outcome.artifact);
            }
        }

        if result.build {
            if let Some(installer) = &request.installer {
                let outcome = timed(
                    "installer",
                    self.config.installer_timeout(),
                    self.installer(&request.build, installer, &request.security, cancel),
                )
                .await;
                result.installer = Some(self.settle("Installer creation", &outcome));

                if let Ok(outcome) = outcome {
                    result.signed = outcome.signed;
                    result.checksum = self.checksum(&outcome.path).await;
                    result.artifact = Some(outcome.path);
                }
            }
        }

        result.elapsed_secs = started.elapsed().as_secs_f64();
        result.finished_at = Utc::now();

        if result.success() {
            self.log().success(&format!(
                "Pipeline finished in {:.1}s",
                result.elapsed_secs
            ));
        }
        result
    }
}
