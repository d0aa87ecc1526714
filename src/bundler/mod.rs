//! Script-to-executable bundling pipeline.
//!
//! Turns a Python script into a Windows executable with PyInstaller and,
//! optionally, into an NSIS setup program, driving every tool as an external
//! process.
//!
//! # Stages
//!
//! 1. [`EnvironmentStage`] - create or repair the isolated runtime environment
//! 2. [`BuildStage`] - package the script into an executable
//! 3. [`InstallerStage`] - compile and sign the installer
//!
//! [`Pipeline`] sequences the stages on the tokio runtime. Stage output flows
//! through [`LogSink`], build progress through [`ProgressSink`].

pub mod builder;
pub mod environment;
pub mod error;
pub mod packaging;
pub mod platform;
pub mod process;
pub mod settings;
pub mod utils;

pub use builder::{Completion, Pipeline, PipelineRequest, PipelineResult, TaskHandle};
pub use environment::{EnvironmentStage, EnvironmentState, RuntimeEnvironment};
pub use error::{Error, Result};
pub use packaging::{BuildOutcome, BuildStage};
pub use platform::windows::{
    nsis::{InstallerOutcome, InstallerStage},
    sign::SigningWarning,
};
pub use process::{
    CommandSpec, ConsoleSink, FAILURE_MARKER, LogFacadeSink, LogSink, MemorySink, NoProgress,
    ProcessRunner, ProgressSink, RecordingProgress, SUCCESS_MARKER, TeeSink, WARNING_MARKER,
};
pub use settings::{
    Branding, BuildSettings, BuildSettingsBuilder, DataKind, DataPath, InstallerSettings,
    ProjectFile, SecuritySettings, ToolchainConfig,
};
