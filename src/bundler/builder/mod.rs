//! Pipeline orchestration and coordination.
//!
//! This module provides the [`Pipeline`] orchestrator that runs the
//! environment, build and installer stages off the caller's task and reports
//! their outcome through [`TaskHandle`]s and completion callbacks.
//!
//! # Example
//!
//! ```no_run
//! use pyexe_bundler::bundler::{
//!     BuildSettingsBuilder, ConsoleSink, NoProgress, Pipeline, PipelineRequest, ToolchainConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> pyexe_bundler::bundler::Result<()> {
//! let pipeline = Pipeline::new(
//!     ToolchainConfig::default(),
//!     Arc::new(ConsoleSink),
//!     Arc::new(NoProgress),
//! );
//!
//! let build = BuildSettingsBuilder::new()
//!     .script_path("app.py")
//!     .exe_name("Hello")
//!     .build()?;
//!
//! let result = pipeline
//!     .run(PipelineRequest {
//!         build,
//!         ..Default::default()
//!     })?
//!     .wait()
//!     .await?;
//!
//! if let Some(artifact) = &result.artifact {
//!     println!("Created: {}", artifact.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`Pipeline`] struct and stage sequencing
//! - [`task`] - [`TaskHandle`] result channel and cancellation
//! - [`tool_detection`] - External tool availability checking

pub mod checksum;
pub mod orchestrator;
pub mod task;
pub mod tool_detection;

pub use orchestrator::{Pipeline, PipelineRequest, PipelineResult};
pub use task::{Completion, TaskHandle};
