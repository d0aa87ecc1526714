//! Configuration structures for pipeline runs.
//!
//! Caller-supplied settings (`BuildSettings`, `InstallerSettings`,
//! `SecuritySettings`) are immutable per run. `ToolchainConfig` describes the
//! external tools and is fixed when the pipeline is constructed.

mod build;
mod builder;
mod installer;
mod project;
mod security;
mod toolchain;

pub use build::{
    Branding, BuildSettings, DEFAULT_EXE_NAME, DEFAULT_OUTPUT_DIR, DataKind, DataPath,
};
pub use builder::BuildSettingsBuilder;
pub use installer::{DEFAULT_INSTALLER_DIR, InstallerSettings};
pub use project::ProjectFile;
pub use security::SecuritySettings;
pub use toolchain::{
    DEFAULT_NSIS_VERSION, DEFAULT_REQUIRED_PACKAGES, DEFAULT_TIMESTAMP_URL, ToolchainConfig,
};
