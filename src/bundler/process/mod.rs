//! External process execution.
//!
//! - [`runner`] - `ProcessRunner` and `CommandSpec`
//! - [`sink`] - `LogSink` / `ProgressSink` and their stock implementations

pub mod runner;
pub mod sink;

pub use runner::{CommandSpec, ProcessRunner};
pub use sink::{
    ConsoleSink, FAILURE_MARKER, LogFacadeSink, LogSink, MemorySink, NoProgress, ProgressSink,
    RecordingProgress, SUCCESS_MARKER, TeeSink, WARNING_MARKER,
};
