//! Narrow output interfaces between stages and whoever presents them.
//!
//! Stages never touch a presentation layer directly. They write tool output and
//! status lines to a [`LogSink`] and report completion fractions to a
//! [`ProgressSink`]. Headless callers use [`ConsoleSink`] and [`NoProgress`].

use std::sync::{Arc, Mutex, MutexGuard};

/// Prefix of failure lines.
pub const FAILURE_MARKER: &str = "❌";

/// Prefix of success lines.
pub const SUCCESS_MARKER: &str = "✓";

/// Prefix of warning lines.
pub const WARNING_MARKER: &str = "⚠";

/// Receives every line produced by a run.
pub trait LogSink: Send + Sync {
    /// Record one line of output.
    fn write(&self, line: &str);

    /// Record a success line.
    fn success(&self, message: &str) {
        self.write(&format!("{SUCCESS_MARKER} {message}"));
    }

    /// Record a warning line.
    fn warning(&self, message: &str) {
        self.write(&format!("{WARNING_MARKER} {message}"));
    }

    /// Record a failure line.
    fn failure(&self, message: &str) {
        self.write(&format!("{FAILURE_MARKER} {message}"));
    }
}

/// Receives completion fractions in `0.0..=1.0`.
pub trait ProgressSink: Send + Sync {
    /// Set the current fraction.
    fn set(&self, fraction: f64);
}

/// Forwards lines to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn write(&self, line: &str) {
        log::info!(target: "pyexe_bundler::tool", "{line}");
    }
}

/// Prints lines to stdout. Used when no interactive caller is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded lines.
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    /// Whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        lock(&self.lines).iter().any(|l| l.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write(&self, line: &str) {
        lock(&self.lines).push(line.to_string());
    }
}

/// Fans lines out to several sinks.
#[derive(Clone, Default)]
pub struct TeeSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl TeeSink {
    /// Combine sinks; each line goes to all of them in order.
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for TeeSink {
    fn write(&self, line: &str) {
        for sink in &self.sinks {
            sink.write(line);
        }
    }
}

/// Discards progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn set(&self, _fraction: f64) {}
}

/// Keeps every reported fraction.
#[derive(Debug, Default, Clone)]
pub struct RecordingProgress {
    values: Arc<Mutex<Vec<f64>>>,
}

impl RecordingProgress {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of reported fractions, oldest first.
    pub fn values(&self) -> Vec<f64> {
        lock(&self.values).clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn set(&self, fraction: f64) {
        lock(&self.values).push(fraction);
    }
}

// A panic while holding one of these locks cannot leave the Vec inconsistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
