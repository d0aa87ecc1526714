//! Terminal output for interactive builds.
//!
//! Tool output is printed above an `indicatif` progress bar that tracks the
//! build stage. When stderr is not a terminal the bar stays hidden and lines
//! are printed directly.

use crate::bundler::{FAILURE_MARKER, LogSink, ProgressSink, SUCCESS_MARKER, WARNING_MARKER};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};

const BAR_LENGTH: u64 = 1000;
const BAR_TEMPLATE: &str = "{spinner} [{elapsed_precise}] [{bar:40}] {percent:>3}% {msg}";

/// Formats status messages and owns the progress bar.
#[derive(Clone, Debug)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    bar: ProgressBar,
}

impl OutputManager {
    /// Output manager honouring `--verbose` and `--quiet`.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(BAR_LENGTH);
            if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        };

        Self {
            verbose,
            quiet,
            bar,
        }
    }

    // keeps lines above the bar when it is drawn
    fn line(&self, message: &str) -> io::Result<()> {
        if self.bar.is_hidden() {
            writeln!(io::stdout(), "{message}")
        } else {
            self.bar.println(message);
            Ok(())
        }
    }

    /// Print verbose message if in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if self.verbose && !self.quiet {
            self.line(message)?;
        }
        Ok(())
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            self.line(&format!("{WARNING_MARKER} {message}"))?;
        }
        Ok(())
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            self.line(&format!("{SUCCESS_MARKER} {message}"))?;
        }
        Ok(())
    }

    /// Print error message, even in quiet mode
    pub fn error(&self, message: &str) -> io::Result<()> {
        if self.bar.is_hidden() {
            writeln!(io::stderr(), "{FAILURE_MARKER} {message}")
        } else {
            self.bar.println(format!("{FAILURE_MARKER} {message}"));
            Ok(())
        }
    }

    /// Print section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if !self.quiet {
            self.line(&format!("\n{title}"))?;
            self.line(&"─".repeat(title.chars().count()))?;
        }
        Ok(())
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if !self.quiet {
            self.line(&format!("   {message}"))?;
        }
        Ok(())
    }

    /// Progress sink driving this manager's bar.
    pub fn progress_sink(&self) -> BarProgress {
        BarProgress(self.bar.clone())
    }

    /// Remove the bar from the terminal.
    pub fn finish_progress(&self) {
        self.bar.finish_and_clear();
    }
}

impl LogSink for OutputManager {
    fn write(&self, line: &str) {
        if let Err(e) = self.indent(line) {
            log::warn!("Failed to print tool output: {e}");
        }
    }

    fn success(&self, message: &str) {
        if let Err(e) = OutputManager::success(self, message) {
            log::warn!("Failed to print status: {e}");
        }
    }

    fn warning(&self, message: &str) {
        if let Err(e) = self.warn(message) {
            log::warn!("Failed to print warning: {e}");
        }
    }

    fn failure(&self, message: &str) {
        if let Err(e) = self.error(message) {
            log::warn!("Failed to print failure: {e}");
        }
    }
}

/// [`ProgressSink`] backed by an `indicatif` bar.
#[derive(Clone, Debug)]
pub struct BarProgress(ProgressBar);

impl ProgressSink for BarProgress {
    fn set(&self, fraction: f64) {
        let position = (fraction.clamp(0.0, 1.0) * BAR_LENGTH as f64).round() as u64;
        self.0.set_position(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_maps_fraction_onto_bar() {
        let output = OutputManager::new(false, true);
        let progress = output.progress_sink();
        progress.set(0.5);
        assert_eq!(output.bar.position(), 500);
        progress.set(2.0);
        assert_eq!(output.bar.position(), BAR_LENGTH);
    }
}
