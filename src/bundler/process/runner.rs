//! External command execution with merged, line-streamed output.

use super::sink::LogSink;
use crate::bundler::error::{Error, Result};
use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

// shown in place of secret arguments
const REDACTED: &str = "****";

/// Program, arguments and working directory of one external command.
///
/// `Display` and `Debug` never show arguments added with
/// [`CommandSpec::arg_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: PathBuf,
    args: Vec<OsString>,
    // indices into `args`
    secrets: Vec<usize>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// Command running `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secrets: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Append an argument that is passed to the process but never displayed.
    pub fn arg_secret(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.secrets.push(self.args.len());
        self.arg(arg)
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run inside `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments as lossy UTF-8 strings.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for (index, arg) in self.args.iter().enumerate() {
            if self.secrets.contains(&index) {
                write!(f, " {REDACTED}")?;
                continue;
            }
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("command", &self.to_string())
            .field("current_dir", &self.current_dir)
            .finish()
    }
}

/// Runs external commands and streams their combined output to a [`LogSink`].
///
/// A nonzero exit code is returned as-is. The runner never interprets tool
/// output beyond forwarding it.
#[derive(Clone)]
pub struct ProcessRunner {
    log: Arc<dyn LogSink>,
}

impl ProcessRunner {
    /// Runner writing to `log`.
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }

    /// Sink receiving output lines.
    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    /// Run to completion and return the exit code.
    pub async fn run(&self, command: &CommandSpec, cancel: &CancellationToken) -> Result<i32> {
        self.execute(command, cancel, |_, _| {}).await
    }

    /// Run to completion, calling `on_line` with the running line count.
    pub async fn run_with_progress<F>(
        &self,
        command: &CommandSpec,
        cancel: &CancellationToken,
        mut on_line: F,
    ) -> Result<i32>
    where
        F: FnMut(usize),
    {
        self.execute(command, cancel, |count, _| on_line(count)).await
    }

    /// Run to completion and also return every output line.
    pub async fn capture(
        &self,
        command: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<(i32, Vec<String>)> {
        let mut captured = Vec::new();
        let code = self
            .execute(command, cancel, |_, line| captured.push(line.to_string()))
            .await?;
        Ok((code, captured))
    }

    async fn execute<F>(
        &self,
        command: &CommandSpec,
        cancel: &CancellationToken,
        mut on_line: F,
    ) -> Result<i32>
    where
        F: FnMut(usize, &str),
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        log::debug!("Running {command}");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|error| Error::CommandFailed {
            command: command.to_string(),
            error,
        })?;

        // stdout and stderr are merged into one ordered line stream
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, tx.clone()));
        }
        drop(tx);

        let mut count = 0usize;
        loop {
            tokio::select! {
                line = rx.recv() => match line {
                    Some(line) => {
                        count += 1;
                        self.log.write(&line);
                        on_line(count, &line);
                    }
                    None => break,
                },
                _ = cancel.cancelled() => {
                    terminate(&mut child, command).await;
                    return Err(Error::Cancelled);
                }
            }
        }

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancel.cancelled() => None,
        };

        match waited {
            Some(status) => {
                let status = status?;
                log::debug!("{} exited with {:?}", command.program.display(), status.code());
                Ok(status.code().unwrap_or(-1))
            }
            None => {
                terminate(&mut child, command).await;
                Err(Error::Cancelled)
            }
        }
    }
}

async fn terminate(child: &mut tokio::process::Child, command: &CommandSpec) {
    log::warn!("Terminating {}", command.program.display());
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill {}: {}", command.program.display(), e);
    }
}

async fn forward_lines<R>(reader: R, tx: mpsc::UnboundedSender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                if tx.send(line).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let command = CommandSpec::new("pyinstaller")
            .arg("--name")
            .arg("My App")
            .arg("app.py");
        assert_eq!(command.to_string(), "pyinstaller --name \"My App\" app.py");
    }

    #[test]
    fn builder_collects_arguments_in_order() {
        let command = CommandSpec::new("pip")
            .args(["install", "--upgrade"])
            .arg("requests")
            .current_dir("/tmp");
        assert_eq!(
            command.arg_strings(),
            vec!["install", "--upgrade", "requests"]
        );
        assert_eq!(command.program(), Path::new("pip"));
    }

    #[test]
    fn secret_arguments_are_passed_but_never_shown() {
        let command = CommandSpec::new("tool")
            .arg("/p")
            .arg_secret("hunter2")
            .arg("target");

        assert_eq!(command.arg_strings(), vec!["/p", "hunter2", "target"]);
        assert_eq!(command.to_string(), "tool /p **** target");
        assert!(!format!("{command:?}").contains("hunter2"));
    }
}
