//! One pipeline stage run as an external child process.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Output captured from a stage execution.
#[derive(Debug, Clone)]
pub struct StageOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for one decode or encode invocation.
///
/// The process is spawned with captured output and awaited to completion.
/// Unlike a spawn failure, a non-zero exit is not an error here: the status
/// is returned to the caller, which records it as a per-task stage failure.
///
/// # Example
///
/// ```no_run
/// use audioforge::pipeline::StageCommand;
/// use std::path::PathBuf;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> audioforge::Result<()> {
/// let output = StageCommand::new(PathBuf::from("lame"))
///     .arg("--decode")
///     .arg("song.mp3")
///     .arg("/tmp/song.wav")
///     .run(&CancellationToken::new())
///     .await?;
/// println!("exit: {}", output.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StageCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl StageCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Limit the execution time.  No limit by default.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = Some(d);
        self
    }

    /// Spawn the process and block until it exits, capturing output.
    ///
    /// # Errors
    ///
    /// - [`Error::Tool`] if spawning fails.
    /// - [`Error::Tool`] if the timeout elapses or `cancel` fires; the child
    ///   is killed in both cases.
    /// - [`Error::Tool`] on an I/O error while waiting.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<StageOutput> {
        let program_name = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());
        // Dropping the wait future (timeout/cancel) must not leak the child.
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            Error::tool(program_name.clone(), format!("failed to spawn: {e}"))
        })?;

        let wait = child.wait_with_output();

        let result = match self.timeout {
            Some(limit) => tokio::select! {
                res = tokio::time::timeout(limit, wait) => match res {
                    Ok(inner) => inner,
                    Err(_elapsed) => {
                        return Err(Error::tool(
                            program_name,
                            format!("timed out after {limit:?}"),
                        ));
                    }
                },
                _ = cancel.cancelled() => {
                    return Err(Error::tool(program_name, "cancelled"));
                }
            },
            None => tokio::select! {
                res = wait => res,
                _ = cancel.cancelled() => {
                    return Err(Error::tool(program_name, "cancelled"));
                }
            },
        };

        let output = result.map_err(|e| {
            Error::tool(
                program_name,
                format!("I/O error waiting for process: {e}"),
            )
        })?;

        Ok(StageOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
