//! Command runner for external process execution.
//!
//! Runs a fully composed shell command line, streams its combined
//! stdout/stderr to a caller-supplied sink line by line while the
//! process is still running, and returns the exit code. Streaming
//! during execution (rather than after exit) is what keeps a GUI log
//! view live and avoids the fixed-size pipe buffer deadlock with
//! chatty tools.

use std::io::Read;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Errors from launching or draining an external process.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Failed to capture process output")]
    PipeUnavailable,

    #[error("Failed to read process output: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to wait for process: {0}")]
    WaitFailed(#[source] std::io::Error),
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

const READ_CHUNK: usize = 4096;

/// Runs shell command lines and streams their output.
///
/// The command line is expected to be fully quoted by the caller; the
/// runner performs no quoting of its own and never retries.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `command_line` through `sh -c`, forwarding each complete
    /// output line to `sink` as soon as it is available. Blocks until
    /// the process exits and returns its exit code (-1 if the process
    /// was killed by a signal).
    pub fn run<F>(&self, command_line: &str, mut sink: F) -> RunnerResult<i32>
    where
        F: FnMut(&str),
    {
        tracing::debug!(command = command_line, "spawning external process");

        // Fold stderr into stdout inside the shell so one pipe carries
        // the combined, interleaved output.
        let shell_command = format!("exec 2>&1\n{}", command_line);

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&shell_command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(RunnerError::SpawnFailed)?;

        let mut stdout = child.stdout.take().ok_or(RunnerError::PipeUnavailable)?;

        let mut chunk = [0u8; READ_CHUNK];
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let n = stdout.read(&mut chunk).map_err(RunnerError::ReadFailed)?;
            if n == 0 {
                break;
            }
            pending.extend_from_slice(&chunk[..n]);

            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = pending.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
                let line = line.trim_end_matches('\r');
                if !line.is_empty() {
                    sink(line);
                }
            }
        }

        // Flush any residual partial line at end-of-stream.
        if !pending.is_empty() {
            let line = String::from_utf8_lossy(&pending);
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                sink(line);
            }
        }

        let status = child.wait().map_err(RunnerError::WaitFailed)?;
        Ok(status.code().unwrap_or(-1))
    }
}
