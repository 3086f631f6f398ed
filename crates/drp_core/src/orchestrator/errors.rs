//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Stage → Operation → Detail

use std::io;

use thiserror::Error;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage failed during execution.
    #[error("Run '{run_name}' failed at stage '{stage_name}': {source}")]
    StageFailed {
        run_name: String,
        stage_name: String,
        #[source]
        source: StepError,
    },

    /// Configuration validation failed before any process was spawned.
    #[error("Run '{run_name}' failed validation: {message}")]
    ValidationFailed { run_name: String, message: String },

    /// Failed to set up the run (create directories, open log).
    #[error("Run '{run_name}' setup failed: {message}")]
    SetupFailed { run_name: String, message: String },
}

impl PipelineError {
    pub fn stage_failed(
        run_name: impl Into<String>,
        stage_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StageFailed {
            run_name: run_name.into(),
            stage_name: stage_name.into(),
            source,
        }
    }

    pub fn validation_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }

    pub fn setup_failed(run_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            run_name: run_name.into(),
            message: message.into(),
        }
    }
}

/// Error from a pipeline stage with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    /// A required external executable is absent.
    #[error("Required tool not found: {tool} (looked at {path})")]
    ToolMissing { tool: String, path: String },

    /// An external command exited non-zero.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// An expected output artifact is absent after a nominally
    /// successful external call.
    #[error("Postcondition failed: {0}")]
    PostconditionFailed(String),

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Generic stage error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    pub fn tool_missing(tool: impl Into<String>, path: impl Into<String>) -> Self {
        Self::ToolMissing {
            tool: tool.into(),
            path: path.into(),
        }
    }

    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    pub fn postcondition_failed(message: impl Into<String>) -> Self {
        Self::PostconditionFailed(message.into())
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<crate::io::RunnerError> for StepError {
    fn from(err: crate::io::RunnerError) -> Self {
        StepError::Other(err.to_string())
    }
}

/// Result type for stage operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_error_displays_context() {
        let err = StepError::command_failed("colmap", 1, "mapper diverged");
        let msg = err.to_string();
        assert!(msg.contains("colmap"));
        assert!(msg.contains("exit code 1"));
        assert!(msg.contains("mapper diverged"));
    }

    #[test]
    fn pipeline_error_chains_context() {
        let step = StepError::tool_missing("ffmpeg", "/opt/ffmpeg/bin/ffmpeg");
        let err = PipelineError::stage_failed("flight_0042", "Extract", step);
        let msg = err.to_string();
        assert!(msg.contains("flight_0042"));
        assert!(msg.contains("Extract"));
    }
}
