//! Core types for the orchestrator pipeline.

use std::sync::Arc;

use crate::config::Settings;
use crate::io::CommandRunner;
use crate::logging::RunLogger;
use crate::models::{FrameSet, PipelineConfig, ReconstructionResult};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (stage_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline stages.
///
/// Contains run configuration and shared resources that stages can read
/// but not modify. Mutable state goes in `RunState`.
pub struct Context {
    /// Immutable run configuration.
    pub config: PipelineConfig,
    /// Application settings.
    pub settings: Settings,
    /// Run name/identifier (source stem).
    pub run_name: String,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
    /// External process runner.
    pub runner: CommandRunner,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a new context for a run.
    pub fn new(config: PipelineConfig, settings: Settings, logger: Arc<RunLogger>) -> Self {
        let run_name = config.run_name();
        Self {
            config,
            settings,
            run_name,
            logger,
            runner: CommandRunner::new(),
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, stage_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(stage_name, percent, message);
        }
    }
}

/// Mutable run state that accumulates results from pipeline stages.
///
/// Stages append new data; they never overwrite what an earlier stage
/// recorded.
#[derive(Debug, Default)]
pub struct RunState {
    /// When the run started.
    pub started_at: Option<String>,
    /// Number of input videos processed.
    pub video_count: usize,
    /// Frames handed to reconstruction (from the Extract stage).
    pub frame_set: Option<FrameSet>,
    /// Total frames that received embedded geotags, if embedding ran.
    pub tagged_frames: Option<usize>,
    /// Reconstruction outcome (from the Reconstruct stage).
    pub reconstruction: Option<ReconstructionResult>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    /// Check if extraction has been completed.
    pub fn has_frames(&self) -> bool {
        self.frame_set.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Total frames extracted.
    pub fn frame_count(&self) -> usize {
        self.frame_set.as_ref().map_or(0, |f| f.len())
    }
}

/// Result of executing a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Stage completed successfully.
    Success,
    /// Stage was skipped (preconditions not met, but not an error).
    Skipped(String),
}
