//! Terminal artifacts of a pipeline run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::enums::BackendKind;

/// Outcome of one reconstruction backend invocation.
///
/// The layout fields always describe where output *would* be; `success`
/// says whether the backend's postconditions actually held. Partial
/// output is left in place either way so the user can inspect it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconstructionResult {
    /// Whether the backend produced a usable dataset.
    pub success: bool,
    /// Directory of (possibly undistorted) images.
    pub images_dir: PathBuf,
    /// Directory of camera poses and sparse points.
    pub sparse_dir: PathBuf,
    /// Free-form diagnostic notes accumulated during the run.
    pub notes: Vec<String>,
}

impl ReconstructionResult {
    pub fn new(images_dir: impl Into<PathBuf>, sparse_dir: impl Into<PathBuf>) -> Self {
        Self {
            success: true,
            images_dir: images_dir.into(),
            sparse_dir: sparse_dir.into(),
            notes: Vec::new(),
        }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.notes.push(message.into());
    }
}

/// Summary of a whole pipeline run, written to `run_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier (source stem).
    pub run_name: String,
    /// Overall outcome.
    pub success: bool,
    /// Backend that was dispatched.
    pub backend: BackendKind,
    /// Number of input videos processed.
    pub video_count: usize,
    /// Total frames extracted across all videos.
    pub frame_count: usize,
    /// Frames that received embedded geotags, if embedding ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagged_frames: Option<usize>,
    /// Reconstruction outcome, if that stage was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconstruction: Option<ReconstructionResult>,
    /// Path of the run log file.
    pub log_path: PathBuf,
}
