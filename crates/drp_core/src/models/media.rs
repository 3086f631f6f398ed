//! Source video and frame set models.

use std::path::{Path, PathBuf};

/// A single input video and its derived stem name.
///
/// The stem namespaces the per-video frame directory and the frame
/// filename pattern, so two videos never collide on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    /// Absolute path to the video file.
    pub path: PathBuf,
    /// Filename without extension.
    pub stem: String,
}

impl VideoSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        Self { path, stem }
    }

    /// Sibling telemetry file, if one exists next to the video.
    ///
    /// The extension match is case-insensitive (`.SRT` is checked first,
    /// matching how drone firmware names the file).
    pub fn telemetry_path(&self) -> Option<PathBuf> {
        for ext in ["SRT", "srt"] {
            let candidate = self.path.with_extension(ext);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

/// An ordered set of extracted frames and the directory holding them.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    /// Directory containing the frames (per-video or merged).
    pub directory: PathBuf,
    /// Ordered frame file paths.
    pub frames: Vec<PathBuf>,
    /// True when frames from multiple videos were merged by copy.
    pub merged: bool,
}

impl FrameSet {
    pub fn new(directory: impl Into<PathBuf>, frames: Vec<PathBuf>, merged: bool) -> Self {
        Self {
            directory: directory.into(),
            frames,
            merged,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}
