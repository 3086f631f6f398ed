//! Per-run pipeline configuration.
//!
//! A `PipelineConfig` is built once per run from external input (CLI
//! arguments merged over the settings file) and is immutable for the
//! whole run. The core never reads ambient global state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::BackendKind;

/// Paths to the external executables the pipeline invokes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolPaths {
    /// Frame extraction tool (required).
    pub ffmpeg: PathBuf,
    /// Geotagging tool (optional; embedding is skipped without it).
    pub exiftool: Option<PathBuf>,
    /// COLMAP executable (required for the COLMAP backend).
    pub colmap: Option<PathBuf>,
    /// Metashape executable (required for the Metashape backend).
    pub metashape: Option<PathBuf>,
    /// RealityScan executable (required for the RealityScan backend).
    pub realityscan: Option<PathBuf>,
}

impl ToolPaths {
    /// Path of the executable the selected backend needs, if configured.
    pub fn backend_tool(&self, backend: BackendKind) -> Option<&Path> {
        match backend {
            BackendKind::Colmap => self.colmap.as_deref(),
            BackendKind::Metashape => self.metashape.as_deref(),
            BackendKind::RealityScan => self.realityscan.as_deref(),
        }
    }
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input video file, or a folder of videos.
    pub source_path: PathBuf,
    /// Root directory for all run output.
    pub output_root: PathBuf,
    /// Target frame extraction rate in fps (must be > 0).
    pub frame_rate: f64,
    /// Selected reconstruction backend.
    pub backend: BackendKind,
    /// External tool locations.
    pub tools: ToolPaths,
}

impl PipelineConfig {
    /// Directory that receives extracted frames, under the output root.
    pub fn frames_root(&self) -> PathBuf {
        self.output_root.join("frames")
    }

    /// Run name derived from the source stem, used for the log file.
    pub fn run_name(&self) -> String {
        self.source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            source_path: PathBuf::from("/data/flight.mp4"),
            output_root: PathBuf::from("/out"),
            frame_rate: 2.0,
            backend: BackendKind::Colmap,
            tools: ToolPaths {
                colmap: Some(PathBuf::from("/opt/colmap/colmap")),
                ..ToolPaths::default()
            },
        }
    }

    #[test]
    fn frames_root_under_output() {
        assert_eq!(config().frames_root(), PathBuf::from("/out/frames"));
    }

    #[test]
    fn backend_tool_selection() {
        let cfg = config();
        assert_eq!(
            cfg.tools.backend_tool(BackendKind::Colmap),
            Some(Path::new("/opt/colmap/colmap"))
        );
        assert!(cfg.tools.backend_tool(BackendKind::Metashape).is_none());
    }

    #[test]
    fn run_name_from_stem() {
        assert_eq!(config().run_name(), "flight");
    }
}
