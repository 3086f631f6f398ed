//! Settings struct with TOML-based sections.
//!
//! Settings hold durable preferences (tool locations, default output
//! folder, extraction defaults). Per-run input such as the source video
//! comes from the caller and is merged into a `PipelineConfig`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::models::{BackendKind, ToolPaths};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolSettings,

    /// Frame extraction defaults.
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Tool paths as the pipeline consumes them.
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            ffmpeg: PathBuf::from(&self.tools.ffmpeg),
            exiftool: non_empty(&self.tools.exiftool),
            colmap: non_empty(&self.tools.colmap),
            metashape: non_empty(&self.tools.metashape),
            realityscan: non_empty(&self.tools.realityscan),
        }
    }

    /// Logging configuration as the run logger consumes it.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: if self.logging.debug {
                LogLevel::Debug
            } else {
                LogLevel::Info
            },
            compact: self.logging.compact,
            error_tail: self.logging.error_tail as usize,
            show_timestamps: self.logging.show_timestamps,
        }
    }
}

fn non_empty(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

/// Output and log directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Default output folder for reconstruction runs.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for run log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_output_folder() -> String {
    "reconstruction_output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// External tool locations.
///
/// `ffmpeg` may be a bare name (resolved on `PATH`); the reconstruction
/// tools are installed applications and usually need an explicit path.
/// An empty string means "not configured".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Frame extraction tool.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// Geotagging tool (optional).
    #[serde(default = "default_exiftool")]
    pub exiftool: String,

    /// COLMAP executable.
    #[serde(default)]
    pub colmap: String,

    /// Agisoft Metashape executable.
    #[serde(default)]
    pub metashape: String,

    /// RealityScan executable.
    #[serde(default)]
    pub realityscan: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_exiftool() -> String {
    "exiftool".to_string()
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            exiftool: default_exiftool(),
            colmap: String::new(),
            metashape: String::new(),
            realityscan: String::new(),
        }
    }
}

/// Frame extraction defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSettings {
    /// Default frame extraction rate in fps.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Default reconstruction backend.
    #[serde(default)]
    pub backend: BackendKind,
}

fn default_frame_rate() -> f64 {
    2.0
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            backend: BackendKind::default(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Suppress external tool output (errors still show the tail).
    #[serde(default)]
    pub compact: bool,

    /// Include debug-level messages.
    #[serde(default)]
    pub debug: bool,

    /// Number of recent tool-output lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix log lines with timestamps.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,
}

fn default_error_tail() -> u32 {
    20
}

fn default_true() -> bool {
    true
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: false,
            debug: false,
            error_tail: default_error_tail(),
            show_timestamps: default_true(),
        }
    }
}
