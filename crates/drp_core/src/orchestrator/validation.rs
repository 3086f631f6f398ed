//! Pre-run configuration validation.
//!
//! Everything that can be checked without spawning a process is checked
//! here, before any output directory is touched. All problems are
//! collected so the user fixes them in one round trip.

use crate::io::resolve_tool;
use crate::models::PipelineConfig;

/// Validate a run configuration. Returns all problems found.
pub fn validate_run(config: &PipelineConfig) -> Vec<String> {
    let mut issues = Vec::new();

    if config.source_path.as_os_str().is_empty() {
        issues.push("video path is required".to_string());
    } else if !config.source_path.exists() {
        issues.push(format!(
            "video path not found: {}",
            config.source_path.display()
        ));
    }

    if config.output_root.as_os_str().is_empty() {
        issues.push("output directory is required".to_string());
    }

    if !(config.frame_rate > 0.0) {
        issues.push(format!(
            "frame rate must be positive (got {})",
            config.frame_rate
        ));
    }

    if resolve_tool(&config.tools.ffmpeg).is_none() {
        issues.push(format!(
            "ffmpeg not found: {}",
            config.tools.ffmpeg.display()
        ));
    }

    match config.tools.backend_tool(config.backend) {
        None => issues.push(format!(
            "no executable configured for the {} backend",
            config.backend
        )),
        Some(tool) => {
            if resolve_tool(tool).is_none() {
                issues.push(format!(
                    "{} executable not found: {}",
                    config.backend,
                    tool.display()
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BackendKind, ToolPaths};
    use std::fs;
    use std::path::PathBuf;

    fn valid_config(dir: &std::path::Path) -> PipelineConfig {
        let video = dir.join("flight.mp4");
        let colmap = dir.join("colmap");
        fs::write(&video, b"").unwrap();
        fs::write(&colmap, b"").unwrap();
        PipelineConfig {
            source_path: video,
            output_root: dir.join("out"),
            frame_rate: 2.0,
            backend: BackendKind::Colmap,
            tools: ToolPaths {
                // `sh` stands in for ffmpeg; only existence is checked here.
                ffmpeg: PathBuf::from("sh"),
                colmap: Some(colmap),
                ..ToolPaths::default()
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_run(&valid_config(dir.path())).is_empty());
    }

    #[test]
    fn missing_source_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.source_path = dir.path().join("absent.mp4");
        let issues = validate_run(&config);
        assert!(issues.iter().any(|i| i.contains("video path not found")));
    }

    #[test]
    fn all_issues_collected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.source_path = PathBuf::new();
        config.frame_rate = 0.0;
        config.tools.colmap = None;
        let issues = validate_run(&config);
        assert!(issues.len() >= 3);
    }

    #[test]
    fn nan_frame_rate_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.frame_rate = f64::NAN;
        assert!(!validate_run(&config).is_empty());
    }

    #[test]
    fn unconfigured_backend_tool_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = valid_config(dir.path());
        config.backend = BackendKind::Metashape;
        let issues = validate_run(&config);
        assert!(issues.iter().any(|i| i.contains("Metashape")));
    }
}
