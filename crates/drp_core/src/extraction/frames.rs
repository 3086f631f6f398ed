//! Per-video frame extraction and best-effort geotag embedding.
//!
//! State machine per video: check tool, extract, then (when a sibling
//! telemetry file exists and the tagging tool is configured) parse the
//! log and embed one geotag per frame. Embedding is best-effort: a
//! failed tag never fails the stage, and the stage succeeds whenever at
//! least one frame was extracted.

use std::fs;
use std::path::{Path, PathBuf};

use crate::geotag::exiftool_command;
use crate::io::{resolve_tool, CommandRunner};
use crate::logging::RunLogger;
use crate::models::{ToolPaths, VideoSource};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::telemetry::{nearest_fix, parse_telemetry_file};

/// JPEG quality parameter passed to the extractor (2 = visually lossless).
const JPEG_QUALITY: u32 = 2;

/// Result of extracting (and optionally tagging) one video.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// Directory holding this video's frames.
    pub frame_dir: PathBuf,
    /// Number of frames produced.
    pub frame_count: usize,
    /// `(tagged, total)` when geotag embedding ran.
    pub tagged: Option<(usize, usize)>,
}

/// Compose the ffmpeg frame extraction command.
pub fn ffmpeg_extract_command(ffmpeg: &Path, video: &Path, pattern: &Path, fps: f64) -> String {
    format!(
        "\"{}\" -i \"{}\" -vf fps={} -q:v {} \"{}\"",
        ffmpeg.display(),
        video.display(),
        fps,
        JPEG_QUALITY,
        pattern.display()
    )
}

/// Extract frames from one video into `frames_root/<stem>/`.
pub fn extract_video_frames(
    video: &VideoSource,
    frames_root: &Path,
    frame_rate: f64,
    tools: &ToolPaths,
    runner: &CommandRunner,
    logger: &RunLogger,
) -> StepResult<ExtractionOutcome> {
    let ffmpeg = resolve_tool(&tools.ffmpeg).ok_or_else(|| {
        StepError::tool_missing("ffmpeg", tools.ffmpeg.display().to_string())
    })?;
    logger.info(&format!("Using ffmpeg: {}", ffmpeg.display()));

    let frame_dir = frames_root.join(&video.stem);
    fs::create_dir_all(&frame_dir)
        .map_err(|e| StepError::io("creating frame directory", e))?;

    let pattern = frame_dir.join(format!("{}_frame_%04d.jpg", video.stem));
    let cmd = ffmpeg_extract_command(&ffmpeg, &video.path, &pattern, frame_rate);

    logger.info(&format!("Extracting frames at {} fps...", frame_rate));
    logger.command(&cmd);

    let exit_code = runner.run(&cmd, |line| logger.output_line(line))?;
    if exit_code != 0 {
        return Err(StepError::command_failed(
            "ffmpeg",
            exit_code,
            format!("frame extraction failed for {}", video.path.display()),
        ));
    }

    let frames = list_frames(&frame_dir)?;
    logger.info(&format!(
        "Extracted {} frames to: {}",
        frames.len(),
        frame_dir.display()
    ));

    if frames.is_empty() {
        return Err(StepError::other(format!(
            "no frames extracted from {}",
            video.path.display()
        )));
    }

    let tagged = embed_geotags(video, &frames, frame_rate, tools, runner, logger);

    Ok(ExtractionOutcome {
        frame_dir,
        frame_count: frames.len(),
        tagged,
    })
}

/// List a directory's `.jpg` frames in sorted order.
pub fn list_frames(dir: &Path) -> StepResult<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in dir
        .read_dir()
        .map_err(|e| StepError::io("listing frames", e))?
    {
        let entry = entry.map_err(|e| StepError::io("listing frames", e))?;
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "jpg") {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// Embed telemetry-derived geotags into the extracted frames.
///
/// Returns `Some((tagged, total))` when embedding ran, `None` when it
/// was skipped. Skipping (no telemetry file, no tagging tool, empty
/// log) is informational, never an error.
fn embed_geotags(
    video: &VideoSource,
    frames: &[PathBuf],
    frame_rate: f64,
    tools: &ToolPaths,
    runner: &CommandRunner,
    logger: &RunLogger,
) -> Option<(usize, usize)> {
    let Some(telemetry_path) = video.telemetry_path() else {
        logger.info("No telemetry file found for this video - skipping geotag embedding");
        return None;
    };

    let Some(exiftool) = tools.exiftool.as_deref().and_then(resolve_tool) else {
        logger.info("No exiftool configured - skipping geotag embedding");
        return None;
    };

    logger.info(&format!(
        "Found telemetry file: {}",
        telemetry_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    ));
    logger.info("Parsing GPS data...");

    let fixes = match parse_telemetry_file(&telemetry_path) {
        Ok(fixes) => fixes,
        Err(e) => {
            logger.warn(&format!("Failed to read telemetry file: {}", e));
            return None;
        }
    };

    if fixes.is_empty() {
        logger.warn("No GPS data found in telemetry file");
        return None;
    }

    logger.info(&format!("Parsed {} GPS fixes from telemetry", fixes.len()));
    logger.info("Embedding geotags into frames...");

    let mut tagged = 0;
    for (index, frame) in frames.iter().enumerate() {
        // Assumed capture time of frame N at the extraction rate.
        let timestamp = index as f64 / frame_rate;
        let fix = nearest_fix(&fixes, timestamp);
        if !fix.valid {
            continue;
        }

        let cmd = exiftool_command(&exiftool, frame, &fix);
        // Tag output is suppressed; per-frame failure is counted, not fatal.
        match runner.run(&cmd, |_| {}) {
            Ok(0) => tagged += 1,
            Ok(code) => {
                logger.debug(&format!(
                    "exiftool exit {} for {}",
                    code,
                    frame.display()
                ));
            }
            Err(e) => logger.debug(&format!("exiftool failed to start: {}", e)),
        }
    }

    logger.info(&format!(
        "Embedded GPS data into {}/{} frames",
        tagged,
        frames.len()
    ));
    Some((tagged, frames.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn command_contains_pattern_and_rate() {
        let cmd = ffmpeg_extract_command(
            &PathBuf::from("/opt/ffmpeg/bin/ffmpeg"),
            &PathBuf::from("/data/DJI_0042.MP4"),
            &PathBuf::from("/out/frames/DJI_0042/DJI_0042_frame_%04d.jpg"),
            2.5,
        );
        assert!(cmd.starts_with("\"/opt/ffmpeg/bin/ffmpeg\" -i \"/data/DJI_0042.MP4\""));
        assert!(cmd.contains("-vf fps=2.5"));
        assert!(cmd.contains("-q:v 2"));
        assert!(cmd.contains("DJI_0042_frame_%04d.jpg"));
    }

    #[test]
    fn integer_rate_formats_bare() {
        let cmd = ffmpeg_extract_command(
            &PathBuf::from("ffmpeg"),
            &PathBuf::from("in.mp4"),
            &PathBuf::from("out_%04d.jpg"),
            1.0,
        );
        assert!(cmd.contains("fps=1 "));
    }

    #[test]
    fn list_frames_sorted_jpg_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b_frame_0002.jpg", "a_frame_0001.jpg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let frames = list_frames(dir.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].ends_with("a_frame_0001.jpg"));
        assert!(frames[1].ends_with("b_frame_0002.jpg"));
    }
}
