//! Extract stage: turn the source video(s) into a single frame set.
//!
//! A file source yields one per-video frame directory used in place. A
//! folder source is processed video by video; one bad video is a
//! warning, not a run failure, as long as something was extracted. When
//! more than one video contributed frames they are merged by copy into
//! one combined directory, because every backend consumes exactly one
//! image folder.

use std::fs;

use crate::extraction::{discover_videos, extract_video_frames, ExtractionOutcome};
use crate::models::{FrameSet, VideoSource};
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

/// Name of the merged frame directory for multi-video runs.
const COMBINED_DIR: &str = "combined";

pub struct ExtractStep;

impl ExtractStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExtractStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ExtractStep {
    fn name(&self) -> &str {
        "Extract"
    }

    fn validate_input(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        if !ctx.config.source_path.exists() {
            return Err(StepError::precondition_failed(format!(
                "video path not found: {}",
                ctx.config.source_path.display()
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let frames_root = ctx.config.frames_root();
        fs::create_dir_all(&frames_root)
            .map_err(|e| StepError::io("creating frames directory", e))?;

        let videos = if ctx.config.source_path.is_dir() {
            let videos = discover_videos(&ctx.config.source_path)
                .map_err(|e| StepError::io("scanning video folder", e))?;
            if videos.is_empty() {
                return Err(StepError::precondition_failed(format!(
                    "no video files found in {}",
                    ctx.config.source_path.display()
                )));
            }
            ctx.logger
                .info(&format!("Found {} videos to process", videos.len()));
            videos
        } else {
            vec![VideoSource::new(&ctx.config.source_path)]
        };

        let total = videos.len();
        let mut outcomes: Vec<ExtractionOutcome> = Vec::new();

        for (i, video) in videos.iter().enumerate() {
            if total > 1 {
                ctx.logger.info(&format!(
                    "Processing video {}/{}: {}",
                    i + 1,
                    total,
                    video.stem
                ));
            }

            match extract_video_frames(
                video,
                &frames_root,
                ctx.config.frame_rate,
                &ctx.config.tools,
                &ctx.runner,
                &ctx.logger,
            ) {
                Ok(outcome) => outcomes.push(outcome),
                // One bad video must not sink a folder run.
                Err(e) if total > 1 => {
                    ctx.logger
                        .warn(&format!("Skipping {}: {}", video.stem, e));
                }
                Err(e) => return Err(e),
            }
        }

        if outcomes.is_empty() {
            return Err(StepError::other("no frames extracted from any video"));
        }

        state.video_count = outcomes.len();
        state.tagged_frames = sum_tagged(&outcomes);

        let frame_set = if outcomes.len() > 1 {
            merge_frame_dirs(&outcomes, &frames_root, ctx)?
        } else {
            let outcome = &outcomes[0];
            let frames = crate::extraction::list_frames(&outcome.frame_dir)?;
            FrameSet::new(&outcome.frame_dir, frames, false)
        };

        ctx.logger.info(&format!(
            "Total frames for reconstruction: {}",
            frame_set.len()
        ));
        state.frame_set = Some(frame_set);

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if !state.has_frames() {
            return Err(StepError::postcondition_failed(
                "extraction recorded no frames",
            ));
        }
        Ok(())
    }
}

/// Total tagged frames across videos, if embedding ran for any of them.
fn sum_tagged(outcomes: &[ExtractionOutcome]) -> Option<usize> {
    let mut any = false;
    let mut sum = 0;
    for outcome in outcomes {
        if let Some((tagged, _)) = outcome.tagged {
            any = true;
            sum += tagged;
        }
    }
    any.then_some(sum)
}

/// Copy every video's frames into one combined directory, then drop the
/// per-video directories. Frame names are stem-prefixed so nothing
/// collides.
fn merge_frame_dirs(
    outcomes: &[ExtractionOutcome],
    frames_root: &std::path::Path,
    ctx: &Context,
) -> StepResult<FrameSet> {
    let combined = frames_root.join(COMBINED_DIR);
    fs::create_dir_all(&combined)
        .map_err(|e| StepError::io("creating combined frames directory", e))?;

    ctx.logger.info(&format!(
        "Merging frames from {} videos into {}",
        outcomes.len(),
        combined.display()
    ));

    for outcome in outcomes {
        let frames = crate::extraction::list_frames(&outcome.frame_dir)?;
        for frame in &frames {
            let Some(name) = frame.file_name() else { continue };
            fs::copy(frame, combined.join(name))
                .map_err(|e| StepError::io("copying frame into combined directory", e))?;
        }
        fs::remove_dir_all(&outcome.frame_dir)
            .map_err(|e| StepError::io("removing per-video frame directory", e))?;
    }

    let frames = crate::extraction::list_frames(&combined)?;
    Ok(FrameSet::new(combined, frames, true))
}
