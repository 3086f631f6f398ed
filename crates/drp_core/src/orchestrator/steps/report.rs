//! Report stage: summarize the run as `run_report.json`.

use std::fs;

use crate::models::RunReport;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

/// Report filename under the output root.
pub const REPORT_FILENAME: &str = "run_report.json";

/// Build a run report from the accumulated state.
pub fn build_report(ctx: &Context, state: &RunState, success: bool) -> RunReport {
    RunReport {
        run_name: ctx.run_name.clone(),
        success,
        backend: ctx.config.backend,
        video_count: state.video_count,
        frame_count: state.frame_count(),
        tagged_frames: state.tagged_frames,
        reconstruction: state.reconstruction.clone(),
        log_path: ctx.logger.log_path().to_path_buf(),
    }
}

/// Serialize and write a report under the output root.
pub fn write_report(ctx: &Context, report: &RunReport) -> StepResult<()> {
    let path = ctx.config.output_root.join(REPORT_FILENAME);
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| StepError::other(format!("serializing run report: {}", e)))?;
    fs::write(&path, json).map_err(|e| StepError::io("writing run report", e))?;
    ctx.logger
        .info(&format!("Run report written to {}", path.display()));
    Ok(())
}

pub struct ReportStep;

impl ReportStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReportStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ReportStep {
    fn name(&self) -> &str {
        "Report"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if state.reconstruction.is_none() {
            return Err(StepError::precondition_failed(
                "reconstruction did not run",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let report = build_report(ctx, state, true);
        write_report(ctx, &report)?;

        ctx.logger.success("Pipeline complete!");
        ctx.logger.info(&format!(
            "{} frames from {} video(s), reconstructed with {}",
            report.frame_count, report.video_count, report.backend
        ));
        ctx.logger.info(&format!(
            "Output: {}",
            ctx.config.output_root.display()
        ));

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, _state: &RunState) -> StepResult<()> {
        let path = ctx.config.output_root.join(REPORT_FILENAME);
        if !path.is_file() {
            return Err(StepError::postcondition_failed(format!(
                "report file missing: {}",
                path.display()
            )));
        }
        Ok(())
    }
}
