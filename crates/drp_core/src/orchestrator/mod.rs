//! Pipeline orchestrator for coordinating run execution.
//!
//! A run is a sequence of stages that validate, execute, and record
//! their results:
//!
//! ```text
//! Pipeline
//!     ├── Stage: Extract     (frames + optional geotags)
//!     ├── Stage: Reconstruct (dispatch to the selected backend)
//!     └── Stage: Report      (run_report.json)
//! ```
//!
//! `run_pipeline` is the single entry point: it validates the
//! configuration, sets up the run logger, executes the stages, and
//! writes a run report even when a stage failed.

pub mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;
mod validation;

use std::fs;
use std::sync::Arc;

use crate::config::Settings;
use crate::logging::{LineCallback, RunLogger};
use crate::models::{PipelineConfig, RunReport};

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{ExtractStep, ReconstructStep, ReportStep};
pub use types::{Context, ProgressCallback, RunState, StepOutcome};
pub use validation::validate_run;

/// Run the full reconstruction pipeline for one configuration.
///
/// On success the returned report matches the `run_report.json` written
/// under the output root. On failure a best-effort failure report is
/// written before the error is returned.
pub fn run_pipeline(
    config: PipelineConfig,
    settings: Settings,
    callback: Option<LineCallback>,
) -> PipelineResult<RunReport> {
    let run_name = config.run_name();

    let logger = RunLogger::new(
        run_name.as_str(),
        settings.paths.logs_folder.as_str(),
        settings.log_config(),
        callback,
    )
    .map_err(|e| PipelineError::setup_failed(run_name.clone(), format!("opening run log: {}", e)))?;
    let logger = Arc::new(logger);

    logger.info("=======================================================");
    logger.info("   Drone Reconstruction Pipeline");
    logger.info("=======================================================");
    logger.info("Configuration:");
    if config.source_path.is_dir() {
        logger.info(&format!("  Video Folder: {}", config.source_path.display()));
    } else {
        logger.info(&format!("  Video:       {}", config.source_path.display()));
    }
    logger.info(&format!("  Output:      {}", config.output_root.display()));
    logger.info(&format!("  Frame Rate:  {} fps", config.frame_rate));
    logger.info(&format!("  Method:      {}", config.backend));

    let issues = validate_run(&config);
    if !issues.is_empty() {
        for issue in &issues {
            logger.error(issue);
        }
        return Err(PipelineError::validation_failed(
            run_name.clone(),
            issues.join("; "),
        ));
    }

    fs::create_dir_all(&config.output_root).map_err(|e| {
        PipelineError::setup_failed(run_name.clone(), format!("creating output directory: {}", e))
    })?;

    let ctx = Context::new(config, settings, logger);
    let mut state = RunState::new();

    let pipeline = Pipeline::new()
        .with_step(ExtractStep::new())
        .with_step(ReconstructStep::new())
        .with_step(ReportStep::new());

    match pipeline.run(&ctx, &mut state) {
        Ok(_) => Ok(steps::build_report(&ctx, &state, true)),
        Err(e) => {
            // Best effort: a failed run still gets a report with
            // whatever the completed stages recorded.
            let report = steps::build_report(&ctx, &state, false);
            if let Err(write_err) = steps::write_report(&ctx, &report) {
                ctx.logger
                    .warn(&format!("Could not write failure report: {}", write_err));
            }
            ctx.logger.show_tail("error");
            Err(e)
        }
    }
}
