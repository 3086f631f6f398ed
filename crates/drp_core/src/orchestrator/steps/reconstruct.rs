//! Reconstruct stage: dispatch the frame set to the selected backend.

use crate::backends::backend_for;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunState, StepOutcome};

pub struct ReconstructStep;

impl ReconstructStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReconstructStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ReconstructStep {
    fn name(&self) -> &str {
        "Reconstruct"
    }

    fn validate_input(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        if !state.has_frames() {
            return Err(StepError::precondition_failed(
                "no extracted frames available",
            ));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let backend = backend_for(ctx.config.backend, &ctx.config.tools)?;
        ctx.logger
            .info(&format!("Reconstruction method: {}", backend.name()));

        let frames_dir = state
            .frame_set
            .as_ref()
            .map(|f| f.directory.clone())
            .ok_or_else(|| StepError::precondition_failed("no extracted frames available"))?;

        let result = backend.reconstruct(
            &frames_dir,
            &ctx.config.output_root,
            &ctx.runner,
            &ctx.logger,
        )?;

        // The result is recorded before judging it so a failure report
        // still carries the backend's notes and partial output paths.
        let success = result.success;
        let notes = result.notes.join("; ");
        state.reconstruction = Some(result);

        if !success {
            return Err(StepError::postcondition_failed(format!(
                "{} finished without a usable dataset: {}",
                backend.name(),
                notes
            )));
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.reconstruction {
            Some(result) if result.success => Ok(()),
            _ => Err(StepError::postcondition_failed(
                "reconstruction result not recorded",
            )),
        }
    }
}
