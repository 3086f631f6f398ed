//! Reconstruction backends.
//!
//! Three structurally different external tools are driven through one
//! contract: given a frame directory and an output root, produce the
//! conventional `images/` + `sparse/0/` dataset layout consumed by
//! downstream Gaussian-splatting pipelines.

pub mod colmap;
pub mod metashape;
pub mod realityscan;

use std::path::Path;

use crate::io::CommandRunner;
use crate::logging::RunLogger;
use crate::models::{BackendKind, ReconstructionResult, ToolPaths};
use crate::orchestrator::errors::{StepError, StepResult};

pub use colmap::ColmapBackend;
pub use metashape::MetashapeBackend;
pub use realityscan::RealityScanBackend;

/// Uniform contract over the three reconstruction tools.
///
/// An `Err` is a hard failure (mandatory step exited non-zero, tool
/// missing). An `Ok` with `success = false` is a soft failure: the tool
/// ran but a postcondition did not hold, and partial output is left in
/// place for inspection.
pub trait ReconstructionBackend {
    /// Backend name for logs and error context.
    fn name(&self) -> &'static str;

    /// Run the backend's external invocations.
    fn reconstruct(
        &self,
        frames_dir: &Path,
        output_root: &Path,
        runner: &CommandRunner,
        logger: &RunLogger,
    ) -> StepResult<ReconstructionResult>;
}

/// Select the backend implementation for `kind`.
///
/// Fails when the backend's executable is not configured; existence of
/// the executable is checked during validation.
pub fn backend_for(
    kind: BackendKind,
    tools: &ToolPaths,
) -> StepResult<Box<dyn ReconstructionBackend>> {
    let tool = tools
        .backend_tool(kind)
        .ok_or_else(|| {
            StepError::precondition_failed(format!(
                "no executable configured for the {} backend",
                kind
            ))
        })?
        .to_path_buf();

    Ok(match kind {
        BackendKind::Colmap => Box::new(ColmapBackend::new(tool)),
        BackendKind::Metashape => Box::new(MetashapeBackend::new(tool)),
        BackendKind::RealityScan => Box::new(RealityScanBackend::new(tool)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn backend_selection_requires_configured_tool() {
        let tools = ToolPaths::default();
        assert!(backend_for(BackendKind::Colmap, &tools).is_err());

        let tools = ToolPaths {
            colmap: Some(PathBuf::from("/opt/colmap/colmap")),
            ..ToolPaths::default()
        };
        let backend = backend_for(BackendKind::Colmap, &tools).unwrap();
        assert_eq!(backend.name(), "COLMAP");
    }
}
