//! DRP Core - Backend logic for the drone reconstruction pipeline.
//!
//! This crate contains all orchestration logic with zero UI dependencies:
//! video frame extraction, telemetry parsing and geotag embedding, and
//! dispatch to one of three external 3D reconstruction backends. It can
//! be driven by a CLI, a GUI, or tests.

pub mod backends;
pub mod config;
pub mod extraction;
pub mod geotag;
pub mod io;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod telemetry;

pub use config::Settings;
pub use models::{BackendKind, PipelineConfig, ReconstructionResult, RunReport, ToolPaths};
pub use orchestrator::run_pipeline;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
