//! Data models shared across the pipeline.

pub mod enums;
pub mod media;
pub mod results;
pub mod run;

pub use enums::BackendKind;
pub use media::{FrameSet, VideoSource};
pub use results::{ReconstructionResult, RunReport};
pub use run::{PipelineConfig, ToolPaths};
