//! Frame extraction from source videos.

pub mod discovery;
pub mod frames;

pub use discovery::discover_videos;
pub use frames::{extract_video_frames, ffmpeg_extract_command, list_frames, ExtractionOutcome};
