//! Video discovery for folder sources.

use std::io;
use std::path::Path;

use crate::models::VideoSource;

/// Container extensions accepted as input videos.
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mov", "avi"];

/// Scan a folder (non-recursively) for video files.
///
/// Extension match is case-insensitive. Results are sorted by path so
/// frame numbering across a multi-video run is deterministic.
pub fn discover_videos(dir: &Path) -> io::Result<Vec<VideoSource>> {
    let mut videos = Vec::new();

    for entry in dir.read_dir()? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
        else {
            continue;
        };
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            videos.push(VideoSource::new(path));
        }
    }

    videos.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(videos)
}
