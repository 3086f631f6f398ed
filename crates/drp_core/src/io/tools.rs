//! External tool resolution.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Resolve a configured tool path to an existing executable.
///
/// A bare name (no directory component) is searched on `PATH`; anything
/// with a directory component must exist as a file at that location.
/// Returns `None` when the tool cannot be found.
pub fn resolve_tool(path: &Path) -> Option<PathBuf> {
    let is_bare_name = path
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        && path.components().count() == 1;

    if is_bare_name {
        let name = path.as_os_str();
        for dir in env::split_paths(&env::var_os("PATH")?) {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        return None;
    }

    if path.is_file() {
        Some(path.to_path_buf())
    } else {
        None
    }
}
