//! RealityScan backend.
//!
//! RealityScan runs as a single headless invocation with chained CLI
//! verbs. It exports under `undistorted/` rather than the output root,
//! does not emit a sparse point cloud, and reports success even when an
//! export silently produced nothing, so postconditions are verified
//! afterwards and an unmet one is a soft failure with partial output
//! left in place.

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::CommandRunner;
use crate::logging::RunLogger;
use crate::models::ReconstructionResult;
use crate::orchestrator::errors::{StepError, StepResult};

use super::ReconstructionBackend;

/// Header written to the placeholder sparse point file.
const POINTS3D_HEADER: &str = "\
# 3D point list with one line of data per point:
# POINT3D_ID, X, Y, Z, R, G, B, ERROR, TRACK[] as (IMAGE_ID, POINT2D_IDX)
# Number of points: 0
";

/// Filesystem layout RealityScan exports into.
#[derive(Debug, Clone)]
pub struct RealityScanLayout {
    pub project_file: PathBuf,
    pub undistorted_dir: PathBuf,
    pub sparse_dir: PathBuf,
    pub images_dir: PathBuf,
    pub registration_file: PathBuf,
    pub points_file: PathBuf,
}

impl RealityScanLayout {
    pub fn new(output_root: &Path) -> Self {
        let undistorted_dir = output_root.join("undistorted");
        let sparse_dir = undistorted_dir.join("sparse").join("0");
        Self {
            project_file: output_root.join("realityscan_project.rsproj"),
            images_dir: undistorted_dir.join("images"),
            registration_file: undistorted_dir.join("sparse").join("registration.txt"),
            points_file: sparse_dir.join("points3D.txt"),
            sparse_dir,
            undistorted_dir,
        }
    }
}

/// Compose the single chained RealityScan invocation.
pub fn realityscan_command(exe: &Path, frames_dir: &Path, layout: &RealityScanLayout) -> String {
    format!(
        "\"{}\" -headless -newScene -addFolder \"{}\" -set appIncSubdirs=false \
         -align -selectMaximalComponent -exportRegistration \"{}\" \
         -exportUndistortedImages \"{}\" -save \"{}\" -quit",
        exe.display(),
        frames_dir.display(),
        layout.registration_file.display(),
        layout.images_dir.display(),
        layout.project_file.display()
    )
}

/// RealityScan reconstruction backend.
pub struct RealityScanBackend {
    exe: PathBuf,
}

impl RealityScanBackend {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

impl ReconstructionBackend for RealityScanBackend {
    fn name(&self) -> &'static str {
        "RealityScan"
    }

    fn reconstruct(
        &self,
        frames_dir: &Path,
        output_root: &Path,
        runner: &CommandRunner,
        logger: &RunLogger,
    ) -> StepResult<ReconstructionResult> {
        logger.info(&format!("Using RealityScan: {}", self.exe.display()));
        logger.info(&format!("Input frames: {}", frames_dir.display()));
        logger.info(&format!("Output: {}", output_root.display()));

        let layout = RealityScanLayout::new(output_root);
        for dir in [&layout.sparse_dir, &layout.images_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| StepError::io("creating RealityScan directories", e))?;
        }

        // RealityScan never exports a point cloud; downstream consumers
        // still expect the file to exist.
        fs::write(&layout.points_file, POINTS3D_HEADER)
            .map_err(|e| StepError::io("writing placeholder points3D.txt", e))?;
        logger.info("Created empty points3D.txt (sparse point export not available)");

        let cmd = realityscan_command(&self.exe, frames_dir, &layout);
        logger.info("Running RealityScan (this may take a while)...");
        logger.command(&cmd);

        let exit_code = runner.run(&cmd, |line| logger.output_line(line))?;
        if exit_code != 0 {
            logger.error("RealityScan processing failed");
            return Err(StepError::command_failed(
                "realityscan",
                exit_code,
                "RealityScan processing failed",
            ));
        }

        logger.info("RealityScan processing complete, checking exports...");

        let mut result =
            ReconstructionResult::new(&layout.images_dir, &layout.sparse_dir);

        if layout.registration_file.is_file() {
            logger.info("Registration exported successfully");
        } else {
            logger.warn("registration.txt was not created - camera registration may have failed");
            result.success = false;
            result.note("registration.txt was not created");
        }

        match count_entries(&layout.images_dir) {
            Ok(n) if n > 0 => {
                logger.info(&format!("Exported {} undistorted images", n));
            }
            _ => {
                logger.warn("No undistorted images were exported");
                result.success = false;
                result.note("no undistorted images were exported");
            }
        }

        if result.success {
            copy_sparse_artifacts(&layout, logger);
            logger.success("RealityScan reconstruction complete");
        } else {
            logger.warn("RealityScan exports need manual verification");
            logger.warn(&format!(
                "Partial output left in: {}",
                layout.undistorted_dir.display()
            ));
        }

        logger.info(&format!("  Images + COLMAP data: {}", layout.images_dir.display()));
        logger.info(&format!("  Sparse: {}", layout.sparse_dir.display()));

        Ok(result)
    }
}

fn count_entries(dir: &Path) -> std::io::Result<usize> {
    Ok(dir.read_dir()?.count())
}

/// Mirror the registration and sparse text/binary artifacts into the
/// images folder, where splatting trainers look for them.
fn copy_sparse_artifacts(layout: &RealityScanLayout, logger: &RunLogger) {
    logger.info("Copying COLMAP files to images folder...");

    let mut copy = |src: &Path| {
        let Some(name) = src.file_name() else { return };
        let dest = layout.images_dir.join(name);
        if dest.exists() {
            return;
        }
        match fs::copy(src, &dest) {
            Ok(_) => logger.info(&format!("  Copied {}", name.to_string_lossy())),
            Err(e) => logger.warn(&format!(
                "Failed to copy {}: {}",
                name.to_string_lossy(),
                e
            )),
        }
    };

    copy(&layout.registration_file);
    copy(&layout.points_file);

    for dir in [layout.undistorted_dir.join("sparse"), layout.sparse_dir.clone()] {
        let Ok(entries) = dir.read_dir() else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_artifact = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "txt" || ext == "bin");
            if is_artifact {
                copy(&path);
            }
        }
    }
}
