//! Agisoft Metashape backend.
//!
//! Metashape has no step-by-step CLI, so the whole job is expressed as
//! a generated Python script run under the application's embedded
//! interpreter (`-r`). The script aligns the frames and exports the
//! camera solution in COLMAP text format so the output layout matches
//! the other backends.

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::CommandRunner;
use crate::logging::RunLogger;
use crate::models::ReconstructionResult;
use crate::orchestrator::errors::{StepError, StepResult};

use super::ReconstructionBackend;

/// How many trailing lines of the tool log to surface on failure.
const LOG_TAIL_LINES: usize = 10;

/// Generate the processing script executed inside Metashape.
///
/// Paths are interpolated into Python raw-string literals, so a path
/// containing a quote character will break the script. Callers pass
/// directories the pipeline itself created, which keeps this out of
/// user-controlled territory.
pub fn metashape_script(frames_dir: &Path, sparse_dir: &Path, output_root: &Path) -> String {
    let images_dir = output_root.join("images");
    format!(
        r#"import Metashape
import sys
from pathlib import Path

try:
    doc = Metashape.Document()
    chunk = doc.addChunk()

    image_folder = Path(r"{frames}")
    image_files = [str(p) for p in image_folder.glob("*.jpg")]
    print(f"Adding {{len(image_files)}} images...")
    if len(image_files) == 0:
        raise RuntimeError(f"No images found in {{image_folder}}")
    chunk.addPhotos(image_files)

    print("Aligning photos...")
    chunk.matchPhotos(downscale=1, generic_preselection=True)
    chunk.alignCameras()

    aligned_cameras = sum(1 for camera in chunk.cameras if camera.transform)
    print(f"Aligned {{aligned_cameras}} cameras")
    if aligned_cameras == 0:
        raise RuntimeError("Camera alignment failed - no cameras aligned")

    print("Exporting to COLMAP format...")
    sparse_path = Path(r"{sparse}")
    colmap_file = sparse_path / "cameras.txt"
    chunk.exportCameras(path=str(colmap_file), format=Metashape.CamerasFormatColmap)

    import shutil
    images_out = Path(r"{images}")
    for img in image_files:
        shutil.copy2(img, images_out / Path(img).name)
    print(f"Copied {{len(image_files)}} images to output")

    project_path = Path(r"{output}") / "metashape_project.psx"
    doc.save(str(project_path))
    print("Metashape processing complete!")
except Exception as e:
    print(f"ERROR: {{type(e).__name__}}: {{e}}", file=sys.stderr)
    import traceback
    traceback.print_exc()
    sys.exit(1)
"#,
        frames = frames_dir.display(),
        sparse = sparse_dir.display(),
        images = images_dir.display(),
        output = output_root.display(),
    )
}

/// Compose the Metashape headless invocation, output redirected to `log_path`.
pub fn metashape_command(exe: &Path, script_path: &Path, log_path: &Path) -> String {
    format!(
        "\"{}\" -r \"{}\" > \"{}\" 2>&1",
        exe.display(),
        script_path.display(),
        log_path.display()
    )
}

/// Agisoft Metashape reconstruction backend.
pub struct MetashapeBackend {
    exe: PathBuf,
}

impl MetashapeBackend {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }
}

impl ReconstructionBackend for MetashapeBackend {
    fn name(&self) -> &'static str {
        "Metashape"
    }

    fn reconstruct(
        &self,
        frames_dir: &Path,
        output_root: &Path,
        runner: &CommandRunner,
        logger: &RunLogger,
    ) -> StepResult<ReconstructionResult> {
        logger.info(&format!("Using Agisoft Metashape: {}", self.exe.display()));
        logger.info(&format!("Input frames: {}", frames_dir.display()));
        logger.info(&format!("Output: {}", output_root.display()));

        let sparse_dir = output_root.join("sparse").join("0");
        let images_dir = output_root.join("images");
        for dir in [&sparse_dir, &images_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| StepError::io("creating Metashape directories", e))?;
        }

        let script_path = output_root.join("metashape_process.py");
        fs::write(
            &script_path,
            metashape_script(frames_dir, &sparse_dir, output_root),
        )
        .map_err(|e| StepError::io("writing Metashape script", e))?;

        let log_path = output_root.join("metashape_log.txt");
        let cmd = metashape_command(&self.exe, &script_path, &log_path);

        logger.info("Running Metashape (this may take a while)...");
        logger.command(&cmd);

        let exit_code = runner.run(&cmd, |line| logger.output_line(line))?;
        if exit_code != 0 {
            logger.error("Metashape processing failed");
            logger.error(&format!("Check log file for details: {}", log_path.display()));
            surface_log_tail(&log_path, logger);
            return Err(StepError::command_failed(
                "metashape",
                exit_code,
                "Metashape processing failed",
            ));
        }

        logger.success("Metashape reconstruction complete");
        logger.info("Output structure:");
        logger.info(&format!("  {} - images", images_dir.display()));
        logger.info(&format!(
            "  {} - camera poses (COLMAP format)",
            sparse_dir.display()
        ));

        Ok(ReconstructionResult::new(&images_dir, &sparse_dir))
    }
}

/// Echo the last lines of the redirected tool log into the run log.
fn surface_log_tail(log_path: &Path, logger: &RunLogger) {
    let Ok(contents) = fs::read_to_string(log_path) else {
        return;
    };
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    logger.info("Last lines from Metashape log:");
    for line in &lines[start..] {
        logger.info(&format!("  {}", line));
    }
}
