//! COLMAP backend: four sequential CLI invocations.
//!
//! Feature extraction, exhaustive matching, incremental mapping and
//! image undistortion share one database file and one sparse model
//! directory. The first three steps are mandatory; undistortion failure
//! downgrades to a warning because the sparse model is still usable.

use std::fs;
use std::path::{Path, PathBuf};

use crate::io::CommandRunner;
use crate::logging::RunLogger;
use crate::models::ReconstructionResult;
use crate::orchestrator::errors::{StepError, StepResult};

use super::ReconstructionBackend;

/// One step of the COLMAP sequence.
#[derive(Debug, Clone)]
pub struct ColmapStep {
    /// Human-readable step label.
    pub label: &'static str,
    /// Fully composed command line.
    pub command: String,
    /// Whether a non-zero exit aborts the run.
    pub required: bool,
}

/// Build the four COLMAP invocations in execution order.
pub fn colmap_steps(
    colmap: &Path,
    frames_dir: &Path,
    db_path: &Path,
    sparse_dir: &Path,
    output_root: &Path,
) -> Vec<ColmapStep> {
    let exe = colmap.display();
    let frames = frames_dir.display();
    let db = db_path.display();
    let sparse = sparse_dir.display();
    let sparse0 = sparse_dir.join("0");

    vec![
        ColmapStep {
            label: "Feature Extraction",
            command: format!(
                "\"{exe}\" feature_extractor --database_path \"{db}\" \
                 --image_path \"{frames}\" --ImageReader.single_camera 1"
            ),
            required: true,
        },
        ColmapStep {
            label: "Feature Matching",
            command: format!("\"{exe}\" exhaustive_matcher --database_path \"{db}\""),
            required: true,
        },
        ColmapStep {
            label: "Sparse Reconstruction",
            command: format!(
                "\"{exe}\" mapper --database_path \"{db}\" --image_path \"{frames}\" \
                 --output_path \"{sparse}\""
            ),
            required: true,
        },
        ColmapStep {
            label: "Image Undistortion",
            command: format!(
                "\"{exe}\" image_undistorter --image_path \"{frames}\" \
                 --input_path \"{}\" --output_path \"{}\" --output_type COLMAP",
                sparse0.display(),
                output_root.display()
            ),
            required: false,
        },
    ]
}

/// Whether either working path contains whitespace.
///
/// COLMAP is known not to tokenize quoted paths reliably; this is
/// surfaced as an advisory, not a precondition.
pub fn paths_have_whitespace(frames_dir: &Path, output_root: &Path) -> bool {
    [frames_dir, output_root]
        .iter()
        .any(|p| p.to_string_lossy().contains(char::is_whitespace))
}

/// COLMAP reconstruction backend.
pub struct ColmapBackend {
    exe: PathBuf,
}

impl ColmapBackend {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    fn warn_about_whitespace(&self, logger: &RunLogger) {
        logger.warn("SPACES IN PATHS DETECTED");
        logger.warn("COLMAP does not work reliably with spaces in file paths.");
        logger.warn("Processing will likely fail. Consider paths without spaces.");
    }
}

impl ReconstructionBackend for ColmapBackend {
    fn name(&self) -> &'static str {
        "COLMAP"
    }

    fn reconstruct(
        &self,
        frames_dir: &Path,
        output_root: &Path,
        runner: &CommandRunner,
        logger: &RunLogger,
    ) -> StepResult<ReconstructionResult> {
        logger.info(&format!("Using COLMAP: {}", self.exe.display()));
        logger.info(&format!("Input frames: {}", frames_dir.display()));
        logger.info(&format!("Output: {}", output_root.display()));

        if paths_have_whitespace(frames_dir, output_root) {
            self.warn_about_whitespace(logger);
        }

        let db_path = output_root.join("database").join("database.db");
        let sparse_dir = output_root.join("sparse");
        let images_dir = output_root.join("images");

        for dir in [
            db_path.parent().unwrap_or(output_root),
            sparse_dir.as_path(),
            images_dir.as_path(),
        ] {
            fs::create_dir_all(dir)
                .map_err(|e| StepError::io("creating COLMAP directories", e))?;
        }

        let steps = colmap_steps(&self.exe, frames_dir, &db_path, &sparse_dir, output_root);
        let total = steps.len();
        let mut result = ReconstructionResult::new(&images_dir, sparse_dir.join("0"));

        for (i, step) in steps.iter().enumerate() {
            logger.info(&format!("Step {}/{}: {}...", i + 1, total, step.label));
            logger.command(&step.command);

            let exit_code = runner.run(&step.command, |line| logger.output_line(line))?;
            if exit_code != 0 {
                if step.required {
                    logger.error(&format!("{} failed", step.label));
                    return Err(StepError::command_failed(
                        "colmap",
                        exit_code,
                        format!("{} failed", step.label),
                    ));
                }
                logger.warn(&format!(
                    "{} failed, but sparse reconstruction succeeded",
                    step.label
                ));
                result.note(format!("{} failed (exit {})", step.label, exit_code));
            }
        }

        logger.success("COLMAP reconstruction complete");
        logger.info("Output structure:");
        logger.info(&format!("  {}/images/ - undistorted images", output_root.display()));
        logger.info(&format!(
            "  {}/sparse/0/ - camera poses and points",
            output_root.display()
        ));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps() -> Vec<ColmapStep> {
        colmap_steps(
            Path::new("/opt/colmap/colmap"),
            Path::new("/out/frames/combined"),
            Path::new("/out/database/database.db"),
            Path::new("/out/sparse"),
            Path::new("/out"),
        )
    }

    #[test]
    fn four_steps_in_order() {
        let steps = steps();
        assert_eq!(steps.len(), 4);
        assert!(steps[0].command.contains("feature_extractor"));
        assert!(steps[1].command.contains("exhaustive_matcher"));
        assert!(steps[2].command.contains("mapper"));
        assert!(steps[3].command.contains("image_undistorter"));
    }

    #[test]
    fn only_undistortion_is_advisory() {
        let steps = steps();
        assert!(steps[0].required && steps[1].required && steps[2].required);
        assert!(!steps[3].required);
    }

    #[test]
    fn steps_share_database_and_sparse_model() {
        let steps = steps();
        for step in &steps[..3] {
            assert!(step.command.contains("/out/database/database.db"));
        }
        assert!(steps[2].command.contains("--output_path \"/out/sparse\""));
        assert!(steps[3].command.contains("--input_path \"/out/sparse/0\""));
        assert!(steps[3].command.contains("--output_type COLMAP"));
    }

    #[test]
    fn single_camera_flag_set() {
        assert!(steps()[0].command.contains("--ImageReader.single_camera 1"));
    }

    #[test]
    fn whitespace_detection() {
        assert!(paths_have_whitespace(
            Path::new("/out/My Frames"),
            Path::new("/out")
        ));
        assert!(paths_have_whitespace(
            Path::new("/frames"),
            Path::new("/Drone Output")
        ));
        assert!(!paths_have_whitespace(
            Path::new("/frames"),
            Path::new("/out")
        ));
    }
}
