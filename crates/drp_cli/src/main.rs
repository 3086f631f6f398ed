//! Command-line front end for the drone reconstruction pipeline.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use drp_core::config::ConfigManager;
use drp_core::models::PipelineConfig;
use drp_core::{run_pipeline, BackendKind};

/// Turn drone video into a reconstruction dataset.
#[derive(Debug, Parser)]
#[command(name = "drp", version, about = "Drone reconstruction pipeline")]
struct Args {
    /// Input video file, or a folder of videos.
    source: PathBuf,

    /// Output directory (defaults to the configured output folder).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frame extraction rate in fps.
    #[arg(long)]
    fps: Option<f64>,

    /// Reconstruction backend: colmap, metashape or realityscan.
    #[arg(short, long)]
    backend: Option<BackendKind>,

    /// Settings file location.
    #[arg(long, default_value = "drp.toml")]
    config: PathBuf,

    /// Override the configured ffmpeg path.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Override the configured exiftool path.
    #[arg(long)]
    exiftool: Option<PathBuf>,

    /// Override the configured COLMAP path.
    #[arg(long)]
    colmap: Option<PathBuf>,

    /// Override the configured Metashape path.
    #[arg(long)]
    metashape: Option<PathBuf>,

    /// Override the configured RealityScan path.
    #[arg(long)]
    realityscan: Option<PathBuf>,

    /// Suppress external tool output (errors still show a tail).
    #[arg(long)]
    compact: bool,

    /// Include debug-level log lines.
    #[arg(long)]
    debug: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (config, settings) = match build_run(&args) {
        Ok(pair) => pair,
        Err(message) => {
            eprintln!("error: {}", message);
            return ExitCode::FAILURE;
        }
    };

    let callback: drp_core::logging::LineCallback = Box::new(|line: &str| println!("{}", line));

    match run_pipeline(config, settings, Some(callback)) {
        Ok(report) => {
            tracing::info!(run = %report.run_name, frames = report.frame_count, "run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Merge CLI arguments over the settings file into a run configuration.
fn build_run(args: &Args) -> Result<(PipelineConfig, drp_core::Settings), String> {
    let mut manager = ConfigManager::new(&args.config);
    manager
        .load_or_create()
        .map_err(|e| format!("loading settings from {}: {}", args.config.display(), e))?;

    let settings = manager.settings_mut();
    if args.compact {
        settings.logging.compact = true;
    }
    if args.debug {
        settings.logging.debug = true;
    }

    let mut tools = settings.tool_paths();
    if let Some(path) = &args.ffmpeg {
        tools.ffmpeg = path.clone();
    }
    if let Some(path) = &args.exiftool {
        tools.exiftool = Some(path.clone());
    }
    if let Some(path) = &args.colmap {
        tools.colmap = Some(path.clone());
    }
    if let Some(path) = &args.metashape {
        tools.metashape = Some(path.clone());
    }
    if let Some(path) = &args.realityscan {
        tools.realityscan = Some(path.clone());
    }

    let config = PipelineConfig {
        source_path: args.source.clone(),
        output_root: args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&settings.paths.output_folder)),
        frame_rate: args.fps.unwrap_or(settings.extraction.frame_rate),
        backend: args.backend.unwrap_or(settings.extraction.backend),
        tools,
    };

    Ok((config, manager.settings().clone()))
}
