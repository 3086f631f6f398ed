//! End-to-end pipeline tests using stand-in tool scripts.
//!
//! Each external tool is replaced by a small shell script, so the tests
//! exercise discovery, command composition, output streaming, stage
//! ordering, and reporting without any real tool installed.

#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use drp_core::config::Settings;
use drp_core::models::{BackendKind, PipelineConfig, ToolPaths};
use drp_core::{run_pipeline, RunReport};

fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Stand-in ffmpeg: emits five frames matching the output pattern it
/// was given as its last argument.
fn fake_ffmpeg(dir: &Path) -> PathBuf {
    write_tool(
        dir,
        "ffmpeg",
        "#!/bin/sh\n\
         for last; do :; done\n\
         i=1\n\
         while [ \"$i\" -le 5 ]; do\n\
         \x20 printf 'jpegdata' > \"$(printf \"$last\" \"$i\")\"\n\
         \x20 i=$((i+1))\n\
         done\n\
         exit 0\n",
    )
}

fn test_settings(work: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.paths.logs_folder = work.join("logs").to_string_lossy().into_owned();
    settings
}

fn read_report(output_root: &Path) -> RunReport {
    let json = fs::read_to_string(output_root.join("run_report.json")).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn colmap_run_succeeds_without_telemetry() {
    let work = tempfile::tempdir().unwrap();
    let video = work.path().join("flight.mp4");
    fs::write(&video, b"not really a video").unwrap();

    let ffmpeg = fake_ffmpeg(work.path());
    let colmap = write_tool(work.path(), "colmap", "#!/bin/sh\nexit 0\n");
    let output_root = work.path().join("out");

    let config = PipelineConfig {
        source_path: video,
        output_root: output_root.clone(),
        frame_rate: 1.0,
        backend: BackendKind::Colmap,
        tools: ToolPaths {
            ffmpeg,
            colmap: Some(colmap),
            ..ToolPaths::default()
        },
    };

    let report = run_pipeline(config, test_settings(work.path()), None).unwrap();

    assert!(report.success);
    assert_eq!(report.video_count, 1);
    assert_eq!(report.frame_count, 5);
    assert_eq!(report.tagged_frames, None);

    // The report on disk matches the returned one.
    let on_disk = read_report(&output_root);
    assert!(on_disk.success);
    assert_eq!(on_disk.frame_count, 5);

    // Frames landed in the per-video directory.
    let frame_dir = output_root.join("frames").join("flight");
    assert!(frame_dir.join("flight_frame_0001.jpg").is_file());
    assert!(frame_dir.join("flight_frame_0005.jpg").is_file());

    // COLMAP working directories were prepared.
    assert!(output_root.join("database").is_dir());
    assert!(output_root.join("sparse").is_dir());
}

#[test]
fn colmap_matcher_failure_aborts_later_steps() {
    let work = tempfile::tempdir().unwrap();
    let video = work.path().join("flight.mp4");
    fs::write(&video, b"v").unwrap();

    let calls_log = work.path().join("calls.log");
    let ffmpeg = fake_ffmpeg(work.path());
    let colmap = write_tool(
        work.path(),
        "colmap",
        &format!(
            "#!/bin/sh\n\
             echo \"$1\" >> \"{}\"\n\
             case \"$1\" in\n\
             \x20 exhaustive_matcher) exit 1;;\n\
             esac\n\
             exit 0\n",
            calls_log.display()
        ),
    );
    let output_root = work.path().join("out");

    let config = PipelineConfig {
        source_path: video,
        output_root: output_root.clone(),
        frame_rate: 1.0,
        backend: BackendKind::Colmap,
        tools: ToolPaths {
            ffmpeg,
            colmap: Some(colmap),
            ..ToolPaths::default()
        },
    };

    let err = run_pipeline(config, test_settings(work.path()), None).unwrap_err();
    assert!(err.to_string().contains("Reconstruct"));

    // Matching failed, so the mapper and undistorter never ran.
    let calls = fs::read_to_string(&calls_log).unwrap();
    let verbs: Vec<&str> = calls.lines().collect();
    assert_eq!(verbs, vec!["feature_extractor", "exhaustive_matcher"]);

    // A failure report was still written.
    let report = read_report(&output_root);
    assert!(!report.success);
    assert_eq!(report.frame_count, 5);
}

#[test]
fn telemetry_geotags_every_frame() {
    let work = tempfile::tempdir().unwrap();
    let video = work.path().join("DJI_0042.mp4");
    fs::write(&video, b"v").unwrap();

    let mut srt = String::new();
    for i in 0..5 {
        srt.push_str(&format!(
            "{}\n00:00:0{},000 --> 00:00:0{},000\nGPS: (149.12{}, -35.56{}) H: 10{}.5m\n\n",
            i + 1,
            i,
            i + 1,
            i,
            i,
            i
        ));
    }
    fs::write(work.path().join("DJI_0042.srt"), srt).unwrap();

    let tag_log = work.path().join("tags.log");
    let ffmpeg = fake_ffmpeg(work.path());
    let exiftool = write_tool(
        work.path(),
        "exiftool",
        &format!("#!/bin/sh\necho \"$@\" >> \"{}\"\nexit 0\n", tag_log.display()),
    );
    let colmap = write_tool(work.path(), "colmap", "#!/bin/sh\nexit 0\n");
    let output_root = work.path().join("out");

    let config = PipelineConfig {
        source_path: video,
        output_root,
        frame_rate: 1.0,
        backend: BackendKind::Colmap,
        tools: ToolPaths {
            ffmpeg,
            exiftool: Some(exiftool),
            colmap: Some(colmap),
            ..ToolPaths::default()
        },
    };

    let report = run_pipeline(config, test_settings(work.path()), None).unwrap();
    assert_eq!(report.tagged_frames, Some(5));

    let tags = fs::read_to_string(&tag_log).unwrap();
    let lines: Vec<&str> = tags.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in &lines {
        assert!(line.contains("-EXIF:GPSLatitude="));
        assert!(line.contains("-EXIF:GPSLatitudeRef=S"));
        assert!(line.contains("-EXIF:GPSLongitudeRef=E"));
        assert!(line.contains("-overwrite_original"));
    }
    // Frame 3 (zero-based) aligns to the fix at t=3s.
    assert!(lines[3].contains("-XMP:GPSLongitude=149.12300000"));
}

#[test]
fn realityscan_empty_exports_fail_softly() {
    let work = tempfile::tempdir().unwrap();
    let video = work.path().join("flight.mp4");
    fs::write(&video, b"v").unwrap();

    let ffmpeg = fake_ffmpeg(work.path());
    // Exits clean but exports nothing.
    let realityscan = write_tool(work.path(), "RealityScan", "#!/bin/sh\nexit 0\n");
    let output_root = work.path().join("out");

    let config = PipelineConfig {
        source_path: video,
        output_root: output_root.clone(),
        frame_rate: 1.0,
        backend: BackendKind::RealityScan,
        tools: ToolPaths {
            ffmpeg,
            realityscan: Some(realityscan),
            ..ToolPaths::default()
        },
    };

    let err = run_pipeline(config, test_settings(work.path()), None).unwrap_err();
    assert!(err.to_string().contains("Reconstruct"));

    let report = read_report(&output_root);
    assert!(!report.success);
    let recon = report.reconstruction.expect("partial result recorded");
    assert!(!recon.success);
    assert!(recon
        .notes
        .iter()
        .any(|n| n.contains("registration.txt")));

    // Partial output stays in place for inspection.
    assert!(output_root
        .join("undistorted")
        .join("sparse")
        .join("0")
        .join("points3D.txt")
        .is_file());
}

#[test]
fn folder_source_merges_frames_and_survives_one_bad_video() {
    let work = tempfile::tempdir().unwrap();
    let videos = work.path().join("videos");
    fs::create_dir(&videos).unwrap();
    fs::write(videos.join("a.mp4"), b"v").unwrap();
    fs::write(videos.join("b.mov"), b"v").unwrap();
    fs::write(videos.join("c.mp4"), b"v").unwrap();

    // Fails only for the video named b.*, succeeds otherwise.
    let ffmpeg = write_tool(
        work.path(),
        "ffmpeg",
        "#!/bin/sh\n\
         for last; do :; done\n\
         case \"$last\" in\n\
         \x20 *b_frame*) exit 1;;\n\
         esac\n\
         i=1\n\
         while [ \"$i\" -le 5 ]; do\n\
         \x20 printf 'jpegdata' > \"$(printf \"$last\" \"$i\")\"\n\
         \x20 i=$((i+1))\n\
         done\n\
         exit 0\n",
    );
    let colmap = write_tool(work.path(), "colmap", "#!/bin/sh\nexit 0\n");
    let output_root = work.path().join("out");

    let config = PipelineConfig {
        source_path: videos,
        output_root: output_root.clone(),
        frame_rate: 1.0,
        backend: BackendKind::Colmap,
        tools: ToolPaths {
            ffmpeg,
            colmap: Some(colmap),
            ..ToolPaths::default()
        },
    };

    let report = run_pipeline(config, test_settings(work.path()), None).unwrap();

    assert!(report.success);
    assert_eq!(report.video_count, 2);
    assert_eq!(report.frame_count, 10);

    // Frames were merged into one combined directory, per-video
    // directories removed.
    let combined = output_root.join("frames").join("combined");
    assert!(combined.join("a_frame_0001.jpg").is_file());
    assert!(combined.join("c_frame_0005.jpg").is_file());
    assert!(!output_root.join("frames").join("a").exists());
    assert_eq!(combined.read_dir().unwrap().count(), 10);
}
