//! Bulk conversion integration tests

#![cfg(unix)]


use datanorm_batch::Converter;
use tempfile::TempDir;
use test_helpers::{copying_ffmpeg, failing_ffmpeg, init_tracing, write_wav};

fn resample_args() -> Vec<String> {
    ["-ar", "16000", "-ac", "1"].map(String::from).to_vec()
}

#[tokio::test]
async fn test_convert_mirrors_tree_with_new_extension() {
    init_tracing();
    let tools = TempDir::new().unwrap();
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_wav(&source.path().join("a.wav"), 44_100, 441);
    write_wav(&source.path().join("sub/b.wav"), 44_100, 441);
    std::fs::write(source.path().join("notes.txt"), "not audio").unwrap();

    let summary = Converter::new()
        .with_ffmpeg(copying_ffmpeg(tools.path()))
        .convert_directory(source.path(), output.path(), "wav", "flac", 2, &resample_args())
        .await
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(
        std::fs::read(source.path().join("sub/b.wav")).unwrap(),
        std::fs::read(output.path().join("sub/b.flac")).unwrap()
    );
    assert!(output.path().join("a.flac").exists());
    assert!(!output.path().join("a.wav").exists());
    assert!(!output.path().join("notes.flac").exists());

    let log = std::fs::read_to_string(tools.path().join("ffmpeg.log")).unwrap();
    assert_eq!(log.lines().count(), 2);
    assert!(log.lines().all(|line| line.contains("-ar 16000 -ac 1 -y")));
}

#[tokio::test]
async fn test_convert_failures_leave_no_output() {
    init_tracing();
    let tools = TempDir::new().unwrap();
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_wav(&source.path().join("a.wav"), 16_000, 160);
    write_wav(&source.path().join("b.wav"), 16_000, 160);

    let summary = Converter::new()
        .with_ffmpeg(failing_ffmpeg(tools.path()))
        .convert_directory(source.path(), output.path(), "wav", ".mp3", 2, &[])
        .await
        .unwrap();

    assert_eq!(summary.converted, 0);
    assert_eq!(summary.failed, 2);
    assert!(summary.errors.iter().all(|(_, e)| e.contains("FFmpeg failed")));
    assert!(!output.path().join("a.mp3").exists());
    assert!(!output.path().join("b.mp3").exists());
}

#[tokio::test]
async fn test_convert_missing_binary_fails_each_file() {
    let source = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_wav(&source.path().join("a.wav"), 16_000, 160);

    let summary = Converter::new()
        .with_ffmpeg("/nonexistent/ffmpeg")
        .convert_directory(source.path(), output.path(), "wav", "flac", 1, &[])
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert!(summary.errors[0].0.ends_with("a.wav"));
}
