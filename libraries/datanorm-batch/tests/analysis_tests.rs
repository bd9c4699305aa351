//! Dataset statistics integration tests


use datanorm_audio::SymphoniaDecoder;
use datanorm_batch::{analyze_directory, analyze_labeled, read_labels, LabeledFile};
use datanorm_core::NormalizeError;
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::{init_tracing, write_garbage, write_wav};

#[tokio::test]
async fn test_analyze_directory_summarizes_lengths_and_rates() {
    init_tracing();
    let source = TempDir::new().unwrap();

    write_wav(&source.path().join("a.wav"), 16_000, 16_000);
    write_wav(&source.path().join("b.wav"), 16_000, 32_000);
    write_wav(&source.path().join("nested/c.wav"), 48_000, 48_000);
    write_garbage(&source.path().join("broken.wav"));

    let stats = analyze_directory(source.path(), "wav", Arc::new(SymphoniaDecoder::new()), 2)
        .await
        .unwrap();

    assert_eq!(stats.files, 3);

    let lengths = stats.lengths.unwrap();
    assert_eq!(lengths.min, 16_000.0);
    assert_eq!(lengths.max, 48_000.0);
    assert_eq!(lengths.median, 32_000.0);

    let rates = stats.sample_rates.unwrap();
    assert_eq!(rates.count, 3);
    assert_eq!(rates.max, 48_000.0);

    let durations = stats.durations.unwrap();
    assert!((durations.mean - (1.0 + 2.0 + 1.0) / 3.0).abs() < 1e-9);

    assert_eq!(stats.failures.len(), 1);
    assert!(stats.failures[0].0.ends_with("broken.wav"));
}

#[tokio::test]
async fn test_analyze_empty_directory() {
    let source = TempDir::new().unwrap();

    let stats = analyze_directory(source.path(), "flac", Arc::new(SymphoniaDecoder::new()), 4)
        .await
        .unwrap();

    assert_eq!(stats.files, 0);
    assert!(stats.lengths.is_none());
    assert!(stats.failures.is_empty());
}

#[tokio::test]
async fn test_analyze_missing_root() {
    let temp = TempDir::new().unwrap();
    let err = analyze_directory(
        &temp.path().join("missing"),
        "wav",
        Arc::new(SymphoniaDecoder::new()),
        4,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, NormalizeError::Discovery { .. }));
}

#[tokio::test]
async fn test_analyze_labeled_breaks_down_by_label() {
    init_tracing();
    let source = TempDir::new().unwrap();

    write_wav(&source.path().join("real/a.wav"), 16_000, 16_000);
    write_wav(&source.path().join("real/b.wav"), 16_000, 48_000);
    write_wav(&source.path().join("fake/c.wav"), 22_050, 22_050);
    write_garbage(&source.path().join("fake/broken.wav"));
    // Not in the label table
    write_wav(&source.path().join("unlabeled.wav"), 8_000, 8_000);

    let table = source.path().join("labels.txt");
    std::fs::write(
        &table,
        "filename label\n\
         real/a.wav real\n\
         real/b.wav real\n\
         fake/c.wav fake\n\
         fake/broken.wav fake\n\
         fake/missing.wav fake\n",
    )
    .unwrap();

    let labels = read_labels(&table, "filename", "label").unwrap();
    assert_eq!(labels.len(), 5);

    let stats = analyze_labeled(source.path(), &labels, Arc::new(SymphoniaDecoder::new()), 2)
        .await
        .unwrap();

    assert_eq!(stats.overall.files, 3);
    assert_eq!(stats.overall.failures.len(), 2);
    assert_eq!(stats.per_label.len(), 2);

    let real = &stats.per_label["real"];
    assert_eq!(real.files, 2);
    assert_eq!(real.lengths.unwrap().mean, 32_000.0);
    assert_eq!(real.sample_rates.unwrap().max, 16_000.0);
    assert!(real.failures.is_empty());

    let fake = &stats.per_label["fake"];
    assert_eq!(fake.files, 1);
    assert_eq!(fake.sample_rates.unwrap().min, 22_050.0);
    assert_eq!(fake.failures.len(), 2);
    assert!(fake.failures[0].0.ends_with("fake/broken.wav"));
    assert!(fake.failures[1].0.ends_with("fake/missing.wav"));
}

#[tokio::test]
async fn test_analyze_labeled_counts_rows() {
    let source = TempDir::new().unwrap();
    write_wav(&source.path().join("a.wav"), 16_000, 1_600);

    let row = |label: &str| LabeledFile {
        filename: "a.wav".to_string(),
        label: label.to_string(),
    };
    let labels = [row("x"), row("x"), row("y")];

    let stats = analyze_labeled(source.path(), &labels, Arc::new(SymphoniaDecoder::new()), 4)
        .await
        .unwrap();

    assert_eq!(stats.overall.files, 3);
    assert_eq!(stats.per_label["x"].files, 2);
    assert_eq!(stats.per_label["y"].files, 1);
}

#[tokio::test]
async fn test_analyze_labeled_missing_root() {
    let temp = TempDir::new().unwrap();
    let err = analyze_labeled(
        &temp.path().join("missing"),
        &[],
        Arc::new(SymphoniaDecoder::new()),
        4,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, NormalizeError::Discovery { .. }));
}
