//! datanorm - audio dataset normalization
use anyhow::Context;
use clap::Parser;
use datanorm_audio::{RubatoResampler, SymphoniaDecoder, WavEncoder};
use datanorm_batch::{
    analyze_directory, analyze_labeled, read_labels, BatchOrchestrator, BatchProgress, Converter,
    DatasetStats, Repairer,
};
use datanorm_cli::cli::{AnalyzeArgs, Cli, Commands, ConvertArgs, NormalizeArgs, RepairArgs};
use datanorm_cli::config::NormalizeSettings;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the summary
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "datanorm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize(args) => normalize(&args).await?,
        Commands::Analyze(args) => analyze(&args).await?,
        Commands::Repair(args) => repair(&args).await?,
        Commands::Convert(args) => convert(&args).await?,
    }

    Ok(())
}

async fn normalize(args: &NormalizeArgs) -> anyhow::Result<()> {
    let settings = NormalizeSettings::load(args)?;
    let config = settings.batch_config()?;

    tracing::info!("Source: {}", config.source_root.display());
    tracing::info!("Output: {}", config.output_root.display());
    tracing::info!(
        "Target: {:.3}s at {} Hz ({} samples)",
        config.target.duration_secs(),
        config.target.target_samplerate(),
        config.target.target_length()
    );

    let decoder = SymphoniaDecoder::new().skip_corrupt_packets(settings.skip_corrupt_packets);
    let encoder = WavEncoder::new().with_sample_format(settings.sample_format);
    let resampler = RubatoResampler::new(settings.quality);

    let bar = progress_bar()?;
    let bar_handle = bar.clone();

    let orchestrator = BatchOrchestrator::new(
        config,
        Arc::new(decoder),
        Arc::new(encoder),
        Arc::new(resampler),
    )
    .on_progress(Box::new(move |progress: &BatchProgress| {
        if let Some(total) = progress.total_files {
            bar_handle.set_length(total as u64);
        }
        bar_handle.set_position(progress.processed_files as u64);
        bar_handle.set_message(format!(
            "{} written, {} skipped, {} failed",
            progress.written, progress.skipped, progress.failed
        ));
    }));

    let summary = orchestrator.run().await?;
    bar.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.summary_text());
        for (path, error) in &summary.errors {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    Ok(())
}

async fn analyze(args: &AnalyzeArgs) -> anyhow::Result<()> {
    let decoder = Arc::new(SymphoniaDecoder::new());

    if let Some(table) = &args.labels {
        let labels = read_labels(table, &args.filename_column, &args.label_column)?;
        let stats = analyze_labeled(&args.source_dir, &labels, decoder, args.concurrency).await?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        print_stats("All labels", &stats.overall);
        for (label, per_label) in &stats.per_label {
            println!();
            print_stats(&format!("Label '{}'", label), per_label);
        }
        return Ok(());
    }

    let extension = args
        .extension
        .as_deref()
        .context("--extension is required without --labels")?;
    let stats = analyze_directory(&args.source_dir, extension, decoder, args.concurrency).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    print_stats("All files", &stats);
    Ok(())
}

fn print_stats(heading: &str, stats: &DatasetStats) {
    println!("{}: {} files analyzed", heading, stats.files);
    for (label, values) in [
        ("Audio size", stats.lengths),
        ("Samplerate", stats.sample_rates),
        ("Duration", stats.durations),
    ] {
        match values {
            Some(s) => println!(
                "{} stats: Mean: {}, Median: {}, Max: {}, Smallest: {}",
                label, s.mean, s.median, s.max, s.min
            ),
            None => println!("{} stats: no readable files", label),
        }
    }
    for (path, error) in &stats.failures {
        eprintln!("Couldn't open {}: {}", path.display(), error);
    }
}

async fn repair(args: &RepairArgs) -> anyhow::Result<()> {
    let summary = Repairer::new(Arc::new(SymphoniaDecoder::new()))
        .with_ffmpeg(&args.ffmpeg)
        .repair_directory(
            &args.source_dir,
            &args.output_dir,
            &args.extension,
            args.concurrency,
            !args.no_overwrite,
        )
        .await
        .with_context(|| format!("Failed to repair {}", args.source_dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.summary_text());
        for (path, error) in &summary.errors {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    Ok(())
}

async fn convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let summary = Converter::new()
        .with_ffmpeg(&args.ffmpeg)
        .convert_directory(
            &args.source_dir,
            &args.output_dir,
            &args.extension,
            &args.output_format,
            args.concurrency,
            &args.ffmpeg_args,
        )
        .await
        .with_context(|| format!("Failed to convert {}", args.source_dir.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.summary_text());
        for (path, error) in &summary.errors {
            eprintln!("  {}: {}", path.display(), error);
        }
    }

    Ok(())
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("#>-"),
    );
    Ok(bar)
}
