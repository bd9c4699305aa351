//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use datanorm_audio::{ResamplingQuality, SampleFormat};
use datanorm_batch::{OutputFormat, DEFAULT_CONCURRENCY};
use datanorm_core::{NormalizationMode, PaddingStrategy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "datanorm")]
#[command(about = "Normalize audio datasets to a fixed length and sample rate", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize every matching file under a directory
    Normalize(NormalizeArgs),
    /// Report length, sample rate and duration statistics
    Analyze(AnalyzeArgs),
    /// Copy intact files and re-encode corrupt ones with FFmpeg
    Repair(RepairArgs),
    /// Convert every matching file to another format with FFmpeg
    Convert(ConvertArgs),
}

/// Flags for `normalize`
///
/// Every option is optional here; unset flags fall through to the
/// configuration file and `DATANORM_*` environment variables.
#[derive(Args, Debug, Default, Clone)]
pub struct NormalizeArgs {
    /// Directory tree to read from
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Directory tree to write to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Source file extension (e.g. wav, .flac)
    #[arg(long)]
    pub extension: Option<String>,

    /// Normalization mode: resample or resize
    #[arg(long)]
    pub mode: Option<NormalizationMode>,

    /// Target duration in seconds
    #[arg(long = "duration")]
    pub duration_seconds: Option<f64>,

    /// Target sample rate in Hz
    #[arg(long)]
    pub samplerate: Option<u32>,

    /// Padding strategy: repeat or zero_pad
    #[arg(long)]
    pub padding: Option<PaddingStrategy>,

    /// Maximum number of files processed at once
    #[arg(long = "concurrency")]
    pub concurrency_limit: Option<usize>,

    /// Skip files whose outputs already exist
    #[arg(long)]
    pub resume: bool,

    /// Fraction of each chunk shared with the next in resize mode
    #[arg(long)]
    pub overlap: Option<f64>,

    /// Start processing while the directory walk is still running
    #[arg(long)]
    pub streaming: bool,

    /// Output container: source or wav
    #[arg(long)]
    pub output_format: Option<OutputFormat>,

    /// WAV sample encoding: pcm16 or float32
    #[arg(long)]
    pub sample_format: Option<SampleFormat>,

    /// Resampler quality: fast, balanced, high or maximum
    #[arg(long)]
    pub quality: Option<ResamplingQuality>,

    /// Skip undecodable packets instead of failing the file
    #[arg(long)]
    pub skip_corrupt_packets: bool,

    /// Configuration file path (default: ./datanorm.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Flags for `analyze`
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory tree to analyze
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Source file extension
    #[arg(long, required_unless_present = "labels")]
    pub extension: Option<String>,

    /// Space-separated label table; file names are relative to the source directory
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// Label table column holding file names
    #[arg(long, default_value = "filename")]
    pub filename_column: String,

    /// Label table column holding labels
    #[arg(long, default_value = "label")]
    pub label_column: String,

    /// Maximum number of files probed at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Print statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Flags for `repair`
#[derive(Args, Debug, Clone)]
pub struct RepairArgs {
    /// Directory tree to read from
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Directory tree to write to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Source file extension (flac or wav)
    #[arg(long)]
    pub extension: String,

    /// FFmpeg binary
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Maximum number of files repaired at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Fail files whose output already exists instead of replacing it
    #[arg(long)]
    pub no_overwrite: bool,

    /// Print the repair summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Flags for `convert`
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Directory tree to read from
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Directory tree to write to
    #[arg(long)]
    pub output_dir: PathBuf,

    /// Source file extension
    #[arg(long)]
    pub extension: String,

    /// Target extension (e.g. flac, wav, mp3)
    #[arg(long)]
    pub output_format: String,

    /// FFmpeg binary
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Maximum number of files converted at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Print the conversion summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Extra FFmpeg arguments, after `--` (e.g. `-- -ar 16000 -ac 1`)
    #[arg(last = true)]
    pub ffmpeg_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalize() {
        let cli = Cli::try_parse_from([
            "datanorm",
            "normalize",
            "--source-dir",
            "/in",
            "--output-dir",
            "/out",
            "--extension",
            "flac",
            "--mode",
            "resize",
            "--duration",
            "4",
            "--samplerate",
            "16000",
            "--padding",
            "zero_pad",
            "--resume",
            "--output-format",
            "wav",
        ])
        .unwrap();

        let Commands::Normalize(args) = cli.command else {
            panic!("expected normalize");
        };
        assert_eq!(args.source_dir, Some(PathBuf::from("/in")));
        assert_eq!(args.mode, Some(NormalizationMode::Resize));
        assert_eq!(args.duration_seconds, Some(4.0));
        assert_eq!(args.samplerate, Some(16_000));
        assert_eq!(args.padding, Some(PaddingStrategy::ZeroPad));
        assert_eq!(args.output_format, Some(OutputFormat::Wav));
        assert!(args.resume);
        assert!(!args.streaming);
        assert_eq!(args.quality, None);
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        let result = Cli::try_parse_from(["datanorm", "normalize", "--mode", "stretch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_repair_defaults() {
        let cli = Cli::try_parse_from([
            "datanorm",
            "repair",
            "--source-dir",
            "/in",
            "--output-dir",
            "/out",
            "--extension",
            "flac",
        ])
        .unwrap();

        let Commands::Repair(args) = cli.command else {
            panic!("expected repair");
        };
        assert_eq!(args.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(args.concurrency, DEFAULT_CONCURRENCY);
        assert!(!args.no_overwrite);
    }

    #[test]
    fn test_parse_convert_with_ffmpeg_args() {
        let cli = Cli::try_parse_from([
            "datanorm",
            "convert",
            "--source-dir",
            "/in",
            "--output-dir",
            "/out",
            "--extension",
            "wav",
            "--output-format",
            "flac",
            "--",
            "-ar",
            "16000",
            "-ac",
            "1",
        ])
        .unwrap();

        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.output_format, "flac");
        assert_eq!(args.ffmpeg_args, vec!["-ar", "16000", "-ac", "1"]);
        assert_eq!(args.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_parse_analyze_labels() {
        let cli = Cli::try_parse_from([
            "datanorm",
            "analyze",
            "--source-dir",
            "/in",
            "--labels",
            "/in/labels.txt",
            "--label-column",
            "class",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.labels, Some(PathBuf::from("/in/labels.txt")));
        assert_eq!(args.extension, None);
        assert_eq!(args.filename_column, "filename");
        assert_eq!(args.label_column, "class");

        // Without a label table the extension is required
        let result = Cli::try_parse_from(["datanorm", "analyze", "--source-dir", "/in"]);
        assert!(result.is_err());
    }
}
