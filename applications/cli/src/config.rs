//! Layered run configuration
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file
//! (`--config`, or `datanorm.toml` in the working directory), `DATANORM_*`
//! environment variables, then command-line flags.

use crate::cli::NormalizeArgs;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};
use datanorm_audio::{ResamplingQuality, SampleFormat};
use datanorm_batch::{BatchConfig, DiscoveryMode, OutputFormat, DEFAULT_CONCURRENCY};
use datanorm_core::{NormalizationMode, NormalizeError, PaddingStrategy, Result, TargetSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory
pub const CONFIG_FILE: &str = "datanorm.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "DATANORM";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NormalizeSettings {
    #[serde(default)]
    pub source_dir: Option<PathBuf>,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    #[serde(default)]
    pub extension: Option<String>,

    #[serde(default)]
    pub mode: NormalizationMode,

    #[serde(default)]
    pub duration_seconds: Option<f64>,

    #[serde(default)]
    pub samplerate: Option<u32>,

    #[serde(default)]
    pub padding: PaddingStrategy,

    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    #[serde(default)]
    pub resume: bool,

    #[serde(default = "default_overlap")]
    pub overlap: f64,

    #[serde(default)]
    pub streaming: bool,

    #[serde(default)]
    pub output_format: OutputFormat,

    #[serde(default)]
    pub sample_format: SampleFormat,

    #[serde(default)]
    pub quality: ResamplingQuality,

    #[serde(default)]
    pub skip_corrupt_packets: bool,
}

impl NormalizeSettings {
    /// Load configuration from file, environment and flags
    pub fn load(args: &NormalizeArgs) -> Result<Self> {
        let config_file = match &args.config {
            Some(path) => Some(path.clone()),
            None => {
                let default_path = PathBuf::from(CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        Self::load_with(
            config_file.as_deref(),
            Environment::with_prefix(ENV_PREFIX),
            args,
        )
    }

    /// Load with an explicit file and environment source
    pub fn load_with(
        config_file: Option<&Path>,
        environment: Environment,
        args: &NormalizeArgs,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(NormalizeError::config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path));
        }

        // Override with environment variables (prefixed with DATANORM_)
        settings = settings.add_source(environment.try_parsing(true));

        let config = apply_flags(settings, args)
            .and_then(|settings| settings.build())
            .map_err(|e| NormalizeError::config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| NormalizeError::config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.batch_config().map(|_| ())
    }

    /// Target shape from duration, sample rate, padding and overlap
    pub fn target_spec(&self) -> Result<TargetSpec> {
        let duration = self.duration_seconds.ok_or_else(|| {
            NormalizeError::config("target duration is required (--duration or DATANORM_DURATION_SECONDS)")
        })?;
        let samplerate = self.samplerate.ok_or_else(|| {
            NormalizeError::config("target sample rate is required (--samplerate or DATANORM_SAMPLERATE)")
        })?;

        TargetSpec::from_duration(duration, samplerate, self.padding, self.overlap)
    }

    /// Build the orchestrator configuration, rejecting anything unusable
    pub fn batch_config(&self) -> Result<BatchConfig> {
        let source_dir = self.source_dir.clone().ok_or_else(|| {
            NormalizeError::config("source directory is required (--source-dir or DATANORM_SOURCE_DIR)")
        })?;
        let output_dir = self.output_dir.clone().ok_or_else(|| {
            NormalizeError::config("output directory is required (--output-dir or DATANORM_OUTPUT_DIR)")
        })?;
        let extension = self.extension.clone().ok_or_else(|| {
            NormalizeError::config("file extension is required (--extension or DATANORM_EXTENSION)")
        })?;

        let mut batch = BatchConfig::new(source_dir, output_dir, extension, self.target_spec()?);
        batch.mode = self.mode;
        batch.concurrency_limit = self.concurrency_limit;
        batch.resume = self.resume;
        batch.discovery = if self.streaming {
            DiscoveryMode::Streaming
        } else {
            DiscoveryMode::Eager
        };
        batch.output_format = self.output_format;

        batch.validate()?;
        Ok(batch)
    }
}

/// Apply command-line flags as the highest-precedence layer
fn apply_flags(
    settings: ConfigBuilder<DefaultState>,
    args: &NormalizeArgs,
) -> std::result::Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    let path = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

    let mut settings = settings
        .set_override_option("source_dir", path(&args.source_dir))?
        .set_override_option("output_dir", path(&args.output_dir))?
        .set_override_option("extension", args.extension.clone())?
        .set_override_option("mode", args.mode.map(|m| m.as_str()))?
        .set_override_option("duration_seconds", args.duration_seconds)?
        .set_override_option("samplerate", args.samplerate.map(i64::from))?
        .set_override_option("padding", args.padding.map(|p| p.as_str()))?
        .set_override_option("concurrency_limit", args.concurrency_limit.map(|c| c as i64))?
        .set_override_option("overlap", args.overlap)?
        .set_override_option("output_format", args.output_format.map(|f| f.as_str()))?
        .set_override_option("sample_format", args.sample_format.map(|f| f.as_str()))?
        .set_override_option("quality", args.quality.map(|q| q.as_str()))?;

    // Switches only ever turn a setting on
    if args.resume {
        settings = settings.set_override("resume", true)?;
    }
    if args.streaming {
        settings = settings.set_override("streaming", true)?;
    }
    if args.skip_corrupt_packets {
        settings = settings.set_override("skip_corrupt_packets", true)?;
    }

    Ok(settings)
}

// Default values
fn default_concurrency_limit() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_overlap() -> f64 {
    0.1
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            source_dir: None,
            output_dir: None,
            extension: None,
            mode: NormalizationMode::default(),
            duration_seconds: None,
            samplerate: None,
            padding: PaddingStrategy::default(),
            concurrency_limit: default_concurrency_limit(),
            resume: false,
            overlap: default_overlap(),
            streaming: false,
            output_format: OutputFormat::default(),
            sample_format: SampleFormat::default(),
            quality: ResamplingQuality::default(),
            skip_corrupt_packets: false,
        }
    }
}
