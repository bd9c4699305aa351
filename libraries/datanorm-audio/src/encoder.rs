//! WAV encoder implementation using hound

use crate::error::{AudioError, Result};
use datanorm_core::{AudioBuffer, AudioEncoder, NormalizeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Sample encoding for written WAV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// 16-bit signed integer PCM
    #[default]
    Pcm16,

    /// 32-bit IEEE float
    Float32,
}

impl SampleFormat {
    /// Configuration name of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm16 => "pcm16",
            Self::Float32 => "float32",
        }
    }

    fn wav_spec(self, sample_rate: u32) -> hound::WavSpec {
        match self {
            Self::Pcm16 => hound::WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            Self::Float32 => hound::WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SampleFormat {
    type Err = NormalizeError;

    fn from_str(s: &str) -> datanorm_core::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pcm16" | "pcm_16" | "int16" => Ok(Self::Pcm16),
            "float32" | "float" | "f32" => Ok(Self::Float32),
            other => Err(NormalizeError::config(format!(
                "unknown sample format '{}' (expected 'pcm16' or 'float32')",
                other
            ))),
        }
    }
}

/// Mono WAV writer
#[derive(Debug, Clone, Default)]
pub struct WavEncoder {
    sample_format: SampleFormat,
}

impl WavEncoder {
    /// Create an encoder writing 16-bit PCM
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sample encoding
    pub fn with_sample_format(mut self, sample_format: SampleFormat) -> Self {
        self.sample_format = sample_format;
        self
    }

    /// Write `buffer` as a mono WAV file
    pub fn write_wav(&self, path: &Path, buffer: &AudioBuffer) -> Result<()> {
        if buffer.sample_rate == 0 {
            return Err(AudioError::UnsupportedFormat(
                "cannot write a WAV file with a zero sample rate".to_string(),
            ));
        }

        let spec = self.sample_format.wav_spec(buffer.sample_rate);
        let mut writer = hound::WavWriter::create(path, spec)?;

        match self.sample_format {
            SampleFormat::Pcm16 => {
                for &sample in &buffer.samples {
                    let sample = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
                    writer.write_sample(sample)?;
                }
            }
            SampleFormat::Float32 => {
                for &sample in &buffer.samples {
                    writer.write_sample(sample)?;
                }
            }
        }

        writer.finalize()?;
        Ok(())
    }
}

impl AudioEncoder for WavEncoder {
    fn encode(&self, path: &Path, buffer: &AudioBuffer) -> datanorm_core::Result<()> {
        if !self.supports(path) {
            return Err(NormalizeError::encode(
                path,
                AudioError::UnsupportedFormat(
                    "only .wav output is supported (use output format 'wav')".to_string(),
                ),
            ));
        }
        self.write_wav(path, buffer)
            .map_err(|e| NormalizeError::encode(path, e))
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_mono_pcm16() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.wav");

        let buffer = AudioBuffer::new(vec![0.0, 0.5, -0.5, 1.0, -1.0], 16_000);
        WavEncoder::new().encode(&path, &buffer).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16383, -16383, 32767, -32767]);
    }

    #[test]
    fn writes_float32_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.wav");

        let buffer = AudioBuffer::new(vec![0.25, -0.75, 1.5], 8_000);
        WavEncoder::new()
            .with_sample_format(SampleFormat::Float32)
            .encode(&path, &buffer)
            .unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_format, hound::SampleFormat::Float);
        let samples: Vec<f32> = reader.into_samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.25, -0.75, 1.5]);
    }

    #[test]
    fn rejects_non_wav_destination() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.flac");

        let buffer = AudioBuffer::new(vec![0.0; 4], 16_000);
        let err = WavEncoder::new().encode(&path, &buffer).unwrap_err();
        assert!(matches!(err, NormalizeError::Encode { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn sample_format_parsing() {
        assert_eq!("PCM16".parse::<SampleFormat>().unwrap(), SampleFormat::Pcm16);
        assert_eq!("float32".parse::<SampleFormat>().unwrap(), SampleFormat::Float32);
        assert!("pcm24".parse::<SampleFormat>().is_err());
    }

    #[test]
    fn supports_is_case_insensitive() {
        let encoder = WavEncoder::new();
        assert!(encoder.supports(Path::new("a/b.wav")));
        assert!(encoder.supports(Path::new("a/b.WAV")));
        assert!(!encoder.supports(Path::new("a/b.flac")));
        assert!(!encoder.supports(Path::new("a/b")));
    }
}
