//! Audio decoder implementation using Symphonia

use crate::error::{AudioError, Result};
use datanorm_core::{AudioDecoder, AudioInfo, DecodedAudio, NormalizeError};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Audio decoder using Symphonia
///
/// Supports: MP3, FLAC, OGG, WAV, AAC
///
/// Decodes the default track of a file fully into memory, preserving the
/// channel layout as interleaved `f32`. Mono-reduction happens later, in
/// [`DecodedAudio::into_mono`].
#[derive(Debug, Clone, Default)]
pub struct SymphoniaDecoder {
    /// Skip packets the codec rejects instead of failing the whole file
    skip_corrupt_packets: bool,
}

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether undecodable packets are skipped (default: false)
    pub fn skip_corrupt_packets(mut self, skip: bool) -> Self {
        self.skip_corrupt_packets = skip;
        self
    }

    /// Probe a file and return the container reader plus the default track
    fn open_reader(path: &Path) -> Result<(Box<dyn FormatReader>, u32, CodecParameters)> {
        if !path.exists() {
            return Err(AudioError::FileNotFound(path.display().to_string()));
        }

        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::Symphonia(format!("Failed to probe file: {}", e)))?;

        let format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::DecodeError("No audio tracks found".to_string()))?;
        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        Ok((format, track_id, codec_params))
    }

    /// Decode every packet of the default track into interleaved `f32`
    pub fn decode_file(&self, path: &Path) -> Result<DecodedAudio> {
        let (mut format, track_id, codec_params) = Self::open_reader(path)?;

        let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
        let mut channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(format!("Failed to create decoder: {}", e)))?;

        let mut samples = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => {
                    return Err(AudioError::DecodeError(format!(
                        "Error reading packet: {}",
                        e
                    )));
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(msg)) if self.skip_corrupt_packets => {
                    tracing::debug!("Skipping corrupt packet in {}: {}", path.display(), msg);
                    continue;
                }
                Err(e) => return Err(AudioError::DecodeError(e.to_string())),
            };

            if sample_buf.is_none() {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;
                sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
            }

            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
        }

        if sample_rate == 0 {
            return Err(AudioError::DecodeError(
                "Stream does not declare a sample rate".to_string(),
            ));
        }

        Ok(DecodedAudio::new(samples, channels.max(1), sample_rate))
    }

    /// Read stream properties from the container header
    ///
    /// Falls back to a full decode when the container does not state the
    /// frame count (e.g. some MP3 and OGG streams).
    pub fn probe_file(&self, path: &Path) -> Result<AudioInfo> {
        let (_format, _track_id, codec_params) = Self::open_reader(path)?;

        match (codec_params.n_frames, codec_params.sample_rate) {
            (Some(frames), Some(sample_rate)) if sample_rate > 0 => Ok(AudioInfo {
                frames,
                sample_rate,
                channels: codec_params
                    .channels
                    .map(|c| c.count() as u16)
                    .unwrap_or(1),
            }),
            _ => {
                let decoded = self.decode_file(path)?;
                Ok(AudioInfo {
                    frames: decoded.frames() as u64,
                    sample_rate: decoded.sample_rate,
                    channels: decoded.channels,
                })
            }
        }
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> datanorm_core::Result<DecodedAudio> {
        self.decode_file(path)
            .map_err(|e| NormalizeError::decode(path, e))
    }

    fn probe(&self, path: &Path) -> datanorm_core::Result<AudioInfo> {
        self.probe_file(path)
            .map_err(|e| NormalizeError::decode(path, e))
    }
}
