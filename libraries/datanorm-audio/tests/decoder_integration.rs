/// Integration tests for the decode -> mono -> normalize -> encode path
///
/// Fixtures are written with hound into a temp directory, decoded back
/// through Symphonia and checked for channel handling and rate metadata.
use datanorm_audio::normalize::normalize;
use datanorm_audio::{ResamplingQuality, RubatoResampler, SymphoniaDecoder, WavEncoder};
use datanorm_core::{
    AudioDecoder, AudioEncoder, NormalizationMode, PaddingStrategy, TargetSpec,
};
use std::path::Path;

/// Helper to write a 16-bit PCM WAV where every channel gets its own constant
fn create_constant_wav(path: &Path, sample_rate: u32, frames: usize, levels: &[i16]) {
    let spec = hound::WavSpec {
        channels: levels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("Failed to create test WAV");
    for _ in 0..frames {
        for &level in levels {
            writer.write_sample(level).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// Helper to write a mono 440 Hz sine
fn create_sine_wav(path: &Path, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn test_decode_stereo_keeps_interleaving() {
    let temp_dir = tempfile::tempdir().unwrap();
    let wav_path = temp_dir.path().join("stereo.wav");
    create_constant_wav(&wav_path, 22_050, 1_000, &[8_192, -8_192]);

    let decoded = SymphoniaDecoder::new()
        .decode(&wav_path)
        .expect("Failed to decode stereo WAV");

    assert_eq!(decoded.channels, 2);
    assert_eq!(decoded.sample_rate, 22_050);
    assert_eq!(decoded.samples.len(), 2_000);
    assert_eq!(decoded.frames(), 1_000);
    assert!((decoded.samples[0] - 0.25).abs() < 1e-3);
    assert!((decoded.samples[1] + 0.25).abs() < 1e-3);
}

#[test]
fn test_stereo_averages_to_mono() {
    let temp_dir = tempfile::tempdir().unwrap();
    let wav_path = temp_dir.path().join("stereo.wav");
    // Left at +0.5, right at 0.0: mono should sit at 0.25
    create_constant_wav(&wav_path, 16_000, 500, &[16_384, 0]);

    let mono = SymphoniaDecoder::new().decode(&wav_path).unwrap().into_mono();

    assert_eq!(mono.len(), 500);
    assert_eq!(mono.sample_rate, 16_000);
    assert!(mono.samples.iter().all(|s| (s - 0.25).abs() < 1e-3));
}

#[test]
fn test_probe_reports_header_properties() {
    let temp_dir = tempfile::tempdir().unwrap();
    let wav_path = temp_dir.path().join("probe.wav");
    create_constant_wav(&wav_path, 48_000, 24_000, &[0, 0, 0]);

    let info = SymphoniaDecoder::new().probe(&wav_path).unwrap();

    assert_eq!(info.sample_rate, 48_000);
    assert_eq!(info.channels, 3);
    assert_eq!(info.frames, 24_000);
    assert!((info.duration_secs() - 0.5).abs() < 1e-9);
}

#[test]
fn test_empty_wav_decodes_to_nothing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let wav_path = temp_dir.path().join("empty.wav");
    create_constant_wav(&wav_path, 16_000, 0, &[0]);

    let mono = SymphoniaDecoder::new().decode(&wav_path).unwrap().into_mono();
    assert!(mono.is_empty());
}

#[test]
fn test_full_pipeline_resample_mode() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("tone.wav");
    let destination = temp_dir.path().join("tone_out.wav");
    // 1.5 s at 48 kHz down to 1 s at 16 kHz
    create_sine_wav(&source, 48_000, 72_000);

    let spec = TargetSpec::from_duration(1.0, 16_000, PaddingStrategy::Repeat, 0.0).unwrap();
    let resampler = RubatoResampler::new(ResamplingQuality::Fast);

    let mono = SymphoniaDecoder::new().decode(&source).unwrap().into_mono();
    let outputs = normalize(mono, NormalizationMode::Resample, &spec, &resampler).unwrap();
    assert_eq!(outputs.len(), 1);

    WavEncoder::new().encode(&destination, &outputs[0]).unwrap();

    let reader = hound::WavReader::open(&destination).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.duration(), 16_000);
}

#[test]
fn test_full_pipeline_resize_mode() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = temp_dir.path().join("long.wav");
    // 100 ms windows over 1 s at 8 kHz with 10% overlap
    create_sine_wav(&source, 8_000, 8_000);

    let spec = TargetSpec::new(800, 16_000, PaddingStrategy::ZeroPad, 0.1).unwrap();
    let resampler = RubatoResampler::default();

    let mono = SymphoniaDecoder::new().decode(&source).unwrap().into_mono();
    let outputs = normalize(mono, NormalizationMode::Resize, &spec, &resampler).unwrap();

    // step 720: ceil((8000 - 800) / 720) + 1
    assert_eq!(outputs.len(), 11);
    assert!(outputs.iter().all(|o| o.len() == 800 && o.sample_rate == 8_000));
}
