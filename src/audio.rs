use std::path::Path;

/// Duration of a WAV file in seconds, rounded to 2 decimals
///
/// Computed from the per-channel frame count and the sample rate in the header.
pub fn wav_duration_seconds(path: &Path) -> Result<f64, hound::Error> {
    let reader = hound::WavReader::open(path)?;
    let sample_rate = reader.spec().sample_rate;
    if sample_rate == 0 {
        return Ok(0.0);
    }
    let frames = reader.duration();
    Ok(round_to(frames as f64 / sample_rate as f64, 2))
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_silence(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for _ in 0..frames * channels as u32 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_mono_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_silence(&path, 16000, 1, 24000);
        assert_eq!(wav_duration_seconds(&path).unwrap(), 1.5);
    }

    #[test]
    fn test_stereo_counts_frames_not_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_silence(&path, 8000, 2, 8000);
        assert_eq!(wav_duration_seconds(&path).unwrap(), 1.0);
    }

    #[test]
    fn test_duration_rounds_to_two_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_silence(&path, 3000, 1, 1000);
        assert_eq!(wav_duration_seconds(&path).unwrap(), 0.33);
    }

    #[test]
    fn test_not_a_wav_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.wav");
        std::fs::write(&path, b"webm bytes").unwrap();
        assert!(wav_duration_seconds(&path).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456789, 8), 0.12345679);
        assert_eq!(round_to(2.005, 0), 2.0);
    }
}
