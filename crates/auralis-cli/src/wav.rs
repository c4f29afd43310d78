//! WAV file I/O over `hound`.

use std::path::Path;

use anyhow::Context;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Interleaved samples read from a WAV file.
#[derive(Debug, Clone)]
pub struct WavData {
    /// Interleaved frames, scaled to [-1, 1].
    pub samples: Vec<f32>,
    /// Channels per frame.
    pub channels: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl WavData {
    /// Number of frames.
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate as f32
    }
}

/// Reads the header only.
pub fn read_wav_spec(path: &Path) -> anyhow::Result<WavSpec> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(reader.spec())
}

/// Reads every channel, keeping the interleaving.
pub fn read_wav(path: &Path) -> anyhow::Result<WavData> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(WavData {
        samples,
        channels: usize::from(spec.channels),
        sample_rate: spec.sample_rate,
    })
}

/// Writes interleaved stereo frames. 32 bits means float, 16 or 24 integer.
pub fn write_wav_stereo(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    bits_per_sample: u16,
) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample,
        sample_format: if bits_per_sample == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i32 << (bits_per_sample - 1)) as f32;
        for &sample in samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn stereo_roundtrip_keeps_frames() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.wav");
        let samples: Vec<f32> = (0..256).map(|i| (i as f32 / 256.0) - 0.5).collect();
        write_wav_stereo(&path, &samples, 44100, 32).unwrap();

        let data = read_wav(&path).unwrap();
        assert_eq!(data.channels, 2);
        assert_eq!(data.sample_rate, 44100);
        assert_eq!(data.frames(), 128);
        assert_eq!(data.samples, samples);
    }

    #[test]
    fn integer_depth_is_scaled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out16.wav");
        write_wav_stereo(&path, &[0.5, -0.5], 48000, 16).unwrap();
        let data = read_wav(&path).unwrap();
        assert!((data.samples[0] - 0.5).abs() < 1e-4);
        assert!((data.samples[1] + 0.5).abs() < 1e-4);
        assert_eq!(read_wav_spec(&path).unwrap().bits_per_sample, 16);
    }
}
