//! Interpolation stage - oversampling/smoothing against retained history.
//!
//! For a declared target rate `ratio` times the native rate, output sample
//! `i` of each block is the source signal evaluated at the fractional
//! position `p = i / ratio`, measured from the first frame of the current
//! block. The block size never changes; true rate conversion is left to the
//! host's resampler.
//!
//! # Kernels
//!
//! | Quality | Kernel | Taps | Latency |
//! |---------|--------|------|---------|
//! | `linear` | two-point | 2 | 0 |
//! | `sinc` | Lanczos, 256 sub-steps | 16 | 8 samples |
//! | `sinc` + low latency | Lanczos, 256 sub-steps | 4 | 2 samples |
//!
//! ```text
//! linear: out = s[n] + frac * (s[n+1] - s[n])      n = floor(p)
//! sinc:   out = Σ w[k](frac) * s[n - half + 1 + k]  k = 0..taps
//! ```
//!
//! The sinc window reaches up to `half` samples before the block start; those
//! come from a per-channel [`RingBuffer`] holding twice the longest window.

use auralis_config::{Config, Quality};
use auralis_core::{AudioBlock, BLOCK_SIZE, RingBuffer, SincTable};

use crate::stage::{Stage, StageContext, StageError, StageKind};

/// Kernel length at full quality.
pub const SINC_TAPS: usize = 16;
/// Kernel length in low-latency mode.
pub const SINC_TAPS_LOW_LATENCY: usize = 4;

/// History retained per channel.
const HISTORY: usize = 2 * SINC_TAPS;
/// Leading history frames in the scratch row.
const LEAD: usize = SINC_TAPS / 2;

/// Half-width of the interpolation window for `config`, in samples.
///
/// This is the stage's delay while it is active.
pub fn interpolation_half_width(config: &Config) -> usize {
    match (config.quality, config.low_latency) {
        (Quality::Linear, _) => 0,
        (Quality::Sinc, false) => SINC_TAPS / 2,
        (Quality::Sinc, true) => SINC_TAPS_LOW_LATENCY / 2,
    }
}

/// Per-channel oversampler.
#[derive(Debug)]
pub struct Interpolator {
    channels: usize,
    history: RingBuffer,
    full: SincTable,
    short: SincTable,
    /// `LEAD` history frames followed by the current block.
    scratch: [f32; LEAD + BLOCK_SIZE],
    ratio: f32,
    quality: Quality,
    low_latency: bool,
    half_width: usize,
    active: bool,
}

impl Interpolator {
    /// Builds the stage and both kernel tables.
    ///
    /// # Errors
    ///
    /// Any [`StageContext::check`] failure.
    pub fn new(context: &StageContext) -> Result<Self, StageError> {
        context.check()?;
        Ok(Self {
            channels: context.channels,
            history: RingBuffer::new(context.channels, HISTORY),
            full: SincTable::lanczos(SINC_TAPS),
            short: SincTable::lanczos(SINC_TAPS_LOW_LATENCY),
            scratch: [0.0; LEAD + BLOCK_SIZE],
            ratio: 1.0,
            quality: Quality::Sinc,
            low_latency: false,
            half_width: 0,
            active: false,
        })
    }

    /// Current output/native ratio.
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    fn render_channel(&mut self, ch: usize, input: &[f32; BLOCK_SIZE], out: &mut [f32; BLOCK_SIZE]) {
        self.history.copy_latest(ch, &mut self.scratch[..LEAD]);
        self.scratch[LEAD..].copy_from_slice(input);

        let step = 1.0 / self.ratio;
        match self.quality {
            Quality::Linear => {
                for (i, o) in out.iter_mut().enumerate() {
                    let p = i as f32 * step;
                    let n = p as usize;
                    let frac = p - n as f32;
                    let a = self.scratch[LEAD + n];
                    let b = self.scratch[LEAD + n + 1];
                    *o = a + frac * (b - a);
                }
            }
            Quality::Sinc => {
                let table = if self.low_latency { &self.short } else { &self.full };
                for (i, o) in out.iter_mut().enumerate() {
                    let p = i as f32 * step;
                    let n = p as usize;
                    *o = table.interpolate(&self.scratch, LEAD + n, p - n as f32);
                }
            }
        }
    }
}

impl Stage for Interpolator {
    fn kind(&self) -> StageKind {
        StageKind::Interpolation
    }

    fn configure(&mut self, config: &Config) {
        self.active = config.interpolation_active();
        self.ratio = config.target_rate.factor() as f32;
        self.quality = config.quality;
        self.low_latency = config.low_latency;
        self.half_width = interpolation_half_width(config);
    }

    fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock) {
        if !self.active {
            output.copy_from(input);
            self.history.write_block(input);
            return;
        }

        let channels = input.channels().min(self.channels);
        output.set_channels(input.channels());
        for ch in 0..channels {
            self.render_channel(ch, input.channel(ch), output.channel_mut(ch));
        }
        for ch in channels..input.channels() {
            output.channel_mut(ch).copy_from_slice(input.channel(ch));
        }
        self.history.write_block(input);
    }

    fn reset(&mut self) {
        self.history.clear();
        self.scratch.fill(0.0);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn latency_samples(&self) -> usize {
        if self.active { self.half_width } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auralis_config::TargetRate;
    use core::f32::consts::PI;

    fn sine_block(start: usize, freq: f32, rate: f32) -> AudioBlock {
        let row: Vec<f32> = (start..start + BLOCK_SIZE)
            .map(|n| (2.0 * PI * freq * n as f32 / rate).sin())
            .collect();
        AudioBlock::from_channels(&[&row, &row])
    }

    fn stage(config: &Config) -> Interpolator {
        let mut stage = Interpolator::new(&StageContext::new(48000.0, 2)).unwrap();
        stage.configure(config);
        stage
    }

    #[test]
    fn native_rate_is_passthrough() {
        let mut interp = stage(&Config::default());
        let input = sine_block(0, 1000.0, 48000.0);
        let mut output = AudioBlock::new(2);
        interp.process(&input, &mut output);
        assert_eq!(output, input);
        assert!(!interp.is_active());
        assert_eq!(interp.latency_samples(), 0);
    }

    #[test]
    fn sinc_2x_reconstructs_sine_between_samples() {
        let config = Config {
            target_rate: TargetRate::Double,
            ..Config::default()
        };
        let mut interp = stage(&config);
        let mut output = AudioBlock::new(2);
        interp.process(&sine_block(0, 1000.0, 48000.0), &mut output);
        interp.process(&sine_block(BLOCK_SIZE, 1000.0, 48000.0), &mut output);

        for (i, &y) in output.channel(0).iter().enumerate() {
            let t = BLOCK_SIZE as f32 + i as f32 / 2.0;
            let expected = (2.0 * PI * 1000.0 * t / 48000.0).sin();
            assert!((y - expected).abs() < 1e-3, "sample {i}: {y} vs {expected}");
        }
        assert_eq!(interp.latency_samples(), SINC_TAPS / 2);
    }

    #[test]
    fn linear_4x_stays_close_to_sine() {
        let config = Config {
            target_rate: TargetRate::Quadruple,
            quality: Quality::Linear,
            ..Config::default()
        };
        let mut interp = stage(&config);
        let mut output = AudioBlock::new(2);
        interp.process(&sine_block(0, 1000.0, 48000.0), &mut output);
        for (i, &y) in output.channel(1).iter().enumerate() {
            let expected = (2.0 * PI * 1000.0 * (i as f32 / 4.0) / 48000.0).sin();
            assert!((y - expected).abs() < 3e-3);
        }
        assert_eq!(interp.latency_samples(), 0);
    }

    #[test]
    fn low_latency_uses_short_kernel() {
        let config = Config {
            target_rate: TargetRate::Double,
            low_latency: true,
            ..Config::default()
        };
        let interp = stage(&config);
        assert_eq!(interp.latency_samples(), SINC_TAPS_LOW_LATENCY / 2);
        assert_eq!(interpolation_half_width(&config), 2);
    }

    #[test]
    fn master_bypass_disables_stage() {
        let config = Config {
            target_rate: TargetRate::Double,
            ..Config::bypass()
        };
        let mut interp = stage(&config);
        let input = sine_block(7, 440.0, 48000.0);
        let mut output = AudioBlock::new(2);
        interp.process(&input, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn reset_forgets_history() {
        let config = Config {
            target_rate: TargetRate::Double,
            ..Config::default()
        };
        let mut interp = stage(&config);
        let mut output = AudioBlock::new(2);
        let mut loud = AudioBlock::new(2);
        loud.channel_mut(0).fill(1.0);
        interp.process(&loud, &mut output);
        interp.reset();
        interp.process(&AudioBlock::new(2), &mut output);
        assert_eq!(output.peak(), 0.0);
    }
}
