//! Harmonic-generation fallback.
//!
//! Cheaper than the spectral path and adds no frame delay, so it is the
//! extender used when the FFT path is unavailable or when the user picks
//! it. The upper band is saturated to create new partials, the result is
//! band-limited to `[cutoff, ceiling]`, and it is mixed back under the
//! input's envelope:
//!
//! ```text
//! hp      = x - onepole_lp(x, 7.5 kHz)
//! drive   = 1 + 9 * intensity
//! shaped  = tanh(drive * hp)                 (2x oversampled when not low-latency)
//! harm    = lowpass(highpass(shaped, 15 kHz), ceiling)
//! y       = clip(x + harm * env(x) * intensity * 0.5)
//! ```

use auralis_core::{Biquad, BiquadCoefficients, EnvelopeFollower, OnePole, hard_clip};
use libm::tanhf;

use super::spectral::SOURCE_CUTOFF_HZ;

/// Split frequency feeding the saturator.
const SPLIT_HZ: f32 = 7500.0;
/// Harmonic level at full intensity.
const MIX: f32 = 0.5;
/// Extra drive at full intensity.
const DRIVE_RANGE: f32 = 9.0;
/// Butterworth Q for the band-limiting filters.
const BAND_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;
/// Filter corners are kept below this fraction of the sample rate.
const MAX_CORNER: f32 = 0.45;

/// Per-channel harmonic exciter state.
#[derive(Debug, Clone)]
pub struct HarmonicVoice {
    split: OnePole,
    band_high: Biquad,
    band_low: Biquad,
    envelope: EnvelopeFollower,
    previous: f32,
    intensity: f32,
    drive: f32,
    oversample: bool,
}

impl HarmonicVoice {
    /// Creates a voice tuned for `sample_rate` at zero intensity.
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            split: OnePole::new(sample_rate, SPLIT_HZ),
            band_high: Biquad::new(),
            band_low: Biquad::new(),
            envelope: EnvelopeFollower::new(sample_rate),
            previous: 0.0,
            intensity: 0.0,
            drive: 1.0,
            oversample: true,
        };
        voice.configure(sample_rate, 20000.0, 0.0, true);
        voice
    }

    /// Retunes for a processing rate, ceiling, and intensity (0-100).
    ///
    /// Recomputes coefficients only; never allocates.
    pub fn configure(&mut self, sample_rate: f32, ceiling_hz: f32, intensity: f32, oversample: bool) {
        let limit = sample_rate * MAX_CORNER;
        self.split.set_sample_rate(sample_rate);
        self.envelope.set_sample_rate(sample_rate);
        self.band_high.set_coefficients(BiquadCoefficients::highpass(
            SOURCE_CUTOFF_HZ.min(limit),
            BAND_Q,
            sample_rate,
        ));
        self.band_low.set_coefficients(BiquadCoefficients::lowpass(
            ceiling_hz.min(limit),
            BAND_Q,
            sample_rate,
        ));
        self.intensity = (intensity / 100.0).clamp(0.0, 1.0);
        self.drive = 1.0 + DRIVE_RANGE * self.intensity;
        self.oversample = oversample;
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let level = self.envelope.process(x);
        let hp = self.split.process_highpass(x);

        let shaped = if self.oversample {
            // midpoint sample, then average the two saturated points
            let mid = 0.5 * (self.previous + hp);
            0.5 * (tanhf(self.drive * mid) + tanhf(self.drive * hp))
        } else {
            tanhf(self.drive * hp)
        };
        self.previous = hp;

        let harmonics = self.band_low.process(self.band_high.process(shaped));
        hard_clip(x + harmonics * level * self.intensity * MIX, 1.0)
    }

    /// Clears filter and envelope history.
    pub fn reset(&mut self) {
        self.split.reset();
        self.band_high.reset();
        self.band_low.reset();
        self.envelope.reset();
        self.previous = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;

    #[test]
    fn output_stays_in_range() {
        let mut voice = HarmonicVoice::new(48000.0);
        voice.configure(48000.0, 20000.0, 100.0, true);
        for n in 0..4800 {
            let x = 0.99 * (2.0 * PI * 9000.0 * n as f32 / 48000.0).sin();
            let y = voice.process(x);
            assert!(y.is_finite() && y.abs() <= 1.0);
        }
    }

    #[test]
    fn silence_in_silence_out() {
        let mut voice = HarmonicVoice::new(44100.0);
        voice.configure(44100.0, 20000.0, 80.0, false);
        for _ in 0..1000 {
            assert_eq!(voice.process(0.0), 0.0);
        }
    }

    #[test]
    fn adds_energy_above_cutoff() {
        let rate = 96000.0;
        let mut voice = HarmonicVoice::new(rate);
        voice.configure(rate, 30000.0, 100.0, true);
        let mut diff_energy = 0.0;
        for n in 0..9600 {
            let x = 0.5 * (2.0 * PI * 8000.0 * n as f32 / rate).sin();
            let y = voice.process(x);
            if n > 4800 {
                diff_energy += (y - x) * (y - x);
            }
        }
        assert!(diff_energy > 1e-3, "{diff_energy}");
    }

    #[test]
    fn reset_clears_state() {
        let mut voice = HarmonicVoice::new(48000.0);
        voice.configure(48000.0, 20000.0, 100.0, true);
        for _ in 0..100 {
            voice.process(0.8);
        }
        voice.reset();
        assert_eq!(voice.process(0.0), 0.0);
    }
}
