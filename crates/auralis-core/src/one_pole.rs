//! One-pole lowpass filter with a complementary highpass output.
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])
//! ```
//!
//! where `coeff = exp(-2π * freq / sample_rate)`. The highpass output is the
//! difference `x[n] - y[n]`, which is what the harmonic extender uses to
//! isolate the top of the source band.
//!
//! # Usage
//!
//! ```rust
//! use auralis_core::OnePole;
//!
//! let mut lp = OnePole::new(48000.0, 700.0);
//! let filtered = lp.process(1.0);
//! assert!(filtered < 1.0);
//! ```

use crate::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) filter with a single history value.
///
/// # Invariants
///
/// - `coeff` stays in [0, 1) for any cutoff in (0, sample_rate / 2]
/// - `state` is flushed to zero below 1e-20
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Create a filter with cutoff `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Set the cutoff frequency.
    ///
    /// Values at or above Nyquist drive the coefficient to ~0 (no filtering).
    pub fn set_frequency(&mut self, freq_hz: f32) {
        if freq_hz != self.freq {
            self.freq = freq_hz;
            self.recalculate_coeff();
        }
    }

    /// Current cutoff in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    /// Lowpass one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Highpass one sample (`input - lowpass(input)`).
    #[inline]
    pub fn process_highpass(&mut self, input: f32) -> f32 {
        input - self.process(input)
    }

    /// Reset the history value to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    /// Update the sample rate and recalculate the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    fn recalculate_coeff(&mut self) {
        let freq = self.freq.clamp(0.0, self.sample_rate * 0.5);
        self.coeff = expf(-core::f32::consts::TAU * freq / self.sample_rate);
    }
}
