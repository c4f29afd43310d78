//! Biquad (bi-quadratic) filter.
//!
//! Second-order IIR section used for the extender's high-pass / low-pass
//! isolation filters and the virtualizer's LFE and distance filters.
//! Coefficients follow the RBJ Audio EQ Cookbook.

use core::f32::consts::PI;
use libm::{cosf, sinf};

use crate::flush_denormal;

/// Highest cutoff accepted by the coefficient designers, as a fraction of the
/// sample rate. Keeps `omega` strictly below π so the design stays stable.
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Normalized-by-`a0` coefficient set for a [`Biquad`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward taps.
    pub b0: f32,
    /// Feedforward tap for x[n-1].
    pub b1: f32,
    /// Feedforward tap for x[n-2].
    pub b2: f32,
    /// Feedback tap for y[n-1].
    pub a1: f32,
    /// Feedback tap for y[n-2].
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Unity passthrough: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Normalizes raw cookbook coefficients by `a0`.
    pub fn from_raw(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: a1 * a0_inv,
            a2: a2 * a0_inv,
        }
    }

    /// RBJ low-pass.
    ///
    /// `frequency` is clamped to `(0, 0.49 * sample_rate]`.
    pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
        Self::from_raw(
            (1.0 - cos_omega) / 2.0,
            1.0 - cos_omega,
            (1.0 - cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }

    /// RBJ high-pass.
    ///
    /// `frequency` is clamped to `(0, 0.49 * sample_rate]`.
    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
        Self::from_raw(
            (1.0 + cos_omega) / 2.0,
            -(1.0 + cos_omega),
            (1.0 + cos_omega) / 2.0,
            1.0 + alpha,
            -2.0 * cos_omega,
            1.0 - alpha,
        )
    }
}

fn omega_terms(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let frequency = frequency.clamp(1.0, sample_rate * MAX_CUTOFF_RATIO);
    let omega = 2.0 * PI * frequency / sample_rate;
    (cosf(omega), sinf(omega) / (2.0 * q.max(0.01)))
}

/// Direct Form I biquad section.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
///
/// State is advanced exactly once per call to [`process`](Self::process).
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a passthrough biquad.
    pub fn new() -> Self {
        Self::with_coefficients(BiquadCoefficients::IDENTITY)
    }

    /// Creates a biquad with the given coefficients and cleared history.
    pub fn with_coefficients(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Low-pass section at `frequency` Hz.
    pub fn lowpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        Self::with_coefficients(BiquadCoefficients::lowpass(frequency, q, sample_rate))
    }

    /// High-pass section at `frequency` Hz.
    pub fn highpass(frequency: f32, q: f32, sample_rate: f32) -> Self {
        Self::with_coefficients(BiquadCoefficients::highpass(frequency, q, sample_rate))
    }

    /// Replaces the coefficients, keeping history so retuning does not click.
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coeffs
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let c = &self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2
            - c.a1 * self.y1
            - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = flush_denormal(output);

        output
    }

    /// Clears the history without touching coefficients.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}
