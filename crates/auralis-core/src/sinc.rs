//! Lanczos-windowed sinc lookup table.
//!
//! The interpolation stage evaluates a symmetric `taps`-point kernel centred
//! on a fractional source position. Evaluating `sin` per tap per sample is
//! too slow for the callback, so the kernel is precomputed at
//! [`SINC_RESOLUTION`] sub-steps per integer step.
//!
//! For a position `p = n + frac`, row `round(frac * SINC_RESOLUTION)` holds
//! the weights for samples `n - (taps/2 - 1) ..= n + taps/2`.
//!
//! ```text
//! lanczos(x) = sinc(x) * sinc(x / a)   for |x| < a,  a = taps / 2
//! ```

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use core::f32::consts::PI;
use libm::sinf;

/// Sub-sample steps per integer step.
pub const SINC_RESOLUTION: usize = 256;

/// Precomputed, row-normalized Lanczos kernel.
#[derive(Debug, Clone)]
pub struct SincTable {
    taps: usize,
    /// `(SINC_RESOLUTION + 1) * taps` weights, row-major by sub-step.
    weights: Vec<f32>,
}

fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-7 {
        1.0
    } else {
        let px = PI * x;
        sinf(px) / px
    }
}

fn lanczos(x: f32, a: f32) -> f32 {
    if x.abs() >= a { 0.0 } else { sinc(x) * sinc(x / a) }
}

impl SincTable {
    /// Builds a table for an even number of taps (16 for full quality,
    /// 4 for low latency).
    ///
    /// # Panics
    ///
    /// Panics if `taps` is zero or odd.
    pub fn lanczos(taps: usize) -> Self {
        assert!(taps >= 2 && taps % 2 == 0, "sinc taps must be even and >= 2");
        let half = taps / 2;
        let a = half as f32;
        let mut weights = vec![0.0; (SINC_RESOLUTION + 1) * taps];

        for (step, row) in weights.chunks_exact_mut(taps).enumerate() {
            let frac = step as f32 / SINC_RESOLUTION as f32;
            for (k, w) in row.iter_mut().enumerate() {
                let x = k as f32 - (half - 1) as f32 - frac;
                *w = lanczos(x, a);
            }
            // unity DC gain for every fractional phase
            let sum: f32 = row.iter().sum();
            if sum.abs() > 1e-9 {
                for w in row.iter_mut() {
                    *w /= sum;
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("sinc_table: {taps} taps x {} phases", SINC_RESOLUTION + 1);

        Self { taps, weights }
    }

    /// Kernel length.
    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Samples needed on each side of the interpolation point.
    pub fn half_width(&self) -> usize {
        self.taps / 2
    }

    /// Weights for fractional offset `frac` in `[0, 1]`.
    #[inline]
    pub fn row(&self, frac: f32) -> &[f32] {
        let step = (frac.clamp(0.0, 1.0) * SINC_RESOLUTION as f32 + 0.5) as usize;
        let start = step.min(SINC_RESOLUTION) * self.taps;
        &self.weights[start..start + self.taps]
    }

    /// Interpolates `samples` at position `index + frac`.
    ///
    /// Reads `samples[index + 1 - half ..= index + half]`; the caller keeps
    /// enough history on both sides.
    #[inline]
    pub fn interpolate(&self, samples: &[f32], index: usize, frac: f32) -> f32 {
        let start = index + 1 - self.half_width();
        self.row(frac)
            .iter()
            .zip(&samples[start..start + self.taps])
            .map(|(w, s)| w * s)
            .sum()
    }
}
