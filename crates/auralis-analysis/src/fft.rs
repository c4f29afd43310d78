//! FFT wrapper with windowing functions
//!
//! [`Fft`] plans once and owns its scratch space, so the in-place transforms
//! can run inside the audio callback without allocating.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Periodic Hann window (raised cosine), the analysis/synthesis window
    /// for 75% overlap-add
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
}

impl Window {
    /// Window value at index `i` of an `n`-point periodic window.
    pub fn value(&self, i: usize, n: usize) -> f32 {
        let x = 2.0 * PI * i as f32 / n as f32;
        match self {
            Window::Rectangular => 1.0,
            Window::Hann => 0.5 * (1.0 - x.cos()),
            Window::Hamming => 0.54 - 0.46 * x.cos(),
            Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
        }
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        if *self == Window::Rectangular {
            return;
        }
        for (i, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.value(i, n);
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, size: usize) -> Vec<f32> {
        let mut coeffs = vec![1.0; size];
        self.apply(&mut coeffs);
        coeffs
    }

    /// Sum of the coefficients, used to normalize magnitude spectra.
    pub fn coherent_gain(&self, size: usize) -> f32 {
        (0..size).map(|i| self.value(i, size)).sum()
    }

    /// Sum of squared coefficients, the overlap-add normalization term.
    pub fn power_sum(&self, size: usize) -> f32 {
        (0..size).map(|i| self.value(i, size).powi(2)).sum()
    }
}

/// FFT processor with cached plans and preallocated scratch
pub struct Fft {
    forward: Arc<dyn rustfft::Fft<f32>>,
    inverse: Arc<dyn rustfft::Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    size: usize,
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}

impl Fft {
    /// Create a new FFT processor for the given size
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            forward,
            inverse,
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            size,
        }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward transform in place. `buffer.len()` must equal [`size`](Self::size).
    #[inline]
    pub fn forward_in_place(&mut self, buffer: &mut [Complex<f32>]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.forward.process_with_scratch(buffer, &mut self.scratch);
    }

    /// Inverse transform in place, normalized by `1/N`.
    #[inline]
    pub fn inverse_in_place(&mut self, buffer: &mut [Complex<f32>]) {
        debug_assert_eq!(buffer.len(), self.size);
        self.inverse.process_with_scratch(buffer, &mut self.scratch);
        let scale = 1.0 / self.size as f32;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }

    /// Perform forward FFT on real input
    ///
    /// Input shorter than the FFT size is zero-padded. Returns `size/2 + 1`
    /// bins (DC to Nyquist). Allocates; use
    /// [`forward_in_place`](Self::forward_in_place) on the audio thread.
    pub fn forward(&mut self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.forward_in_place(&mut buffer);

        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Inverse of [`forward`](Self::forward): rebuilds the negative
    /// frequencies by conjugate symmetry and returns the real signal.
    pub fn inverse(&mut self, spectrum: &[Complex<f32>]) -> Vec<f32> {
        let mut buffer = vec![Complex::new(0.0, 0.0); self.size];
        let half = self.size / 2;
        for (k, &bin) in spectrum.iter().enumerate().take(half + 1) {
            buffer[k] = bin;
            if k > 0 && k < self.size - k {
                buffer[self.size - k] = bin.conj();
            }
        }

        self.inverse_in_place(&mut buffer);
        buffer.iter().map(|c| c.re).collect()
    }
}

/// Compute magnitude spectrum in dB
pub fn magnitude_db(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum
        .iter()
        .map(|c| 20.0 * c.norm().max(1e-10).log10())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_roundtrip() {
        let mut fft = Fft::new(256);

        let input: Vec<f32> = (0..256)
            .map(|i| (2.0 * PI * 10.0 * i as f32 / 256.0).sin())
            .collect();

        let spectrum = fft.forward(&input);
        let reconstructed = fft.inverse(&spectrum);

        for (a, b) in input.iter().zip(reconstructed.iter()) {
            assert!((a - b).abs() < 1e-4, "Mismatch: {} vs {}", a, b);
        }
    }

    #[test]
    fn in_place_roundtrip_is_normalized() {
        let mut fft = Fft::new(64);
        let original: Vec<Complex<f32>> = (0..64)
            .map(|i| Complex::new((i as f32 * 0.3).sin(), 0.0))
            .collect();
        let mut buffer = original.clone();
        fft.forward_in_place(&mut buffer);
        fft.inverse_in_place(&mut buffer);
        for (a, b) in original.iter().zip(&buffer) {
            assert!((a.re - b.re).abs() < 1e-5);
            assert!(b.im.abs() < 1e-5);
        }
    }

    #[test]
    fn test_window_hann() {
        let mut buffer = vec![1.0; 100];
        Window::Hann.apply(&mut buffer);

        // periodic Hann: zero at 0, one at N/2
        assert!(buffer[0] < 0.01);
        assert!(buffer[99] < 0.01);
        assert!((buffer[50] - 1.0).abs() < 0.01);
    }

    #[test]
    fn hann_power_sum_is_three_eighths_n() {
        let n = 2048;
        let sum = Window::Hann.power_sum(n);
        assert!((sum - 3.0 * n as f32 / 8.0).abs() < 0.05, "{sum}");
    }

    #[test]
    fn test_dc_detection() {
        let mut fft = Fft::new(256);

        let input = vec![1.0; 256];
        let spectrum = fft.forward(&input);

        let dc_mag = spectrum[0].norm();
        let other_mag: f32 = spectrum[1..].iter().map(|c| c.norm()).sum();

        assert!(dc_mag > other_mag * 10.0);
    }
}
