//! Spectral analysis utilities
//!
//! The free functions allocate and are meant for offline inspection and
//! tests. [`SpectrumAnalyzer`] is the callback-safe variant used for the
//! engine's frequency-data tap.

use rustfft::num_complex::Complex;

use crate::fft::{Fft, Window};

/// Compute magnitude spectrum from time-domain signal
pub fn magnitude_spectrum(signal: &[f32], fft_size: usize, window: Window) -> Vec<f32> {
    let mut fft = Fft::new(fft_size);

    let mut windowed = signal.to_vec();
    windowed.resize(fft_size, 0.0);
    window.apply(&mut windowed);

    let spectrum = fft.forward(&windowed);
    spectrum.iter().map(|c| c.norm()).collect()
}

/// Compute power spectrum (magnitude squared) in dB
pub fn power_spectrum_db(signal: &[f32], fft_size: usize, window: Window) -> Vec<f32> {
    let mag = magnitude_spectrum(signal, fft_size, window);
    mag.iter()
        .map(|&m| 10.0 * (m * m).max(1e-10).log10())
        .collect()
}

/// Frequency of the strongest bin, refined by parabolic interpolation.
///
/// `spectrum` holds `fft_size/2 + 1` magnitudes.
pub fn peak_frequency(spectrum: &[f32], sample_rate: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let fft_size = (spectrum.len() - 1) * 2;
    let bin_width = sample_rate / fft_size as f32;

    let (peak, _) = spectrum
        .iter()
        .enumerate()
        .skip(1)
        .fold((1, f32::MIN), |best, (i, &m)| if m > best.1 { (i, m) } else { best });

    let offset = if peak + 1 < spectrum.len() {
        let (a, b, c) = (spectrum[peak - 1], spectrum[peak], spectrum[peak + 1]);
        let denom = a - 2.0 * b + c;
        if denom.abs() > 1e-12 {
            0.5 * (a - c) / denom
        } else {
            0.0
        }
    } else {
        0.0
    };

    (peak as f32 + offset) * bin_width
}

/// Sum of squared magnitudes between `low_hz` and `high_hz`.
pub fn band_energy(spectrum: &[f32], sample_rate: f32, low_hz: f32, high_hz: f32) -> f32 {
    if spectrum.len() < 2 {
        return 0.0;
    }
    let fft_size = (spectrum.len() - 1) * 2;
    let bin_width = sample_rate / fft_size as f32;
    spectrum
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let f = *i as f32 * bin_width;
            f >= low_hz && f < high_hz
        })
        .map(|(_, &m)| m * m)
        .sum()
}

/// Preallocated power-spectrum analyzer.
///
/// Produces `fft_size / 2` bins in dB relative to a full-scale sine, with a
/// Hann window. [`analyze`](Self::analyze) does not allocate.
#[derive(Debug)]
pub struct SpectrumAnalyzer {
    fft: Fft,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    scale: f32,
}

/// Floor for reported bins.
pub const SPECTRUM_FLOOR_DB: f32 = -200.0;

impl SpectrumAnalyzer {
    /// Creates an analyzer for frames of `fft_size` samples.
    pub fn new(fft_size: usize) -> Self {
        let window = Window::Hann.coefficients(fft_size);
        let gain = Window::Hann.coherent_gain(fft_size);
        Self {
            fft: Fft::new(fft_size),
            window,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scale: 2.0 / gain,
        }
    }

    /// Frame length in samples.
    pub fn fft_size(&self) -> usize {
        self.fft.size()
    }

    /// Number of output bins.
    pub fn bins(&self) -> usize {
        self.fft.size() / 2
    }

    /// Analyzes `frame` (zero-padded or truncated to the FFT size) into
    /// `out`, which receives `min(out.len(), bins())` values.
    pub fn analyze(&mut self, frame: &[f32], out: &mut [f32]) {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let x = frame.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(x * self.window[i], 0.0);
        }
        self.fft.forward_in_place(&mut self.buffer);

        let bins = self.bins();
        for (o, c) in out.iter_mut().zip(&self.buffer[..bins]) {
            let mag = c.norm() * self.scale;
            *o = (20.0 * mag.max(1e-10).log10()).max(SPECTRUM_FLOOR_DB);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn peak_frequency_finds_tone() {
        let signal = sine(1000.0, 48000.0, 4096);
        let spectrum = magnitude_spectrum(&signal, 4096, Window::Hann);
        let peak = peak_frequency(&spectrum, 48000.0);
        assert!((peak - 1000.0).abs() < 15.0, "peak {peak}");
    }

    #[test]
    fn band_energy_separates_regions() {
        let signal = sine(2000.0, 48000.0, 2048);
        let spectrum = magnitude_spectrum(&signal, 2048, Window::Hann);
        let low = band_energy(&spectrum, 48000.0, 1000.0, 3000.0);
        let high = band_energy(&spectrum, 48000.0, 15000.0, 24000.0);
        assert!(low > high * 1e4);
    }

    #[test]
    fn analyzer_reports_full_scale_sine_near_zero_db() {
        let mut analyzer = SpectrumAnalyzer::new(2048);
        // bin-centred tone: 64 * 48000 / 2048 = 1500 Hz
        let signal = sine(1500.0, 48000.0, 2048);
        let mut out = vec![0.0; analyzer.bins()];
        analyzer.analyze(&signal, &mut out);
        assert!((out[64]).abs() < 0.5, "peak bin {} dB", out[64]);
        assert!(out[400] < -60.0);
    }

    #[test]
    fn analyzer_floors_silence() {
        let mut analyzer = SpectrumAnalyzer::new(256);
        let mut out = vec![0.0; 128];
        analyzer.analyze(&[0.0; 256], &mut out);
        assert!(out.iter().all(|&v| v <= -190.0));
    }
}
