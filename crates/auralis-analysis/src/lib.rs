//! Auralis Analysis - FFT and spectrum tools for the signal chain
//!
//! - [`fft`] - FFT wrapper with cached plans, preallocated scratch, and window functions
//! - [`spectrum`] - Magnitude/power spectra, peak detection, and the
//!   real-time [`SpectrumAnalyzer`] behind the engine's frequency-data tap
//!
//! ## Example
//!
//! ```rust
//! use auralis_analysis::{Window, magnitude_spectrum, peak_frequency};
//!
//! let signal: Vec<f32> = (0..4096)
//!     .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
//!     .collect();
//! let spectrum = magnitude_spectrum(&signal, 4096, Window::Hann);
//! let peak = peak_frequency(&spectrum, 48000.0);
//! assert!((peak - 1000.0).abs() < 20.0);
//! ```

pub mod fft;
pub mod spectrum;

pub use fft::{Fft, Window, magnitude_db};
pub use rustfft::num_complex::Complex;
pub use spectrum::{
    SPECTRUM_FLOOR_DB, SpectrumAnalyzer, band_energy, magnitude_spectrum, peak_frequency,
    power_spectrum_db,
};
