//! Closed-form latency model.
//!
//! Computes the delay a config will add before any stage exists, so a host
//! can show it before connecting. Each term uses the same helper the stage
//! itself reports from, so the estimate and the running chain agree.
//!
//! ```text
//! samples = Σ over active stages (BLOCK_SIZE + stage delay)
//!   interpolation: half sinc window (8, 2 low-latency, 0 linear)
//!   extender:      FFT frame (2048, 512 low-latency; 0 harmonic)
//!   spatial:       depth * longest reflection + atmos height * pinna comb,
//!                  counted at the processing rate the delay lines run at
//! ms = hardware_ms + samples / native_rate * 1000
//! ```

use auralis_config::{Config, ExtensionAlgorithm};
use auralis_core::{BLOCK_SIZE, samples_to_ms};
use auralis_stages::{interpolation_half_width, spatial_latency_samples, spectral_frame_len};
use serde::Serialize;

/// Result of [`estimate_latency`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyEstimate {
    /// Signal-path delay in native-rate samples.
    pub samples: usize,
    /// Host I/O latency included in `ms`.
    pub hardware_ms: f32,
    /// Total delay in milliseconds.
    pub ms: f32,
}

/// Delay added by the extender at `config`, in samples.
pub fn extender_latency_samples(config: &Config) -> usize {
    if !config.extension_active() {
        return 0;
    }
    match config.extension.algorithm {
        ExtensionAlgorithm::Spectral => spectral_frame_len(config.low_latency),
        ExtensionAlgorithm::Harmonic => 0,
    }
}

/// Signal-path delay in native-rate samples.
pub fn latency_samples(config: &Config, native_rate: f32) -> usize {
    let mut samples = 0;
    if config.interpolation_active() {
        samples += BLOCK_SIZE + interpolation_half_width(config);
    }
    if config.extension_active() {
        samples += BLOCK_SIZE + extender_latency_samples(config);
    }
    if config.spatial_active() {
        samples += BLOCK_SIZE + spatial_latency_samples(config, native_rate);
    }
    samples
}

/// Estimates end-to-end latency for `config` on a source at `native_rate`.
///
/// `hardware_ms` is the host's I/O latency when known.
pub fn estimate_latency(config: &Config, native_rate: f32, hardware_ms: Option<f32>) -> LatencyEstimate {
    let samples = latency_samples(config, native_rate);
    let hardware_ms = hardware_ms.unwrap_or(0.0);
    let path_ms = if native_rate > 0.0 {
        samples_to_ms(samples as f32, native_rate)
    } else {
        0.0
    };
    LatencyEstimate {
        samples,
        hardware_ms,
        ms: hardware_ms + path_ms,
    }
}
