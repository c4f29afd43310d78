//! FFT band replication.
//!
//! # Signal Flow
//!
//! ```text
//! input ─► ring (N) ─► every hop: Hann ─► FFT ─► replicate ─► IFFT ─► Hann ─► overlap-add ─► output
//! ```
//!
//! Frames are `N` samples (2048, or 512 in low-latency mode) with a hop of
//! `N/4`. Analysis and synthesis both use a periodic Hann window, so the
//! synthesis scale `hop / Σ w²` (= 2/3) makes the four overlapping `w²`
//! terms sum to one. Output trails input by exactly `N` samples.
//!
//! # Replication
//!
//! The source is assumed band-limited at [`SOURCE_CUTOFF_HZ`] (clipped to
//! Nyquist). For destination bin `cutoff + d` below the ceiling:
//!
//! ```text
//! src   = cutoff/2 + d mod (cutoff - cutoff/2)
//! gain  = intensity * 0.5 * (1 - d / (span + 1))
//! X[dst] += |X[src]| * gain * e^{i (arg X[src] + offset[dst])}
//! X[N - dst] = conj(X[dst])
//! ```
//!
//! `offset[k] = 2π * frac(k * φ⁻¹)` is a fixed golden-ratio sequence; with
//! [`PhaseMode::Source`] the source phase is copied unchanged.

use core::f32::consts::TAU;

use auralis_analysis::{Complex, Fft, Window};
use auralis_config::PhaseMode;

/// Frame length at full quality.
pub const FFT_SIZE: usize = 2048;
/// Frame length in low-latency mode.
pub const FFT_SIZE_LOW_LATENCY: usize = 512;
/// Assumed codec cutoff of the source.
pub const SOURCE_CUTOFF_HZ: f32 = 15000.0;

/// Level of a replicated bin relative to its source at full intensity.
const REPLICA_GAIN: f32 = 0.5;
/// Fractional part of the golden ratio.
const GOLDEN_FRACTION: f32 = 0.618_034;

/// Frame length for the given latency mode.
pub fn spectral_frame_len(low_latency: bool) -> usize {
    if low_latency {
        FFT_SIZE_LOW_LATENCY
    } else {
        FFT_SIZE
    }
}

/// FFT plan, window, and frame buffer for one frame length.
///
/// Shared by every channel; channels are processed one after another.
#[derive(Debug)]
pub struct FrameWorkspace {
    fft: Fft,
    window: Vec<f32>,
    norm: f32,
    buffer: Vec<Complex<f32>>,
}

impl FrameWorkspace {
    /// Plans the FFT and precomputes the window for `size`-sample frames.
    pub fn new(size: usize) -> Self {
        let hop = size / 4;
        Self {
            fft: Fft::new(size),
            window: Window::Hann.coefficients(size),
            norm: hop as f32 / Window::Hann.power_sum(size),
            buffer: vec![Complex::new(0.0, 0.0); size],
        }
    }

    /// Frame length.
    pub fn size(&self) -> usize {
        self.fft.size()
    }
}

/// Per-channel weighted overlap-add state.
///
/// Holds the analysis input ring (`N` samples) and the synthesis
/// accumulator (`2N` samples), both sized once for the largest frame.
#[derive(Debug, Clone)]
pub struct OverlapAdd {
    input: Vec<f32>,
    output: Vec<f32>,
    size: usize,
    hop: usize,
    count: u64,
}

impl OverlapAdd {
    /// Allocates for frames up to `max_size` and starts at `max_size`.
    pub fn new(max_size: usize) -> Self {
        Self {
            input: vec![0.0; max_size],
            output: vec![0.0; 2 * max_size],
            size: max_size,
            hop: max_size / 4,
            count: 0,
        }
    }

    /// Switches frame length and clears all state.
    ///
    /// `size` must not exceed the allocation made in [`new`](Self::new).
    pub fn set_size(&mut self, size: usize) {
        debug_assert!(size <= self.input.len());
        self.size = size.min(self.input.len());
        self.hop = self.size / 4;
        self.reset();
    }

    /// Current frame length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Delay from input to output in samples.
    pub fn latency(&self) -> usize {
        self.size
    }

    /// Clears both rings.
    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.output.fill(0.0);
        self.count = 0;
    }

    /// Pushes one sample and returns the sample `size` frames earlier after
    /// spectral processing by `shape`.
    ///
    /// `workspace.size()` must equal [`size`](Self::size).
    #[inline]
    pub fn process<F>(&mut self, x: f32, workspace: &mut FrameWorkspace, shape: &mut F) -> f32
    where
        F: FnMut(&mut [Complex<f32>]),
    {
        let n = self.size;
        let span = 2 * n;
        self.input[(self.count % n as u64) as usize] = x;
        self.count += 1;

        if self.count % self.hop as u64 == 0 {
            let oldest = (self.count % n as u64) as usize;
            for (i, slot) in workspace.buffer.iter_mut().enumerate() {
                *slot = Complex::new(self.input[(oldest + i) % n] * workspace.window[i], 0.0);
            }
            workspace.fft.forward_in_place(&mut workspace.buffer);
            shape(&mut workspace.buffer);
            workspace.fft.inverse_in_place(&mut workspace.buffer);

            let base = (self.count % span as u64) as usize;
            for (i, c) in workspace.buffer.iter().enumerate() {
                self.output[(base + i) % span] += c.re * workspace.window[i] * workspace.norm;
            }
        }

        let read = ((self.count - 1) % span as u64) as usize;
        let y = self.output[read];
        self.output[read] = 0.0;
        y
    }
}

/// Bin ranges and gains for one frame length and processing rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicationPlan {
    /// First bin above the assumed source cutoff.
    pub cutoff_bin: usize,
    /// One past the last destination bin.
    pub ceiling_bin: usize,
    /// First source bin (half the cutoff).
    pub source_bin: usize,
    /// Intensity as a fraction.
    pub intensity: f32,
    /// Phase strategy.
    pub phase: PhaseMode,
}

impl ReplicationPlan {
    /// Plans replication for `size`-point frames at `sample_rate`.
    pub fn new(
        size: usize,
        sample_rate: f32,
        ceiling_hz: f32,
        intensity_percent: f32,
        phase: PhaseMode,
    ) -> Self {
        let half = size / 2;
        let bin_hz = sample_rate / size as f32;
        let nyquist = sample_rate * 0.5;
        let cutoff_bin =
            ((SOURCE_CUTOFF_HZ.min(nyquist) / bin_hz).round() as usize).clamp(2, half);
        let ceiling_bin = ((ceiling_hz.min(nyquist) / bin_hz) as usize).min(half);
        Self {
            cutoff_bin,
            ceiling_bin: ceiling_bin.max(cutoff_bin),
            source_bin: cutoff_bin / 2,
            intensity: (intensity_percent / 100.0).clamp(0.0, 1.0),
            phase,
        }
    }

    /// Number of destination bins.
    pub fn span(&self) -> usize {
        self.ceiling_bin - self.cutoff_bin
    }

    /// Applies the plan to a full `N`-bin spectrum in place.
    pub fn apply(&self, spectrum: &mut [Complex<f32>], offsets: &[f32]) {
        let n = spectrum.len();
        let span = self.span();
        let source_span = (self.cutoff_bin - self.source_bin).max(1);
        let taper = 1.0 / (span + 1) as f32;

        for d in 0..span {
            let dest = self.cutoff_bin + d;
            if dest == 0 || dest >= n / 2 {
                break;
            }
            let source = spectrum[self.source_bin + d % source_span];
            let gain = self.intensity * REPLICA_GAIN * (1.0 - d as f32 * taper);
            let phase = match self.phase {
                PhaseMode::OffsetTable => source.arg() + offsets.get(dest).copied().unwrap_or(0.0),
                PhaseMode::Source => source.arg(),
            };
            spectrum[dest] += Complex::from_polar(source.norm() * gain, phase);
            spectrum[n - dest] = spectrum[dest].conj();
        }
    }
}

/// The deterministic per-bin phase offsets for frames up to `size` points.
pub fn phase_offset_table(size: usize) -> Vec<f32> {
    (0..=size / 2)
        .map(|k| {
            let x = k as f32 * GOLDEN_FRACTION;
            (x - x.floor()) * TAU
        })
        .collect()
}
