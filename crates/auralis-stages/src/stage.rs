//! The [`Stage`] capability set shared by every processing stage.
//!
//! The orchestrator holds a homogeneous list of boxed stages and drives
//! them in a fixed order. Every method here runs on the audio thread except
//! construction, so implementations must not allocate, lock, or log inside
//! [`Stage::configure`] and [`Stage::process`].

use core::fmt;

use auralis_config::Config;
use auralis_core::{AudioBlock, BLOCK_SIZE, MAX_CHANNELS};
use thiserror::Error;

/// Which stage an instance implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Oversampling / smoothing.
    Interpolation,
    /// Bandwidth extension.
    Extender,
    /// Binaural virtualizer.
    Spatial,
}

impl StageKind {
    /// Chain order.
    pub const ALL: [StageKind; 3] = [
        StageKind::Interpolation,
        StageKind::Extender,
        StageKind::Spatial,
    ];

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Interpolation => "interpolation",
            StageKind::Extender => "extender",
            StageKind::Spatial => "spatial",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stream format a stage is built for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageContext {
    /// Native (callback) sample rate in Hz.
    pub native_rate: f32,
    /// Input channel count.
    pub channels: usize,
    /// Frames per callback.
    pub block_size: usize,
}

impl StageContext {
    /// Context for the engine's fixed block size.
    pub fn new(native_rate: f32, channels: usize) -> Self {
        Self {
            native_rate,
            channels,
            block_size: BLOCK_SIZE,
        }
    }

    /// Checks the format every stage can handle.
    ///
    /// # Errors
    ///
    /// The matching [`StageError`] for a rate outside 8-192 kHz, a channel
    /// count outside `1..=MAX_CHANNELS`, or a block size other than
    /// [`BLOCK_SIZE`].
    pub fn check(&self) -> Result<(), StageError> {
        if !(8000.0..=192_000.0).contains(&self.native_rate) {
            return Err(StageError::UnsupportedSampleRate(self.native_rate));
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            return Err(StageError::UnsupportedChannelCount(self.channels));
        }
        if self.block_size != BLOCK_SIZE {
            return Err(StageError::UnsupportedBlockSize(self.block_size));
        }
        Ok(())
    }
}

/// A stage could not be constructed.
///
/// The orchestrator omits the stage and keeps running the rest of the
/// chain; this is never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    /// Native rate the stage cannot run at.
    #[error("unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(f32),
    /// Channel count the stage cannot handle.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(usize),
    /// Callback size other than the engine block size.
    #[error("unsupported block size: {0} frames")]
    UnsupportedBlockSize(usize),
    /// A required processing resource is missing.
    #[error("accelerator unavailable: {0}")]
    AcceleratorUnavailable(String),
}

/// One stateful processing stage.
///
/// `configure` receives every new [`Config`] before the next block; `process`
/// always writes a full block to `output` (a copy of `input` when the stage is
/// bypassed). Implementations own their buffers exclusively.
pub trait Stage: Send {
    /// Which stage this is.
    fn kind(&self) -> StageKind;

    /// Applies a new config. Must not allocate.
    fn configure(&mut self, config: &Config);

    /// Processes one block.
    fn process(&mut self, input: &AudioBlock, output: &mut AudioBlock);

    /// Clears every buffer and filter history.
    fn reset(&mut self);

    /// Whether the last applied config makes this stage alter the signal.
    fn is_active(&self) -> bool;

    /// Delay added by this stage at the current config, in samples.
    fn latency_samples(&self) -> usize {
        0
    }

    /// Whether the stage is currently running an accelerated code path.
    fn is_accelerated(&self) -> bool {
        false
    }
}
