//! State shared between the control side and the audio callback.
//!
//! [`EngineShared`] is the bridge between the thread that connects sources
//! and delivers settings, and the thread that runs blocks. The config is
//! published through `ArcSwap` for wait-free reads. The chain sits behind a
//! `Mutex` that the audio side only ever `try_lock`s. Status lives in
//! atomics so a status query never waits on the callback.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, AtomicU64, Ordering};

use arc_swap::ArcSwap;
use auralis_analysis::SPECTRUM_FLOOR_DB;
use auralis_config::Config;
use auralis_core::AudioBlock;
use parking_lot::{Mutex, MutexGuard};

use crate::chain::{PipelineChain, SPECTRUM_BINS};
use crate::status::ConnectionState;

/// A config tagged with the order it was accepted in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfigSnapshot {
    /// Monotonic acceptance number; the initial config is 0.
    pub sequence: u64,
    /// The settings themselves.
    pub config: Config,
}

/// Inner storage behind `Arc` so [`EngineShared`] can be cheaply cloned.
struct EngineSharedData {
    /// Latest accepted config.
    config: ArcSwap<ConfigSnapshot>,

    /// The chain of the live connection, `None` while disconnected.
    chain: Mutex<Option<PipelineChain>>,

    /// [`ConnectionState`] as `u8`.
    state: AtomicU8,

    /// Native rate of the connected source, f32 bit-cast.
    input_rate: AtomicU32,

    /// Set by the audio side after each reconfigure.
    accelerator: AtomicBool,

    underruns: AtomicU64,
    blocks: AtomicU64,
    contended: AtomicU64,

    /// Latest output spectrum in dB. Audio side writes with `try_lock`.
    spectrum: Mutex<Vec<f32>>,
    spectrum_fresh: AtomicBool,
}

/// Shared engine state, cloneable into the audio thread.
///
/// # Thread Safety
///
/// - **Config**: `ArcSwap::load()`, wait-free reads, `rcu` writes.
/// - **Chain**: `Mutex`; control side locks, audio side `try_lock`s.
/// - **Status**: atomics, lock-free both ways.
/// - **Spectrum**: `Mutex`; audio side `try_lock`s to publish.
#[derive(Clone)]
pub struct EngineShared {
    inner: Arc<EngineSharedData>,
}

impl core::fmt::Debug for EngineShared {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineShared")
            .field("config", &**self.inner.config.load())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl EngineShared {
    /// Disconnected state holding `config` as sequence 0.
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(EngineSharedData {
                config: ArcSwap::from_pointee(ConfigSnapshot {
                    sequence: 0,
                    config,
                }),
                chain: Mutex::new(None),
                state: AtomicU8::new(ConnectionState::Disconnected as u8),
                input_rate: AtomicU32::new(0.0f32.to_bits()),
                accelerator: AtomicBool::new(false),
                underruns: AtomicU64::new(0),
                blocks: AtomicU64::new(0),
                contended: AtomicU64::new(0),
                spectrum: Mutex::new(vec![SPECTRUM_FLOOR_DB; SPECTRUM_BINS]),
                spectrum_fresh: AtomicBool::new(false),
            }),
        }
    }

    // ── Config publication ──────────────────────────────────────────────────

    /// The latest accepted snapshot.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.inner.config.load_full()
    }

    /// Publishes `config` with the next sequence number and returns it.
    pub fn publish(&self, config: Config) -> u64 {
        let mut sequence = 0;
        self.inner.config.rcu(|current| {
            sequence = current.sequence + 1;
            ConfigSnapshot { sequence, config }
        });
        sequence
    }

    /// Publishes `config` only if `sequence` is newer than the current one.
    ///
    /// Returns false for a stale delivery, leaving the current config.
    pub fn publish_if_newer(&self, sequence: u64, config: Config) -> bool {
        let mut accepted = false;
        self.inner.config.rcu(|current| {
            accepted = sequence > current.sequence;
            if accepted {
                Arc::new(ConfigSnapshot { sequence, config })
            } else {
                Arc::clone(current)
            }
        });
        accepted
    }

    // ── Chain ownership ─────────────────────────────────────────────────────

    /// Blocks until no callback holds the chain.
    pub(crate) fn lock_chain(&self) -> MutexGuard<'_, Option<PipelineChain>> {
        self.inner.chain.lock()
    }

    // ── Status (lock-free) ──────────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.inner.state.store(state as u8, Ordering::Release);
    }

    /// Native rate of the connected source, 0 when disconnected.
    pub fn input_rate(&self) -> f32 {
        f32::from_bits(self.inner.input_rate.load(Ordering::Acquire))
    }

    pub(crate) fn set_input_rate(&self, rate: f32) {
        self.inner.input_rate.store(rate.to_bits(), Ordering::Release);
    }

    /// Whether the chain last reported an accelerated stage.
    pub fn accelerator_active(&self) -> bool {
        self.inner.accelerator.load(Ordering::Acquire)
    }

    pub(crate) fn set_accelerator(&self, active: bool) {
        self.inner.accelerator.store(active, Ordering::Release);
    }

    /// Counts one missed deadline.
    pub fn record_underrun(&self) {
        self.inner.underruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Missed deadlines on this connection.
    pub fn underruns(&self) -> u64 {
        self.inner.underruns.load(Ordering::Relaxed)
    }

    /// Blocks run through the chain on this connection.
    pub fn blocks_processed(&self) -> u64 {
        self.inner.blocks.load(Ordering::Relaxed)
    }

    /// Blocks replaced by silence while the chain was locked.
    pub fn contended_blocks(&self) -> u64 {
        self.inner.contended.load(Ordering::Relaxed)
    }

    /// Zeroes the per-connection counters and the spectrum.
    pub(crate) fn reset_counters(&self) {
        self.inner.underruns.store(0, Ordering::Relaxed);
        self.inner.blocks.store(0, Ordering::Relaxed);
        self.inner.contended.store(0, Ordering::Relaxed);
        self.inner.spectrum.lock().fill(SPECTRUM_FLOOR_DB);
        self.inner.spectrum_fresh.store(false, Ordering::Release);
    }

    // ── Spectrum ────────────────────────────────────────────────────────────

    /// Copies the latest spectrum into `out` and returns the bins written.
    ///
    /// Returns 0 if no spectrum has been published since connect.
    pub fn copy_spectrum(&self, out: &mut [f32]) -> usize {
        if !self.inner.spectrum_fresh.load(Ordering::Acquire) {
            return 0;
        }
        let bins = self.inner.spectrum.lock();
        let n = out.len().min(bins.len());
        out[..n].copy_from_slice(&bins[..n]);
        n
    }
}

/// Audio-side handle that runs blocks through the current chain.
///
/// Never blocks and never allocates. A block arriving while the control
/// side holds the chain comes out as silence.
#[derive(Debug, Clone)]
pub struct BlockProcessor {
    shared: EngineShared,
}

impl BlockProcessor {
    pub(crate) fn new(shared: EngineShared) -> Self {
        Self { shared }
    }

    /// Processes one block into a stereo `output`.
    ///
    /// Returns true if the block went through a chain, false if silence
    /// was written because none was available.
    pub fn process(&self, input: &AudioBlock, output: &mut AudioBlock) -> bool {
        let inner = &self.shared.inner;
        let snapshot = inner.config.load();

        let Some(mut guard) = inner.chain.try_lock() else {
            inner.contended.fetch_add(1, Ordering::Relaxed);
            write_silence(output);
            return false;
        };
        let Some(chain) = guard.as_mut() else {
            write_silence(output);
            return false;
        };

        if chain.apply(&snapshot) {
            inner
                .accelerator
                .store(chain.is_accelerated(), Ordering::Release);
        }
        chain.process(input, output);
        inner.blocks.fetch_add(1, Ordering::Relaxed);

        if let Some(mut bins) = inner.spectrum.try_lock()
            && chain.take_spectrum(&mut bins)
        {
            inner.spectrum_fresh.store(true, Ordering::Release);
        }
        true
    }
}

fn write_silence(output: &mut AudioBlock) {
    output.set_channels(2);
    output.silence();
}
