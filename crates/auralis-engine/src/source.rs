//! The source collaborator boundary.
//!
//! The engine never discovers or owns media sources. A host hands it
//! something implementing [`AudioSource`] and then pushes that source's
//! blocks through [`BlockProcessor`](crate::BlockProcessor).

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Stable identity of a source across reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A stream of fixed-size blocks at a declared native rate.
pub trait AudioSource {
    /// Identity used for connect idempotence.
    fn id(&self) -> SourceId;

    /// Native sample rate in Hz.
    fn sample_rate(&self) -> f32;

    /// Channels per block.
    fn channels(&self) -> usize;

    /// False once the host has destroyed the source.
    fn is_alive(&self) -> bool;
}

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// A plain source description with a shared liveness flag.
///
/// Clones share the flag, so a host can keep one clone and
/// [`close`](Self::close) it while the engine holds another.
#[derive(Debug, Clone)]
pub struct StreamSource {
    id: SourceId,
    sample_rate: f32,
    channels: usize,
    alive: Arc<AtomicBool>,
}

impl StreamSource {
    /// Creates a live source with a fresh id.
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        Self {
            id: SourceId(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed)),
            sample_rate,
            channels,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Marks the source destroyed.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

impl AudioSource for StreamSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = StreamSource::new(48000.0, 2);
        let b = StreamSource::new(48000.0, 2);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn close_is_shared_between_clones() {
        let source = StreamSource::new(44100.0, 2);
        let held = source.clone();
        assert!(held.is_alive());
        source.close();
        assert!(!held.is_alive());
    }
}
