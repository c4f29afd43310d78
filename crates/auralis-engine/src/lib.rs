//! Auralis Engine - pipeline orchestration for the auralis stages
//!
//! The [`Orchestrator`] binds one audio source at a time to a
//! [`PipelineChain`] of stages, accepts settings from a control thread, and
//! reports status and latency. The audio thread drives the chain through a
//! [`BlockProcessor`], which never blocks or allocates.
//!
//! ```text
//! control thread                         audio thread
//! ──────────────                         ────────────
//! connect / disconnect ─┐
//! update_settings ──────┼─► EngineShared ◄── BlockProcessor::process
//! status / frequency ◄──┘   (ArcSwap config, try_lock chain, atomics)
//! ```
//!
//! # Example
//!
//! ```rust
//! use auralis_config::{Config, SpatialMode};
//! use auralis_core::AudioBlock;
//! use auralis_engine::{Orchestrator, StreamSource};
//!
//! let mut engine = Orchestrator::new();
//! let source = StreamSource::new(48000.0, 2);
//! engine.connect(&source).unwrap();
//!
//! let mut config = Config::default();
//! config.spatial.mode = SpatialMode::StereoWide;
//! engine.update_settings(config).unwrap();
//!
//! let processor = engine.processor();
//! let input = AudioBlock::new(2);
//! let mut output = AudioBlock::new(2);
//! assert!(processor.process(&input, &mut output));
//!
//! let status = engine.status();
//! assert!(status.connected);
//! assert_eq!(status.output_rate, 48000.0);
//! ```

pub mod arena;
pub mod builder;
pub mod chain;
pub mod error;
pub mod latency;
pub mod orchestrator;
pub mod shared;
pub mod source;
pub mod status;

pub use arena::{ConnectionArena, ConnectionHandle, ConnectionRecord};
pub use builder::{DefaultStageBuilder, HarmonicOnlyBuilder, StageBuilder};
pub use chain::{OutputStage, PipelineChain, SPECTRUM_BINS, SPECTRUM_FRAME};
pub use error::{ConnectionError, EngineError, Result};
pub use latency::{LatencyEstimate, estimate_latency, extender_latency_samples, latency_samples};
pub use orchestrator::Orchestrator;
pub use shared::{BlockProcessor, ConfigSnapshot, EngineShared};
pub use source::{AudioSource, SourceId, StreamSource};
pub use status::{ConnectionState, Status};
