//! Error types for the engine.
//!
//! | Error | Raised by | Effect |
//! |-------|-----------|--------|
//! | [`ConnectionError`] | [`Orchestrator::connect`](crate::Orchestrator::connect) | connect fails, state returns to `Disconnected` |
//! | [`ValidationError`] | [`Orchestrator::update_settings`](crate::Orchestrator::update_settings) | config rejected, previous config kept |
//! | [`StageError`] | stage construction | stage omitted, chain keeps running |
//!
//! Underruns and stale settings are not errors; they only show up in
//! [`Status`](crate::Status) counters and trace logs.

use auralis_config::ValidationError;
use auralis_stages::StageError;
use thiserror::Error;

use crate::source::SourceId;

/// Fatal failure of a connect attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectionError {
    /// The source was dropped or closed before the chain could bind to it.
    #[error("source {0} has been destroyed")]
    SourceDestroyed(SourceId),

    /// The source runs at a rate the engine cannot process.
    #[error("source sample rate {0} Hz is not supported")]
    InvalidSampleRate(f32),

    /// The source has no channels or more than the engine can carry.
    #[error("source channel count {0} is not supported")]
    InvalidChannelCount(usize),

    /// The host refused the processing graph.
    #[error("audio graph unavailable: {0}")]
    GraphUnavailable(String),
}

/// Top-level engine error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Connect failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Settings rejected at the boundary.
    #[error("configuration rejected: {0}")]
    Config(#[from] ValidationError),

    /// A stage could not be built.
    #[error("stage unavailable: {0}")]
    Stage(#[from] StageError),
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
