//! Connection lifecycle, settings boundary, and status.
//!
//! ```text
//!            connect(A)              disconnect()
//! Disconnected ──► Connecting ──► Connected ──► Disconnecting ──► Disconnected
//!       ▲               │              │
//!       └── error ──────┘              └── connect(B): Disconnecting first
//! ```
//!
//! Connect and disconnect take `&mut self`, so only one runs at a time.
//! Settings and status take `&self` and never wait on the audio callback.

use auralis_config::{
    Config, ValidationError, validate_config, validate_for_rate, validate_sample_rate,
};
use auralis_core::{AudioBlock, MAX_CHANNELS};
use auralis_stages::{StageContext, StageKind};

use crate::arena::{ConnectionArena, ConnectionHandle, ConnectionRecord};
use crate::builder::{DefaultStageBuilder, StageBuilder};
use crate::chain::PipelineChain;
use crate::error::{ConnectionError, EngineError};
use crate::latency::estimate_latency;
use crate::shared::{BlockProcessor, EngineShared};
use crate::source::AudioSource;
use crate::status::{ConnectionState, Status};

/// Owns the chain for at most one source at a time.
pub struct Orchestrator {
    shared: EngineShared,
    builder: Box<dyn StageBuilder>,
    arena: ConnectionArena,
    current: Option<ConnectionHandle>,
    missing: Vec<StageKind>,
    hardware_latency_ms: Option<f32>,
}

impl core::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("shared", &self.shared)
            .field("current", &self.current)
            .field("missing", &self.missing)
            .field("hardware_latency_ms", &self.hardware_latency_ms)
            .finish_non_exhaustive()
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Disconnected orchestrator with the default config and stage builder.
    pub fn new() -> Self {
        Self::with_builder(Box::new(DefaultStageBuilder))
    }

    /// Disconnected orchestrator that builds stages with `builder`.
    pub fn with_builder(builder: Box<dyn StageBuilder>) -> Self {
        Self {
            shared: EngineShared::new(Config::default()),
            builder,
            arena: ConnectionArena::new(),
            current: None,
            missing: Vec::new(),
            hardware_latency_ms: None,
        }
    }

    /// Includes the host's I/O latency in status reports.
    pub fn with_hardware_latency(mut self, ms: f32) -> Self {
        self.hardware_latency_ms = Some(ms);
        self
    }

    /// Updates the host's I/O latency.
    pub fn set_hardware_latency(&mut self, ms: Option<f32>) {
        self.hardware_latency_ms = ms;
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Binds a chain to `source`.
    ///
    /// Connecting the source that is already connected returns the existing
    /// handle and changes nothing. Connecting another source tears the
    /// current chain down first. Stages that fail to build are left out.
    ///
    /// # Errors
    ///
    /// [`ConnectionError`] when the source is destroyed, its format is
    /// unsupported, or the audio graph cannot be opened. The orchestrator is
    /// then `Disconnected` with no chain.
    pub fn connect(
        &mut self,
        source: &dyn AudioSource,
    ) -> Result<ConnectionHandle, ConnectionError> {
        let id = source.id();
        if let Some(handle) = self.current
            && self.arena.get(handle).is_some_and(|r| r.source == id)
        {
            tracing::debug!("connect: source {id} already connected");
            return Ok(handle);
        }

        self.disconnect();
        self.shared.set_state(ConnectionState::Connecting);

        match self.bind(source) {
            Ok(handle) => {
                self.shared.set_state(ConnectionState::Connected);
                Ok(handle)
            }
            Err(err) => {
                tracing::warn!(source = %id, error = %err, "connect: failed");
                self.shared.set_state(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    fn bind(&mut self, source: &dyn AudioSource) -> Result<ConnectionHandle, ConnectionError> {
        let id = source.id();
        if !source.is_alive() {
            return Err(ConnectionError::SourceDestroyed(id));
        }
        let native_rate = source.sample_rate();
        validate_sample_rate(native_rate)
            .map_err(|_| ConnectionError::InvalidSampleRate(native_rate))?;
        let channels = source.channels();
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(ConnectionError::InvalidChannelCount(channels));
        }

        let context = StageContext::new(native_rate, channels);
        self.builder.open_graph(&context)?;

        let mut chain = PipelineChain::build(self.builder.as_mut(), context);
        let snapshot = self.shared.snapshot();
        if let Err(err) = validate_for_rate(&snapshot.config, native_rate) {
            tracing::warn!(error = %err, "connect: config exceeds source format, stages clamp");
        }
        chain.apply(&snapshot);

        self.missing = chain.missing_stages().to_vec();
        self.shared.reset_counters();
        self.shared.set_accelerator(chain.is_accelerated());
        self.shared.set_input_rate(native_rate);
        *self.shared.lock_chain() = Some(chain);

        let handle = self.arena.insert(ConnectionRecord {
            source: id,
            native_rate,
            channels,
        });
        self.current = Some(handle);
        tracing::info!(
            source = %id,
            sample_rate = native_rate,
            channels,
            missing = self.missing.len(),
            "connect: chain bound"
        );
        Ok(handle)
    }

    /// Tears down the current chain. Safe to call when disconnected.
    ///
    /// Waits for an in-flight block to finish, then drops every stage
    /// before returning.
    pub fn disconnect(&mut self) {
        let Some(handle) = self.current.take() else {
            return;
        };
        self.shared.set_state(ConnectionState::Disconnecting);

        let chain = self.shared.lock_chain().take();
        drop(chain);

        let record = self.arena.remove(handle);
        self.missing.clear();
        self.shared.set_input_rate(0.0);
        self.shared.set_accelerator(false);
        self.shared.set_state(ConnectionState::Disconnected);
        if let Some(record) = record {
            tracing::info!(source = %record.source, "disconnect: chain released");
        }
    }

    /// Handle of the live connection.
    pub fn handle(&self) -> Option<ConnectionHandle> {
        self.current
    }

    /// Whether a chain is bound.
    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    fn connected_rate(&self) -> Option<f32> {
        self.current
            .and_then(|handle| self.arena.get(handle))
            .map(|record| record.native_rate)
    }

    // ── Settings ────────────────────────────────────────────────────────────

    fn check(&self, config: &Config) -> Result<(), ValidationError> {
        match self.connected_rate() {
            Some(rate) => validate_for_rate(config, rate),
            None => validate_config(config),
        }
    }

    /// Replaces the active config. The callback picks it up at its next
    /// block boundary.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] when `config` is invalid; the previous config
    /// stays active.
    pub fn update_settings(&self, config: Config) -> Result<(), EngineError> {
        if let Err(err) = self.check(&config) {
            tracing::warn!(error = %err, "update_settings: rejected");
            return Err(err.into());
        }
        let sequence = self.shared.publish(config);
        tracing::debug!("update_settings: accepted as {sequence}");
        Ok(())
    }

    /// Delivers a config tagged by an external settings source.
    ///
    /// Returns `Ok(false)` and keeps the current config when `sequence` is
    /// not newer than the last accepted one.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] when `config` is invalid.
    pub fn deliver_settings(&self, sequence: u64, config: Config) -> Result<bool, EngineError> {
        if let Err(err) = self.check(&config) {
            tracing::warn!(sequence, error = %err, "deliver_settings: rejected");
            return Err(err.into());
        }
        let accepted = self.shared.publish_if_newer(sequence, config);
        if accepted {
            tracing::debug!("deliver_settings: accepted {sequence}");
        } else {
            tracing::trace!("deliver_settings: stale {sequence}, dropped");
        }
        Ok(accepted)
    }

    /// The active config.
    pub fn config(&self) -> Config {
        self.shared.snapshot().config
    }

    // ── Audio side ──────────────────────────────────────────────────────────

    /// Handle for the audio thread.
    pub fn processor(&self) -> BlockProcessor {
        BlockProcessor::new(self.shared.clone())
    }

    /// Runs one block on the calling thread. See [`BlockProcessor::process`].
    pub fn process_block(&self, input: &AudioBlock, output: &mut AudioBlock) -> bool {
        self.processor().process(input, output)
    }

    /// Counts a block the host could not deliver in time.
    pub fn report_underrun(&self) {
        self.shared.record_underrun();
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Last-known state. Never waits on the callback.
    pub fn status(&self) -> Status {
        let state = self.shared.state();
        let config = self.shared.snapshot().config;
        let input_rate = self.shared.input_rate();
        let connected = state == ConnectionState::Connected;
        let latency = estimate_latency(&config, input_rate, self.hardware_latency_ms);
        Status {
            connected,
            state,
            input_rate,
            output_rate: if connected {
                config.output_rate(input_rate)
            } else {
                0.0
            },
            latency_ms: latency.ms,
            accelerator_active: self.shared.accelerator_active(),
            underruns: self.shared.underruns(),
            blocks_processed: self.shared.blocks_processed(),
            contended_blocks: self.shared.contended_blocks(),
            missing_stages: self.missing.iter().map(|k| k.as_str()).collect(),
        }
    }

    /// Copies the output power spectrum (dB per bin) into `out`.
    ///
    /// Returns the number of bins written, 0 before the first analysis
    /// frame of the current connection.
    pub fn frequency_data(&self, out: &mut [f32]) -> usize {
        self.shared.copy_spectrum(out)
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StreamSource;

    #[test]
    fn starts_disconnected() {
        let engine = Orchestrator::new();
        let status = engine.status();
        assert!(!status.connected);
        assert_eq!(status.state, ConnectionState::Disconnected);
        assert_eq!(status.input_rate, 0.0);
        assert_eq!(status.output_rate, 0.0);
    }

    #[test]
    fn connect_and_disconnect() {
        let mut engine = Orchestrator::new();
        let source = StreamSource::new(48000.0, 2);
        let handle = engine.connect(&source).unwrap();
        assert_eq!(engine.handle(), Some(handle));
        assert_eq!(engine.status().state, ConnectionState::Connected);
        assert_eq!(engine.status().input_rate, 48000.0);

        engine.disconnect();
        engine.disconnect();
        assert!(!engine.is_connected());
        assert_eq!(engine.status().state, ConnectionState::Disconnected);
    }

    #[test]
    fn invalid_format_reverts_to_disconnected() {
        let mut engine = Orchestrator::new();
        let err = engine.connect(&StreamSource::new(4000.0, 2)).unwrap_err();
        assert_eq!(err, ConnectionError::InvalidSampleRate(4000.0));
        assert_eq!(engine.status().state, ConnectionState::Disconnected);

        let err = engine.connect(&StreamSource::new(48000.0, 0)).unwrap_err();
        assert_eq!(err, ConnectionError::InvalidChannelCount(0));
        assert!(!engine.is_connected());
    }

    #[test]
    fn rejected_settings_keep_previous() {
        let mut engine = Orchestrator::new();
        engine.connect(&StreamSource::new(32000.0, 2)).unwrap();
        let mut config = Config::default();
        config.extension.enabled = true;
        config.extension.ceiling_hz = 20000.0;
        assert!(matches!(
            engine.update_settings(config),
            Err(EngineError::Config(ValidationError::CeilingAboveNyquist { .. }))
        ));
        assert_eq!(engine.config(), Config::default());
    }

    #[test]
    fn nyquist_is_only_checked_when_connected() {
        let engine = Orchestrator::new();
        let mut config = Config::default();
        config.extension.enabled = true;
        config.extension.ceiling_hz = 20000.0;
        assert!(engine.update_settings(config).is_ok());
    }

    #[test]
    fn underruns_are_counted() {
        let engine = Orchestrator::new();
        engine.report_underrun();
        engine.report_underrun();
        assert_eq!(engine.status().underruns, 2);
    }
}
