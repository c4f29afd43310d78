//! Status snapshot returned to the caller.

use core::fmt;

use serde::Serialize;

/// Orchestrator lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectionState {
    /// No chain.
    Disconnected = 0,
    /// Building a chain.
    Connecting = 1,
    /// Chain bound and processing.
    Connected = 2,
    /// Tearing the chain down.
    Disconnecting = 3,
}

impl ConnectionState {
    /// Decodes the value stored in the shared state atomic.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            3 => ConnectionState::Disconnecting,
            _ => ConnectionState::Disconnected,
        }
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-known engine state. Building one never blocks the audio thread.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    /// A chain is bound to a source.
    pub connected: bool,
    /// Lifecycle state.
    pub state: ConnectionState,
    /// Native rate of the connected source, 0 when disconnected.
    pub input_rate: f32,
    /// Declared output rate, 0 when disconnected.
    pub output_rate: f32,
    /// Latency estimate for the active config.
    pub latency_ms: f32,
    /// An accelerated (FFT) stage is running.
    pub accelerator_active: bool,
    /// Deadline misses reported by the host.
    pub underruns: u64,
    /// Blocks the audio side has processed on this connection.
    pub blocks_processed: u64,
    /// Blocks output as silence because the chain was being swapped.
    pub contended_blocks: u64,
    /// Stages left out of the chain because they failed to build.
    pub missing_stages: Vec<&'static str>,
}
