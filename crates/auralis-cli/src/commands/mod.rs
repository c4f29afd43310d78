//! CLI command implementations.

pub mod common;
pub mod latency;
pub mod presets;
pub mod process;
pub mod status;
pub mod validate;
