//! Configuration, validation, and presets for the auralis engine.
//!
//! # Features
//!
//! - **Config**: The immutable settings snapshot the signal chain reads once per block
//! - **Validation**: Field ranges and rate-dependent checks, applied at the settings boundary
//! - **Presets**: Named configs loaded from and saved to TOML
//! - **Factory Presets**: Built-in presets for common listening setups
//!
//! # Example
//!
//! ```rust,no_run
//! use auralis_config::{Config, Preset, SpatialMode, validate_for_rate};
//!
//! let mut config = Config::default();
//! config.spatial.mode = SpatialMode::StereoWide;
//! config.spatial.width = 80.0;
//! validate_for_rate(&config, 48000.0).unwrap();
//!
//! Preset::new("Mine").with_config(config).save("mine.toml").unwrap();
//! ```

mod config;
mod error;
mod preset;

/// Config validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use config::{
    Config, ExtensionAlgorithm, ExtensionConfig, PhaseMode, Quality, SpatialConfig, SpatialMode,
    TargetRate,
};
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use preset::Preset;
pub use validation::{
    ValidationError, ValidationResult, validate_config, validate_for_rate, validate_sample_rate,
};
