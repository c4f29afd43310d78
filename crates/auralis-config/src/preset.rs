//! Named, described configs stored as TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::Config;
use crate::error::ConfigError;

/// A [`Config`] with a name and description.
///
/// # TOML Format
///
/// ```toml
/// name = "Wide"
/// description = "Stereo widening without room simulation"
///
/// [config]
/// enabled = true
/// target_rate = "native"
/// quality = "sinc"
/// low_latency = false
///
/// [config.extension]
/// enabled = false
/// ceiling_hz = 20000
/// intensity = 0
///
/// [config.spatial]
/// mode = "stereo-wide"
/// width = 70
/// depth = 0
/// height = 0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The settings.
    pub config: Config,
}

impl Preset {
    /// Create a preset holding the default config.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config: Config::default(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the config.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpatialMode;

    #[test]
    fn test_preset_new() {
        let preset = Preset::new("Test Preset");
        assert_eq!(preset.name, "Test Preset");
        assert!(preset.description.is_none());
        assert_eq!(preset.config, Config::default());
    }

    #[test]
    fn test_preset_to_toml() {
        let mut config = Config::default();
        config.spatial.mode = SpatialMode::Atmos;
        let preset = Preset::new("Test")
            .with_description("Test description")
            .with_config(config);

        let toml = preset.to_toml().unwrap();
        assert!(toml.contains("name = \"Test\""), "{toml}");
        assert!(toml.contains("description = \"Test description\""), "{toml}");
        assert!(toml.contains("mode = \"atmos\""), "{toml}");
    }

    #[test]
    fn test_preset_roundtrip() {
        let original = Preset::new("Roundtrip").with_description("Testing serialization");
        let parsed = Preset::from_toml(&original.to_toml().unwrap()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_preset_default() {
        assert_eq!(Preset::default().name, "Untitled");
    }
}
