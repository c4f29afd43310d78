//! The immutable settings snapshot read by the signal chain.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Output rate relative to the source's native rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetRate {
    /// Same as the source.
    #[default]
    #[serde(rename = "native")]
    Native,
    /// Twice the native rate.
    #[serde(rename = "2x")]
    Double,
    /// Four times the native rate.
    #[serde(rename = "4x")]
    Quadruple,
}

impl TargetRate {
    /// Integer multiple of the native rate.
    pub fn factor(self) -> u32 {
        match self {
            TargetRate::Native => 1,
            TargetRate::Double => 2,
            TargetRate::Quadruple => 4,
        }
    }

    /// Name as written in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetRate::Native => "native",
            TargetRate::Double => "2x",
            TargetRate::Quadruple => "4x",
        }
    }
}

/// Interpolation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Quality {
    /// Two-point linear interpolation.
    Linear,
    /// Lanczos-windowed sinc.
    #[default]
    Sinc,
}

/// Bandwidth-extension algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionAlgorithm {
    /// FFT overlap-add band replication.
    #[default]
    Spectral,
    /// Soft-clip harmonic generation (lower latency).
    Harmonic,
}

/// Phase assigned to replicated bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseMode {
    /// Source phase rotated by a fixed per-bin offset table.
    #[default]
    OffsetTable,
    /// Source phase copied unchanged.
    Source,
}

/// Virtualizer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SpatialMode {
    /// Bypass.
    #[default]
    Off,
    /// ITD/ILD, crossfeed and side widening.
    StereoWide,
    /// Stereo-wide plus early reflections and a virtual 7.1 downmix.
    #[serde(rename = "surround-71")]
    Surround71,
    /// Surround-71 plus the pinna height cue.
    Atmos,
}

impl SpatialMode {
    /// Name as written in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            SpatialMode::Off => "off",
            SpatialMode::StereoWide => "stereo-wide",
            SpatialMode::Surround71 => "surround-71",
            SpatialMode::Atmos => "atmos",
        }
    }

    /// True for the modes that render reflections and rear channels.
    pub fn has_room(self) -> bool {
        matches!(self, SpatialMode::Surround71 | SpatialMode::Atmos)
    }
}

/// Bandwidth-extension settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfig {
    /// Stage enable.
    pub enabled: bool,
    /// Highest synthesized frequency in Hz.
    pub ceiling_hz: f32,
    /// Strength, 0-100.
    pub intensity: f32,
    /// Which extender runs.
    #[serde(default)]
    pub algorithm: ExtensionAlgorithm,
    /// Phase strategy for the spectral extender.
    #[serde(default)]
    pub phase: PhaseMode,
}

impl ExtensionConfig {
    /// Whether the extender changes the signal at all.
    pub fn is_active(&self) -> bool {
        self.enabled && self.intensity > 0.0
    }
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ceiling_hz: 20000.0,
            intensity: 50.0,
            algorithm: ExtensionAlgorithm::default(),
            phase: PhaseMode::default(),
        }
    }
}

/// Virtualizer settings. All amounts are 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialConfig {
    /// Rendering mode.
    pub mode: SpatialMode,
    /// Stereo spread and ITD/ILD scale.
    pub width: f32,
    /// Early-reflection and rear level.
    pub depth: f32,
    /// Pinna cue level (atmos only).
    pub height: f32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            mode: SpatialMode::Off,
            width: 50.0,
            depth: 30.0,
            height: 0.0,
        }
    }
}

/// Complete engine settings.
///
/// A new `Config` always replaces the previous one wholesale.
///
/// # TOML Format
///
/// ```toml
/// enabled = true
/// target_rate = "2x"
/// quality = "sinc"
/// low_latency = false
///
/// [extension]
/// enabled = true
/// ceiling_hz = 20000
/// intensity = 60
/// algorithm = "spectral"
///
/// [spatial]
/// mode = "stereo-wide"
/// width = 70
/// depth = 30
/// height = 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Master enable; `false` bypasses every stage.
    pub enabled: bool,
    /// Declared output rate.
    pub target_rate: TargetRate,
    /// Interpolation kernel.
    pub quality: Quality,
    /// Shorter windows and delay lines.
    pub low_latency: bool,
    /// Gain applied by the output stage, in dB.
    #[serde(default)]
    pub output_gain_db: f32,
    /// Bandwidth extension.
    pub extension: ExtensionConfig,
    /// Spatial virtualizer.
    pub spatial: SpatialConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            target_rate: TargetRate::Native,
            quality: Quality::Sinc,
            low_latency: false,
            output_gain_db: 0.0,
            extension: ExtensionConfig::default(),
            spatial: SpatialConfig::default(),
        }
    }
}

impl Config {
    /// Everything switched off.
    pub fn bypass() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Output rate for a source running at `native_rate`.
    pub fn output_rate(&self, native_rate: f32) -> f32 {
        native_rate * self.target_rate.factor() as f32
    }

    /// Whether the interpolation stage changes the signal.
    pub fn interpolation_active(&self) -> bool {
        self.enabled && self.target_rate.factor() > 1
    }

    /// Whether the extender changes the signal.
    pub fn extension_active(&self) -> bool {
        self.enabled && self.extension.is_active()
    }

    /// Whether the virtualizer changes the signal.
    pub fn spatial_active(&self) -> bool {
        self.enabled && self.spatial.mode != SpatialMode::Off
    }

    /// Rate the extender and virtualizer are tuned for: the target rate
    /// while interpolation is active, the native rate otherwise.
    pub fn processing_rate(&self, native_rate: f32) -> f32 {
        if self.interpolation_active() {
            self.output_rate(native_rate)
        } else {
            native_rate
        }
    }

    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
enabled = true
target_rate = "2x"
quality = "linear"
low_latency = true

[extension]
enabled = true
ceiling_hz = 18000
intensity = 75
algorithm = "harmonic"
phase = "source"

[spatial]
mode = "surround-71"
width = 80
depth = 40
height = 10
"#;

    #[test]
    fn parses_every_field() {
        let config = Config::from_toml(FULL).unwrap();
        assert_eq!(config.target_rate, TargetRate::Double);
        assert_eq!(config.quality, Quality::Linear);
        assert!(config.low_latency);
        assert_eq!(config.extension.ceiling_hz, 18000.0);
        assert_eq!(config.extension.algorithm, ExtensionAlgorithm::Harmonic);
        assert_eq!(config.extension.phase, PhaseMode::Source);
        assert_eq!(config.spatial.mode, SpatialMode::Surround71);
        assert_eq!(config.output_gain_db, 0.0, "defaulted");
    }

    #[test]
    fn supplementary_fields_default() {
        let toml = FULL
            .replace("algorithm = \"harmonic\"\n", "")
            .replace("phase = \"source\"\n", "");
        let config = Config::from_toml(&toml).unwrap();
        assert_eq!(config.extension.algorithm, ExtensionAlgorithm::Spectral);
        assert_eq!(config.extension.phase, PhaseMode::OffsetTable);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let toml = FULL.replace("quality = \"linear\"\n", "");
        assert!(matches!(
            Config::from_toml(&toml),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let toml = FULL.replace("surround-71", "surround-51");
        assert!(Config::from_toml(&toml).is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = Config::from_toml(FULL).unwrap();
        let back = Config::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn enum_names_match_schema() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("target_rate = \"native\""), "{toml}");
        assert!(toml.contains("quality = \"sinc\""), "{toml}");
        assert!(toml.contains("mode = \"off\""), "{toml}");
        assert_eq!(SpatialMode::Surround71.as_str(), "surround-71");
        assert_eq!(TargetRate::Quadruple.as_str(), "4x");
    }

    #[test]
    fn rate_helpers() {
        let mut config = Config {
            target_rate: TargetRate::Quadruple,
            ..Config::default()
        };
        assert_eq!(config.output_rate(48000.0), 192000.0);
        assert!(config.interpolation_active());
        assert_eq!(config.processing_rate(48000.0), 192000.0);

        config.enabled = false;
        assert!(!config.interpolation_active());
        assert_eq!(config.processing_rate(48000.0), 48000.0);
    }

    #[test]
    fn zero_intensity_is_inactive() {
        let mut config = Config::default();
        config.extension.enabled = true;
        config.extension.intensity = 0.0;
        assert!(!config.extension_active());
        config.extension.intensity = 1.0;
        assert!(config.extension_active());
    }
}
