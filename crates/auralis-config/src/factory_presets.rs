//! Factory presets bundled with the library.
//!
//! Built-in presets are always available without external files and serve
//! as starting points for hosts.

use crate::Preset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "reference",
    "hifi",
    "wide",
    "cinema",
    "atmos",
    "low-latency",
];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("reference", REFERENCE_PRESET),
    ("hifi", HIFI_PRESET),
    ("wide", WIDE_PRESET),
    ("cinema", CINEMA_PRESET),
    ("atmos", ATMOS_PRESET),
    ("low-latency", LOW_LATENCY_PRESET),
];

const REFERENCE_PRESET: &str = r#"
name = "Reference"
description = "Untouched signal path - every stage bypassed"

[config]
enabled = false
target_rate = "native"
quality = "sinc"
low_latency = false

[config.extension]
enabled = false
ceiling_hz = 20000
intensity = 0

[config.spatial]
mode = "off"
width = 0
depth = 0
height = 0
"#;

const HIFI_PRESET: &str = r#"
name = "Hi-Fi"
description = "2x sinc oversampling with spectral band replication up to 20 kHz"

[config]
enabled = true
target_rate = "2x"
quality = "sinc"
low_latency = false

[config.extension]
enabled = true
ceiling_hz = 20000
intensity = 60
algorithm = "spectral"
phase = "offset-table"

[config.spatial]
mode = "off"
width = 50
depth = 0
height = 0
"#;

const WIDE_PRESET: &str = r#"
name = "Wide"
description = "Headphone widening with crossfeed, no room simulation"

[config]
enabled = true
target_rate = "native"
quality = "sinc"
low_latency = false

[config.extension]
enabled = false
ceiling_hz = 20000
intensity = 0

[config.spatial]
mode = "stereo-wide"
width = 70
depth = 0
height = 0
"#;

const CINEMA_PRESET: &str = r#"
name = "Cinema"
description = "Virtual 7.1 room with early reflections and restored highs"

[config]
enabled = true
target_rate = "native"
quality = "sinc"
low_latency = false

[config.extension]
enabled = true
ceiling_hz = 20000
intensity = 40
algorithm = "spectral"

[config.spatial]
mode = "surround-71"
width = 60
depth = 50
height = 0
"#;

const ATMOS_PRESET: &str = r#"
name = "Atmos"
description = "Virtual 7.1 with height cue at 2x rate"

[config]
enabled = true
target_rate = "2x"
quality = "sinc"
low_latency = false

[config.extension]
enabled = true
ceiling_hz = 22000
intensity = 40
algorithm = "spectral"

[config.spatial]
mode = "atmos"
width = 60
depth = 50
height = 60
"#;

const LOW_LATENCY_PRESET: &str = r#"
name = "Low Latency"
description = "Short windows, harmonic extender and stereo widening for live monitoring"

[config]
enabled = true
target_rate = "native"
quality = "linear"
low_latency = true

[config.extension]
enabled = true
ceiling_hz = 18000
intensity = 30
algorithm = "harmonic"

[config.spatial]
mode = "stereo-wide"
width = 50
depth = 0
height = 0
"#;

/// Get all factory presets.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by internal or display name, case-insensitive.
///
/// # Example
///
/// ```rust
/// use auralis_config::get_factory_preset;
///
/// let preset = get_factory_preset("cinema").unwrap();
/// assert_eq!(preset.name, "Cinema");
/// ```
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    for (preset_name, toml) in FACTORY_PRESETS_TOML {
        if preset_name.to_lowercase() == name_lower {
            return Preset::from_toml(toml).ok();
        }
    }

    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Get the internal names of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Check if a name matches a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtensionAlgorithm, SpatialMode, TargetRate};
    use crate::validation::validate_for_rate;

    #[test]
    fn test_all_factory_presets_parse() {
        for (name, toml) in FACTORY_PRESETS_TOML {
            let result = Preset::from_toml(toml);
            assert!(result.is_ok(), "factory preset '{name}' should parse: {result:?}");
            let preset = result.unwrap();
            assert!(!preset.name.is_empty());
            assert!(preset.description.is_some(), "preset '{name}' needs a description");
        }
        assert_eq!(factory_presets().len(), FACTORY_PRESET_NAMES.len());
    }

    #[test]
    fn test_factory_presets_valid_at_common_rates() {
        for preset in factory_presets() {
            for rate in [44100.0, 48000.0, 96000.0] {
                assert_eq!(
                    validate_for_rate(&preset.config, rate),
                    Ok(()),
                    "preset '{}' at {rate}",
                    preset.name
                );
            }
        }
    }

    #[test]
    fn test_get_factory_preset() {
        assert_eq!(get_factory_preset("hifi").unwrap().name, "Hi-Fi");
        assert_eq!(get_factory_preset("Low Latency").unwrap().name, "Low Latency");
        assert_eq!(get_factory_preset("ATMOS").unwrap().name, "Atmos");
        assert!(get_factory_preset("nonexistent").is_none());
    }

    #[test]
    fn test_names_match_table() {
        assert_eq!(factory_preset_names(), FACTORY_PRESET_NAMES.to_vec());
        assert!(is_factory_preset("Cinema"));
        assert!(!is_factory_preset("my_custom_preset"));
    }

    #[test]
    fn test_preset_characteristics() {
        let reference = get_factory_preset("reference").unwrap();
        assert!(!reference.config.enabled);

        let atmos = get_factory_preset("atmos").unwrap();
        assert_eq!(atmos.config.spatial.mode, SpatialMode::Atmos);
        assert_eq!(atmos.config.target_rate, TargetRate::Double);

        let live = get_factory_preset("low-latency").unwrap();
        assert!(live.config.low_latency);
        assert_eq!(live.config.extension.algorithm, ExtensionAlgorithm::Harmonic);
    }
}
