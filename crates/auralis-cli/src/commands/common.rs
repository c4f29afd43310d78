//! Settings resolution shared by the commands.

use std::path::{Path, PathBuf};

use auralis_config::{Config, ConfigError, Preset, get_factory_preset};
use clap::Args;

/// Where a command takes its [`Config`] from.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Factory preset name (see `auralis presets list`)
    #[arg(short, long, conflicts_with = "config")]
    pub preset: Option<String>,

    /// Config or preset TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl SettingsArgs {
    /// The selected config, or the default one.
    pub fn resolve(&self) -> anyhow::Result<Config> {
        if let Some(name) = &self.preset {
            let preset = get_factory_preset(name)
                .ok_or_else(|| ConfigError::PresetNotFound(name.clone()))?;
            return Ok(preset.config);
        }
        if let Some(path) = &self.config {
            return Ok(load_config_file(path)?);
        }
        Ok(Config::default())
    }
}

/// Loads a bare config file, falling back to a preset file's `[config]`.
///
/// On failure the error is the one from parsing as a bare config.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    Config::load(path).or_else(|err| match Preset::load(path) {
        Ok(preset) => Ok(preset.config),
        Err(_) => Err(err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_name_resolves() {
        let args = SettingsArgs {
            preset: Some("cinema".into()),
            config: None,
        };
        let config = args.resolve().unwrap();
        assert_eq!(config, get_factory_preset("cinema").unwrap().config);
    }

    #[test]
    fn unknown_preset_fails() {
        let args = SettingsArgs {
            preset: Some("nope".into()),
            config: None,
        };
        assert!(args.resolve().is_err());
    }

    #[test]
    fn preset_file_is_accepted_as_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wide.toml");
        let preset = get_factory_preset("wide").unwrap();
        preset.save(&path).unwrap();
        assert_eq!(load_config_file(&path).unwrap(), preset.config);

        let bare = dir.path().join("bare.toml");
        preset.config.save(&bare).unwrap();
        assert_eq!(load_config_file(&bare).unwrap(), preset.config);
    }
}
