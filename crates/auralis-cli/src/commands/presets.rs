//! Factory preset commands.

use std::path::PathBuf;

use auralis_config::{ConfigError, Preset, factory_preset_names, get_factory_preset};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List factory presets
    List,

    /// Print a preset as TOML
    Show {
        /// Preset name
        name: String,
    },

    /// Write a preset to a TOML file
    Export {
        /// Preset name
        name: String,

        /// Destination file (defaults to `<name>.toml`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list_presets(),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Export {
            name,
            output,
            force,
        } => export_preset(&name, output, force),
    }
}

fn find_preset(name: &str) -> Result<Preset, ConfigError> {
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

fn list_presets() -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");
    for name in factory_preset_names() {
        let preset = find_preset(name)?;
        let desc = preset.description.as_deref().unwrap_or("");
        println!("  {:14} - {}", name, desc);
    }
    Ok(())
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let preset = find_preset(name)?;
    print!("{}", preset.to_toml()?);
    Ok(())
}

fn export_preset(name: &str, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let preset = find_preset(name)?;
    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.toml", name.to_lowercase())));
    if path.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", path.display());
    }
    preset.save(&path)?;
    tracing::info!(preset = %preset.name, path = %path.display(), "preset exported");
    println!("Exported '{}' to {}", preset.name, path.display());
    Ok(())
}
