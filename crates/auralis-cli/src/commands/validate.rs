//! Config file validation.

use std::path::PathBuf;

use auralis_config::{validate_config, validate_for_rate};
use clap::Args;

use super::common::load_config_file;

#[derive(Args)]
pub struct ValidateArgs {
    /// Config or preset TOML file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Also check against a source at this rate (Hz)
    #[arg(short = 'r', long)]
    sample_rate: Option<f32>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = load_config_file(&args.file)?;
    match args.sample_rate {
        Some(rate) => validate_for_rate(&config, rate)?,
        None => validate_config(&config)?,
    }

    match args.sample_rate {
        Some(rate) => println!("{}: valid at {} Hz", args.file.display(), rate),
        None => println!("{}: valid", args.file.display()),
    }
    Ok(())
}
