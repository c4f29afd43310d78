//! Engine status for a WAV file's format.

use std::path::PathBuf;

use auralis_core::{AudioBlock, BLOCK_SIZE};
use auralis_engine::{Orchestrator, StreamSource};
use clap::Args;

use super::common::SettingsArgs;
use crate::wav::{read_wav, read_wav_spec};

#[derive(Args)]
pub struct StatusArgs {
    /// WAV file whose format the engine connects to
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Run this many blocks of the file before reporting
    #[arg(long, default_value = "0")]
    blocks: usize,

    /// Host I/O latency in milliseconds
    #[arg(long)]
    hardware_ms: Option<f32>,
}

pub fn run(args: StatusArgs) -> anyhow::Result<()> {
    let spec = read_wav_spec(&args.input)?;
    let channels = usize::from(spec.channels);

    let mut engine = Orchestrator::new();
    engine.set_hardware_latency(args.hardware_ms);
    engine.connect(&StreamSource::new(spec.sample_rate as f32, channels))?;
    engine.update_settings(args.settings.resolve()?)?;

    if args.blocks > 0 {
        let wav = read_wav(&args.input)?;
        let processor = engine.processor();
        let mut output = AudioBlock::new(2);
        for chunk in wav
            .samples
            .chunks(BLOCK_SIZE * channels)
            .take(args.blocks)
        {
            processor.process(&AudioBlock::from_interleaved(chunk, channels), &mut output);
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.status())?);
    Ok(())
}
