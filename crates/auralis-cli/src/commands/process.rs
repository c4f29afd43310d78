//! File-based processing through the engine.

use std::path::PathBuf;

use auralis_core::{AudioBlock, BLOCK_SIZE, linear_to_db};
use auralis_engine::{Orchestrator, StreamSource};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::common::SettingsArgs;
use crate::wav::{read_wav, write_wav_stereo};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (1-8 channels)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (always stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Append silence until the chain's delay has drained
    #[arg(long)]
    flush: bool,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        matches!(args.bit_depth, 16 | 24 | 32),
        "unsupported bit depth {} (expected 16, 24, or 32)",
        args.bit_depth
    );

    println!("Reading {}...", args.input.display());
    let wav = read_wav(&args.input)?;
    println!(
        "  {} frames x {} ch, {} Hz, {:.2}s",
        wav.frames(),
        wav.channels,
        wav.sample_rate,
        wav.duration_secs()
    );

    let config = args.settings.resolve()?;
    let mut engine = Orchestrator::new();
    let source = StreamSource::new(wav.sample_rate as f32, wav.channels);
    engine.connect(&source)?;
    engine.update_settings(config)?;

    let status = engine.status();
    if !status.missing_stages.is_empty() {
        println!("  bypassed stages: {}", status.missing_stages.join(", "));
    }
    let drain = if args.flush {
        auralis_engine::latency_samples(&config, wav.sample_rate as f32)
    } else {
        0
    };

    let frames = wav.frames();
    let pb = ProgressBar::new((frames + drain) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let processor = engine.processor();
    let channels = wav.channels;
    let mut output = Vec::with_capacity((frames + drain) * 2);
    let mut block_out = AudioBlock::new(2);
    let mut interleaved = [0.0f32; BLOCK_SIZE * 2];

    for chunk in wav.samples.chunks(BLOCK_SIZE * channels) {
        let input = AudioBlock::from_interleaved(chunk, channels);
        processor.process(&input, &mut block_out);
        let n = chunk.len() / channels;
        block_out.write_interleaved(&mut interleaved);
        output.extend_from_slice(&interleaved[..n * 2]);
        pb.inc(n as u64);
    }

    let silence = AudioBlock::new(channels);
    let mut remaining = drain;
    while remaining > 0 {
        processor.process(&silence, &mut block_out);
        let n = remaining.min(BLOCK_SIZE);
        block_out.write_interleaved(&mut interleaved);
        output.extend_from_slice(&interleaved[..n * 2]);
        remaining -= n;
        pb.inc(n as u64);
    }
    pb.finish_with_message("done");

    let status = engine.status();
    engine.disconnect();

    println!("\nStats:");
    println!("  Input:  Peak {:.1} dB", linear_to_db(peak(&wav.samples)));
    println!("  Output: Peak {:.1} dB", linear_to_db(peak(&output)));
    println!(
        "  Latency {:.2} ms, {} blocks, accelerator {}",
        status.latency_ms,
        status.blocks_processed,
        if status.accelerator_active { "on" } else { "off" }
    );

    // the block cadence stays native; the declared rate is left to the host resampler
    println!("\nWriting {}...", args.output.display());
    write_wav_stereo(&args.output, &output, wav.sample_rate, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}
