//! Latency estimate for a config, before any source is connected.

use auralis_core::{BLOCK_SIZE, samples_to_ms};
use auralis_engine::{LatencyEstimate, estimate_latency, extender_latency_samples};
use auralis_stages::{interpolation_half_width, spatial_latency_samples};
use clap::Args;
use serde::Serialize;

use super::common::SettingsArgs;

#[derive(Args)]
pub struct LatencyArgs {
    #[command(flatten)]
    settings: SettingsArgs,

    /// Native sample rate of the source in Hz
    #[arg(short = 'r', long, default_value = "48000")]
    sample_rate: f32,

    /// Host I/O latency in milliseconds
    #[arg(long)]
    hardware_ms: Option<f32>,

    /// Print the estimate as JSON
    #[arg(long)]
    json: bool,
}

/// One active stage's share of the delay.
#[derive(Debug, Serialize)]
struct StageLatency {
    stage: &'static str,
    samples: usize,
}

#[derive(Debug, Serialize)]
struct Report {
    sample_rate: f32,
    #[serde(flatten)]
    estimate: LatencyEstimate,
    stages: Vec<StageLatency>,
}

pub fn run(args: LatencyArgs) -> anyhow::Result<()> {
    let config = args.settings.resolve()?;
    let rate = args.sample_rate;
    auralis_config::validate_sample_rate(rate)?;

    let mut stages = Vec::new();
    if config.interpolation_active() {
        stages.push(StageLatency {
            stage: "interpolation",
            samples: BLOCK_SIZE + interpolation_half_width(&config),
        });
    }
    if config.extension_active() {
        stages.push(StageLatency {
            stage: "extender",
            samples: BLOCK_SIZE + extender_latency_samples(&config),
        });
    }
    if config.spatial_active() {
        stages.push(StageLatency {
            stage: "spatial",
            samples: BLOCK_SIZE + spatial_latency_samples(&config, rate),
        });
    }

    let report = Report {
        sample_rate: rate,
        estimate: estimate_latency(&config, rate, args.hardware_ms),
        stages,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Latency at {} Hz", report.sample_rate);
    println!("================");
    if report.stages.is_empty() {
        println!("  (all stages bypassed)");
    }
    for stage in &report.stages {
        println!(
            "  {:14} {:6} samples  {:7.2} ms",
            stage.stage,
            stage.samples,
            samples_to_ms(stage.samples as f32, rate)
        );
    }
    if report.estimate.hardware_ms > 0.0 {
        println!("  {:14} {:>22.2} ms", "hardware", report.estimate.hardware_ms);
    }
    println!(
        "  {:14} {:6} samples  {:7.2} ms",
        "total", report.estimate.samples, report.estimate.ms
    );
    Ok(())
}
