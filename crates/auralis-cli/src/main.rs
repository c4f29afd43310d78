//! Auralis CLI - offline host for the auralis engine.
//!
//! Plays the part of the source, sink, and settings collaborators: reads a
//! WAV file, pushes it block by block through an [`Orchestrator`], and writes
//! the stereo result.
//!
//! [`Orchestrator`]: auralis_engine::Orchestrator

mod commands;
mod wav;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "auralis")]
#[command(author, version, about = "Auralis spatial audio engine CLI", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the engine
    Process(commands::process::ProcessArgs),

    /// Estimate latency for a config at a source rate
    Latency(commands::latency::LatencyArgs),

    /// List, show, and export factory presets
    Presets(commands::presets::PresetsArgs),

    /// Validate a config file
    Validate(commands::validate::ValidateArgs),

    /// Connect to a WAV file's format and print the engine status as JSON
    Status(commands::status::StatusArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Latency(args) => commands::latency::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Status(args) => commands::status::run(args),
    }
}
