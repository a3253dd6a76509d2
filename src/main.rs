//! onsetd - streaming onset detection over stdin/stdout.
//!
//! Startup parameters are positional so harnesses can launch the process
//! with a fixed argument order. Logs go to stderr; stdout carries only the
//! protocol lines.

use clap::Parser;
use env_logger::Env;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use onsetd::server;
use onsetd::{Pipeline, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "onsetd", about = "Streaming time-domain onset detection pipeline")]
struct Args {
    /// Sample rate in Hz
    sample_rate: u32,
    /// Samples per chunk
    chunk_size: usize,
    /// Band-pass low cutoff in Hz
    low_cutoff: f32,
    /// Band-pass high cutoff in Hz
    high_cutoff: f32,
    /// Onset sensitivity (larger = more triggers)
    sensitivity: f32,
    /// Record all intermediate signals as binary traces into this directory
    #[arg(long)]
    trace_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("onsetd: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> onsetd::Result<()> {
    let config = PipelineConfig {
        sample_rate_hz: args.sample_rate,
        chunk_size: args.chunk_size,
        low_cutoff_hz: args.low_cutoff,
        high_cutoff_hz: args.high_cutoff,
        sensitivity: args.sensitivity,
    };

    // Any configuration error returns here, before the ready line.
    let mut pipeline = Pipeline::new(config)?;
    if let Some(dir) = &args.trace_dir {
        pipeline.enable_tracing(dir)?;
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    server::serve(
        &mut pipeline,
        BufReader::new(stdin.lock()),
        &mut stdout.lock(),
    )
}
