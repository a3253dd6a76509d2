//! onsetd-feed - run the pipeline over a WAV file.
//!
//! Offline counterpart to the stdin-driven process: reads a WAV file,
//! chunks it, runs the same pipeline in-process, and prints one result line
//! per chunk. Useful for tuning the band and sensitivity against recorded
//! material, and for producing trace files to plot.

use clap::Parser;
use env_logger::Env;
use hound::{SampleFormat, WavReader};
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

use onsetd::{OnsetError, Pipeline, PipelineConfig, Result};

#[derive(Parser, Debug)]
#[command(name = "onsetd-feed", about = "Run onset detection over a WAV file")]
struct Args {
    /// Input WAV file
    input: PathBuf,
    /// Samples per chunk
    #[arg(long, default_value_t = 1024)]
    chunk_size: usize,
    /// Band-pass low cutoff in Hz
    #[arg(long, default_value_t = 40.0)]
    low_cutoff: f32,
    /// Band-pass high cutoff in Hz
    #[arg(long, default_value_t = 120.0)]
    high_cutoff: f32,
    /// Onset sensitivity (larger = more triggers)
    #[arg(long, default_value_t = 1.0)]
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
            eprintln!("onsetd-feed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let (sample_rate, samples) = read_wav_mono(&args.input)?;
    info!(
        "loaded {}: {} samples at {} Hz",
        args.input.display(),
        samples.len(),
        sample_rate
    );

    let config = PipelineConfig {
        sample_rate_hz: sample_rate,
        chunk_size: args.chunk_size,
        low_cutoff_hz: args.low_cutoff,
        high_cutoff_hz: args.high_cutoff,
        sensitivity: args.sensitivity,
    };

    let mut pipeline = Pipeline::new(config)?;
    if let Some(dir) = &args.trace_dir {
        pipeline.enable_tracing(dir)?;
    }

    let mut onsets = 0u64;
    for chunk in samples.chunks_exact(args.chunk_size) {
        let result = pipeline.process_chunk(chunk)?;
        if result.onset_detected {
            onsets += 1;
        }
        println!("{}", serde_json::to_string(&result)?);
    }

    let tail = samples.len() % args.chunk_size;
    if tail != 0 {
        warn!("dropped {} trailing samples (incomplete chunk)", tail);
    }

    pipeline.shutdown();
    info!("{} onsets detected", onsets);
    Ok(())
}

/// Read a WAV file and fold it down to mono f32 in [-1, 1].
fn read_wav_mono(path: &std::path::Path) -> Result<(u32, Vec<f32>)> {
    let mut reader = WavReader::open(path).map_err(|e| OnsetError::Config {
        reason: format!("cannot open {}: {}", path.display(), e),
    })?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| OnsetError::Config {
                reason: format!("cannot decode {}: {}", path.display(), e),
            })?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| OnsetError::Config {
                    reason: format!("cannot decode {}: {}", path.display(), e),
                })?
        }
    };

    // Average interleaved channels down to mono.
    let mono: Vec<f32> = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();

    Ok((spec.sample_rate, mono))
}
