//! onsetd - Streaming Time-Domain Onset Detection
//!
//! Ingests fixed-size audio chunks, band-pass filters them, tracks
//! short-time energy, and decides per chunk whether a transient (onset)
//! occurred, with a tempo estimate derived from the detected onsets.
//!
//! # Architecture
//!
//! - `dsp` — the stateful stages: band-pass filter, energy tracker, onset
//!   detector, tempo estimator.
//! - `pipeline` — configuration, per-chunk results, and the controller that
//!   sequences the stages. The controller is a pure state machine,
//!   independent of any transport.
//! - `server` — line-delimited JSON adapter over `BufRead`/`Write`; the
//!   `onsetd` binary attaches it to stdin/stdout.
//! - `trace` — best-effort append-only binary recording of every
//!   intermediate signal for offline inspection.

pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod trace;

pub use error::{OnsetError, Result};
pub use pipeline::{ChunkResult, Pipeline, PipelineConfig, PipelineState};
