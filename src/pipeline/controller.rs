//! Pipeline controller.
//!
//! Owns all DSP stages and their persistent state, sequences one chunk at a
//! time through filter -> energy -> onset -> tempo, and taps every stage
//! into the trace recorder. One controller instance equals one independent
//! stream; there is no mid-run reset.

use crate::dsp::{BandPassFilter, EnergyTracker, OnsetDetector, TempoEstimator};
use crate::error::{OnsetError, Result};
use crate::pipeline::{ChunkResult, PipelineConfig};
use crate::trace::{TraceRecorder, TraceStream};
use log::{debug, info};
use std::path::Path;

/// Controller lifecycle. Construction is the implicit first state; a
/// successful `Pipeline::new` lands in `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Awaiting the next chunk request.
    Ready,
    /// A chunk is being processed. Never observable across a call boundary;
    /// processing is synchronous and non-overlapping.
    Processing,
    /// Stop directive accepted, traces being flushed.
    ShuttingDown,
    /// Final state; further requests are rejected.
    Terminated,
}

/// The streaming onset detection pipeline.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    filter: BandPassFilter,
    energy: EnergyTracker,
    detector: OnsetDetector,
    tempo: TempoEstimator,
    trace: Option<TraceRecorder>,
    chunk_index: u64,
    state: PipelineState,
}

impl Pipeline {
    /// Validate the config and build all stages. Filter coefficients are
    /// computed here, once; all persistent state starts zeroed.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let filter = BandPassFilter::new(
            config.low_cutoff_hz,
            config.high_cutoff_hz,
            config.sample_rate_hz,
        )?;

        info!(
            "pipeline ready: {} Hz, {} samples/chunk, band {}-{} Hz, sensitivity {}",
            config.sample_rate_hz,
            config.chunk_size,
            config.low_cutoff_hz,
            config.high_cutoff_hz,
            config.sensitivity
        );

        Ok(Self {
            filter,
            energy: EnergyTracker::new(),
            detector: OnsetDetector::new(config.sensitivity),
            tempo: TempoEstimator::new(config.sample_rate_hz, config.chunk_size),
            trace: None,
            chunk_index: 0,
            state: PipelineState::Ready,
            config,
        })
    }

    /// Enable trace recording into `dir`. Opening the stores is a hard
    /// error; only failures during recording are swallowed.
    pub fn enable_tracing(&mut self, dir: &Path) -> Result<()> {
        self.trace = Some(TraceRecorder::create(dir)?);
        info!("trace recording enabled in {}", dir.display());
        Ok(())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run one chunk through all stages and emit its result.
    ///
    /// Wrong-length or non-finite input is a recoverable request error: the
    /// pipeline stays ready, no state advances, and the chunk index is not
    /// consumed.
    pub fn process_chunk(&mut self, samples: &[f32]) -> Result<ChunkResult> {
        match self.state {
            PipelineState::Ready => {}
            _ => return Err(OnsetError::Terminated),
        }

        if samples.len() != self.config.chunk_size {
            return Err(OnsetError::Request {
                reason: format!(
                    "expected {} samples, got {}",
                    self.config.chunk_size,
                    samples.len()
                ),
            });
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(OnsetError::Request {
                reason: format!("non-finite sample at position {}", pos),
            });
        }

        self.state = PipelineState::Processing;

        let filtered = self.filter.process_chunk(samples);

        // The decision compares against the reference established by earlier
        // chunks, so a fresh transient can exceed its own contribution.
        let reference = self.energy.reference();
        let energy = self.energy.update(&filtered);
        let onset_detected = self.detector.decide(energy, reference);
        let bpm = self.tempo.record(self.chunk_index, onset_detected);

        if let Some(trace) = &mut self.trace {
            trace.append_samples(TraceStream::Raw, samples);
            trace.append_samples(TraceStream::Filtered, &filtered);
            trace.append_value(TraceStream::Energy, energy);
            trace.append_value(TraceStream::Onset, if onset_detected { 1.0 } else { 0.0 });
            trace.flush();
        }

        let result = ChunkResult {
            chunk_index: self.chunk_index,
            energy,
            onset_detected,
            bpm,
        };

        debug!(
            "chunk {}: energy {:.6e}, reference {:.6e}, onset {}",
            result.chunk_index, energy, reference, onset_detected
        );

        self.chunk_index += 1;
        self.state = PipelineState::Ready;

        Ok(result)
    }

    /// Cooperative shutdown: flush open trace stores and refuse further
    /// chunks. Only honored between processing calls, never preempting one.
    pub fn shutdown(&mut self) {
        if self.state == PipelineState::Terminated {
            return;
        }
        self.state = PipelineState::ShuttingDown;
        if let Some(trace) = &mut self.trace {
            trace.flush();
        }
        self.state = PipelineState::Terminated;
        info!("pipeline terminated after {} chunks", self.chunk_index);
    }
}
