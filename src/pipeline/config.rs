//! Pipeline configuration.

use crate::error::{OnsetError, Result};
use serde::{Deserialize, Serialize};

/// Immutable pipeline parameters, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Sample rate in Hz.
    pub sample_rate_hz: u32,
    /// Samples per chunk.
    pub chunk_size: usize,
    /// Band-pass low cutoff in Hz.
    pub low_cutoff_hz: f32,
    /// Band-pass high cutoff in Hz.
    pub high_cutoff_hz: f32,
    /// Onset threshold scale: larger values lower the effective threshold
    /// and produce more triggers.
    pub sensitivity: f32,
}

impl PipelineConfig {
    /// Check all invariants: positive sample rate, chunk size and
    /// sensitivity, and `0 < low < high < sample_rate / 2`.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate_hz == 0 {
            return Err(OnsetError::Config {
                reason: "sample rate must be positive".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(OnsetError::Config {
                reason: "chunk size must be positive".to_string(),
            });
        }
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(OnsetError::Config {
                reason: format!("sensitivity must be positive, got {}", self.sensitivity),
            });
        }

        let nyquist = self.sample_rate_hz as f32 / 2.0;
        if !(self.low_cutoff_hz > 0.0
            && self.low_cutoff_hz < self.high_cutoff_hz
            && self.high_cutoff_hz < nyquist)
        {
            return Err(OnsetError::Config {
                reason: format!(
                    "cutoffs must satisfy 0 < low < high < {} Hz, got low={} Hz, high={} Hz",
                    nyquist, self.low_cutoff_hz, self.high_cutoff_hz
                ),
            });
        }

        Ok(())
    }

    /// Duration of one chunk in seconds.
    pub fn chunk_duration_secs(&self) -> f32 {
        self.chunk_size as f32 / self.sample_rate_hz as f32
    }
}
