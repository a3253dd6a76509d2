//! Per-chunk pipeline output.

use serde::{Deserialize, Serialize};

/// The result of processing one chunk. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkResult {
    /// Monotonic chunk counter, starting at 0. Rejected requests do not
    /// consume an index.
    pub chunk_index: u64,
    /// Raw (non-normalized) mean-square energy of the filtered chunk.
    pub energy: f32,
    /// Whether this chunk carried an onset.
    pub onset_detected: bool,
    /// Current tempo estimate, once enough onsets have accumulated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f32>,
}
