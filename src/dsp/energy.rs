//! Short-time energy tracking.
//!
//! Reduces a filtered chunk to one scalar energy value and maintains a
//! decaying-maximum reference so later chunks can be compared on a stable
//! relative scale. Normalization against the reference belongs to the onset
//! detector; this module only produces the raw numbers.

/// Per-chunk decay applied to the running reference. At ~43 chunks/s
/// (44.1 kHz / 1024) this forgets a peak over a few seconds.
const REFERENCE_DECAY: f32 = 0.995;

/// Lower bound for the reference so downstream division is always safe.
const REFERENCE_FLOOR: f32 = 1e-10;

/// Tracks short-time energy across chunks.
#[derive(Debug, Clone)]
pub struct EnergyTracker {
    reference: f32,
}

impl EnergyTracker {
    pub fn new() -> Self {
        Self {
            reference: REFERENCE_FLOOR,
        }
    }

    /// The running reference as established by all chunks seen so far.
    /// Never below the floor, never zero.
    pub fn reference(&self) -> f32 {
        self.reference
    }

    /// Compute the mean-square energy of a filtered chunk and fold it into
    /// the running reference. Returns the raw (non-normalized) energy.
    pub fn update(&mut self, filtered: &[f32]) -> f32 {
        let energy = if filtered.is_empty() {
            0.0
        } else {
            filtered.iter().map(|s| s * s).sum::<f32>() / filtered.len() as f32
        };

        self.reference = (self.reference * REFERENCE_DECAY)
            .max(energy)
            .max(REFERENCE_FLOOR);

        energy
    }
}

impl Default for EnergyTracker {
    fn default() -> Self {
        Self::new()
    }
}
