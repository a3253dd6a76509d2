//! Onset decision with refractory suppression.
//!
//! Flags a chunk as an onset when its energy exceeds a sensitivity-scaled
//! share of the running reference, then suppresses re-triggering for a few
//! chunks so one sustained transient fires once.

/// Chunks suppressed after a positive decision (~70 ms at 44.1 kHz / 1024).
pub const REFRACTORY_CHUNKS: u32 = 3;

/// Per-chunk onset detector.
///
/// The effective threshold is `reference / sensitivity`: a larger
/// sensitivity lowers the threshold and produces more triggers. This is the
/// single externally tunable knob of the pipeline.
#[derive(Debug, Clone)]
pub struct OnsetDetector {
    sensitivity: f32,
    refractory_remaining: u32,
    last_decision: bool,
}

impl OnsetDetector {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            refractory_remaining: 0,
            last_decision: false,
        }
    }

    /// Decide whether this chunk carries an onset.
    ///
    /// `reference` must be the running reference established by earlier
    /// chunks (strictly positive). While the refractory counter is nonzero
    /// it is decremented and the decision is forced false regardless of
    /// energy.
    pub fn decide(&mut self, energy: f32, reference: f32) -> bool {
        if self.refractory_remaining > 0 {
            self.refractory_remaining -= 1;
            self.last_decision = false;
            return false;
        }

        let threshold = reference / self.sensitivity;
        let detected = energy > threshold;
        if detected {
            self.refractory_remaining = REFRACTORY_CHUNKS;
        }
        self.last_decision = detected;
        detected
    }

    /// The decision made for the most recent chunk.
    pub fn last_decision(&self) -> bool {
        self.last_decision
    }
}
