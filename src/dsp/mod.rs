//! DSP stages of the onset detection pipeline.
//!
//! Chunk flow: raw samples -> band-pass filter -> energy tracker -> onset
//! detector, with the tempo estimator fed by the resulting decisions. Each
//! stage owns its own persistent state; the pipeline controller sequences
//! them.

pub mod bandpass;
pub mod energy;
pub mod onset;
pub mod tempo;

pub use bandpass::BandPassFilter;
pub use energy::EnergyTracker;
pub use onset::{OnsetDetector, REFRACTORY_CHUNKS};
pub use tempo::TempoEstimator;
