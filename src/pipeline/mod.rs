//! Pipeline configuration, results, and the controller that ties the DSP
//! stages together.

pub mod config;
pub mod controller;
pub mod result;

pub use config::PipelineConfig;
pub use controller::{Pipeline, PipelineState};
pub use result::ChunkResult;
