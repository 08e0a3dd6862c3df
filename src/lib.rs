pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod signal_processing;
pub mod wav;

pub use config::PipelineConfig;
pub use error::{FirError, Result};
pub use pipeline::{GoldenPipeline, PipelineReport, PipelineRun};
pub use wav::save_wav;
