pub mod config;
pub mod pipeline;

pub use config::{PipelineConfig, config_with_prefix};
pub use pipeline::{PipelineError, run, run_to_artifact};
