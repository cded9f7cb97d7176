//! IO module - configuration and result files for VMC runs.

mod config;
mod output;

pub use config::{read_config, FileConfig, RunConfig};
pub use output::write_results;
