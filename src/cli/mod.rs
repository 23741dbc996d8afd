pub mod args;
pub mod commands;

pub use args::{from_current_dir, Cli, Commands, PipelineArgs};
pub use commands::{load_combined, run, run_pipeline};
