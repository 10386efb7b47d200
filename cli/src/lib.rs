//! Library half of the `canopy` binary: argument parsing, config layering and JSON log output.

mod args;
mod output;

pub use args::{Args, CliError};
pub use output::{write_json_output, RunLog};
