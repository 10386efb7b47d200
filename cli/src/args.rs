//! Command-line arguments and how they layer over the `[search]` config section.

use std::ops::Range;
use std::path::PathBuf;

use canopy::{EvaluateMethod, GenerateMethod, PromptMode, SearchConfig, SelectMethod};
use clap::Parser;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("task index range {start}..{end} is not within 0..{len}")]
    IndexRange { start: usize, end: usize, len: usize },
    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialize run log: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every search flag is optional so that an unset flag leaves the config file (or the built-in
/// default) in place.
#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "Canopy: tree-of-thoughts search over a YAML task")]
pub struct Args {
    /// Task definition (YAML)
    #[arg(long, value_name = "PATH")]
    pub task: PathBuf,

    /// Model name passed to the backend (e.g. gpt-4, gpt-4o)
    #[arg(long, value_name = "MODEL")]
    pub backend: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// First task index to run
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub task_start_index: usize,

    /// One past the last task index to run (default: all inputs)
    #[arg(long, value_name = "N")]
    pub task_end_index: Option<usize>,

    /// Sample directly from the empty candidate instead of searching
    #[arg(long)]
    pub naive_run: bool,

    /// Generation prompt for sampling: standard or cot
    #[arg(long, value_name = "MODE")]
    pub prompt_sample: Option<PromptMode>,

    /// sample or propose
    #[arg(long, value_name = "METHOD")]
    pub method_generate: Option<GenerateMethod>,

    /// value or vote
    #[arg(long, value_name = "METHOD")]
    pub method_evaluate: Option<EvaluateMethod>,

    /// sample or greedy
    #[arg(long, value_name = "METHOD")]
    pub method_select: Option<SelectMethod>,

    #[arg(long, value_name = "N")]
    pub n_generate_sample: Option<usize>,

    #[arg(long, value_name = "N")]
    pub n_evaluate_sample: Option<usize>,

    #[arg(long, value_name = "N")]
    pub n_select_sample: Option<usize>,

    /// Do not reuse value scores across calls
    #[arg(long)]
    pub no_cache: bool,

    /// Seed for sampling selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log each step's ranked expansions and choices
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file (default: $XDG_CONFIG_HOME/canopy/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to DIR/canopy.log instead of stderr
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write the per-index JSON log to this file (rewritten after each index)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Pretty-print the JSON log
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// Applies the flags that were given on top of `base`.
    pub fn search_config(&self, base: SearchConfig) -> SearchConfig {
        let mut c = base;
        if let Some(b) = &self.backend {
            c.backend = b.clone();
        }
        if let Some(t) = self.temperature {
            c.temperature = t;
        }
        if let Some(m) = self.prompt_sample {
            c.prompt_sample = m;
        }
        if let Some(m) = self.method_generate {
            c.method_generate = m;
        }
        if let Some(m) = self.method_evaluate {
            c.method_evaluate = m;
        }
        if let Some(m) = self.method_select {
            c.method_select = m;
        }
        if let Some(n) = self.n_generate_sample {
            c.n_generate_sample = n;
        }
        if let Some(n) = self.n_evaluate_sample {
            c.n_evaluate_sample = n;
        }
        if let Some(n) = self.n_select_sample {
            c.n_select_sample = n;
        }
        if self.no_cache {
            c.cache_value = false;
        }
        if self.seed.is_some() {
            c.seed = self.seed;
        }
        if self.verbose {
            c.verbose = true;
        }
        c
    }

    /// `[start, end)` checked against a task with `len` inputs.
    pub fn index_range(&self, len: usize) -> Result<Range<usize>, CliError> {
        let start = self.task_start_index;
        let end = self.task_end_index.unwrap_or(len);
        if start > end || end > len {
            return Err(CliError::IndexRange { start, end, len });
        }
        Ok(start..end)
    }
}
