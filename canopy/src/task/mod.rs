//! Task abstraction: problem inputs, prompt rendering and output parsing.
//!
//! The search core knows nothing about a concrete problem. A [`Task`] supplies the inputs,
//! renders the five prompt kinds, turns raw model outputs into scores, owns the
//! [`ValueCache`], and judges final outputs. [`TemplateTask`] is a data-driven implementation
//! loaded from YAML.

mod template;

pub use template::{TemplateInput, TemplatePrompts, TemplateTask, ValueRule, VoteRule};

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::ValueCache;
use crate::search::Score;

/// Errors raised by tasks (loading, indexing, validation).
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task index {index} out of range (task has {len} inputs)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("task has {steps} steps but only {stops} stop entries")]
    StopsTooShort { steps: usize, stops: usize },
    #[error("failed to read task file {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to parse task YAML: {0}")]
    Parse(String),
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("task has no `{0}` prompt template")]
    MissingTemplate(PromptKind),
}

/// The five prompt kinds a task renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromptKind {
    Standard,
    Cot,
    Propose,
    Value,
    Vote,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Standard => "standard",
            Self::Cot => "cot",
            Self::Propose => "propose",
            Self::Value => "value",
            Self::Vote => "vote",
        };
        f.write_str(s)
    }
}

/// Judgement of one final output; `r` is 1.0 for a correct answer in the built-in tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub r: f64,
}

/// A problem family the search can be run on.
///
/// Prompt wraps receive the input and the candidate (partial solution) and return the
/// rendered prompt; the unwraps reduce raw model outputs to scores.
pub trait Task: Send + Sync {
    type Input: Clone + fmt::Debug + Send + Sync;

    /// Number of inputs.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_input(&self, index: usize) -> Result<Self::Input, TaskError>;

    /// Number of search steps.
    fn steps(&self) -> usize;

    /// Per-step generation stop; must have at least [`steps`](Task::steps) entries.
    fn stops(&self) -> &[Option<String>];

    fn standard_prompt_wrap(&self, x: &Self::Input, y: &str) -> String;
    fn cot_prompt_wrap(&self, x: &Self::Input, y: &str) -> String;
    fn propose_prompt_wrap(&self, x: &Self::Input, y: &str) -> String;
    fn value_prompt_wrap(&self, x: &Self::Input, y: &str) -> String;
    fn vote_prompt_wrap(&self, x: &Self::Input, ys: &[String]) -> String;

    /// Reduces `samples-per-evaluation` value outputs for one candidate to one score.
    fn value_outputs_unwrap(&self, x: &Self::Input, y: &str, outputs: &[String]) -> Score;

    /// Distributes votes over `n_candidates` positions; one score per candidate.
    fn vote_outputs_unwrap(&self, outputs: &[String], n_candidates: usize) -> Vec<Score>;

    fn value_cache(&mut self) -> &mut ValueCache;

    /// Judges a final output for input `index`.
    fn test_output(&self, index: usize, output: &str) -> Result<TestOutcome, TaskError>;
}
