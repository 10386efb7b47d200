//! Tree-of-thoughts search: generate → evaluate → select, repeated for a fixed number of steps.
//!
//! Each stage is a small strategy object behind a trait ([`Generator`], [`Evaluator`],
//! [`Selector`]). [`Searcher::from_config`] picks the concrete strategies once from a
//! [`SearchConfig`](crate::SearchConfig); the loop itself never branches on strategy names.

mod evaluate;
mod generate;
mod select;
mod solve;
mod trace;

pub use evaluate::{Evaluator, ValueEvaluator, VoteEvaluator};
pub use generate::{Generator, ProposeGenerator, SampleGenerator};
pub use select::{GreedySelector, SampleSelector, Selector};
pub use solve::{naive_solve, SearchOutcome, Searcher, SolveError};
pub use trace::{StepRecord, Trace};

use thiserror::Error;

use crate::llm::LlmError;
use crate::task::TaskError;

/// Desirability of a candidate for a given input.
pub type Score = f64;

/// Errors raised inside one search step.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The backend failed; propagated as-is, never retried here.
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Task(#[from] TaskError),
    /// Sampling selection needs non-negative finite weights with a positive sum.
    #[error("cannot sample from weights {weights:?}: {reason}")]
    DegenerateWeights { weights: Vec<Score>, reason: String },
    #[error("score {score} at index {index} is not a finite number")]
    InvalidScore { index: usize, score: Score },
    #[error("expected {expected} scores, got {actual}")]
    ScoreCountMismatch { expected: usize, actual: usize },
    #[error("selector picked index {index} but only {len} candidates exist")]
    SelectionOutOfRange { index: usize, len: usize },
}
