//! Candidate evaluation: one score per candidate, in input order.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, trace};

use super::{Score, SearchError};
use crate::llm::LlmBackend;
use crate::task::Task;

/// Scores a set of candidates for one input.
#[async_trait]
pub trait Evaluator<T: Task>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(
        &self,
        task: &mut T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        ys: &[String],
    ) -> Result<Vec<Score>, SearchError>;
}

/// Independent value query per candidate, backed by the task's value cache.
///
/// A candidate equal to an earlier one in the same call scores 0 and issues no query, so a
/// duplicated branch is counted once per step. This holds whether or not caching is enabled.
#[derive(Clone, Copy, Debug)]
pub struct ValueEvaluator {
    pub samples: usize,
    pub cache_value: bool,
}

impl ValueEvaluator {
    pub fn new(samples: usize, cache_value: bool) -> Self {
        Self {
            samples,
            cache_value,
        }
    }

    /// Score of one candidate: cache hit, or one backend call reduced by the task.
    async fn value<T: Task>(
        &self,
        task: &mut T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        y: &str,
    ) -> Result<Score, SearchError> {
        let prompt = task.value_prompt_wrap(x, y);
        if self.cache_value {
            if let Some(score) = task.value_cache().get(&prompt) {
                trace!(score, "value cache hit");
                return Ok(score);
            }
        }
        let outputs = llm.complete(&prompt, self.samples, None).await?;
        let score = task.value_outputs_unwrap(x, y, &outputs);
        if self.cache_value {
            task.value_cache().insert(prompt, score);
        }
        Ok(score)
    }
}

#[async_trait]
impl<T: Task> Evaluator<T> for ValueEvaluator {
    fn name(&self) -> &'static str {
        "value"
    }

    async fn evaluate(
        &self,
        task: &mut T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        ys: &[String],
    ) -> Result<Vec<Score>, SearchError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(ys.len());
        let mut scores = Vec::with_capacity(ys.len());
        for y in ys {
            if !seen.insert(y.as_str()) {
                scores.push(0.0);
                continue;
            }
            scores.push(self.value(task, llm, x, y).await?);
        }
        debug!(candidates = ys.len(), unique = seen.len(), "value evaluation done");
        Ok(scores)
    }
}

/// One comparative vote query over all candidates; the task spreads votes over positions.
#[derive(Clone, Copy, Debug)]
pub struct VoteEvaluator {
    pub samples: usize,
}

impl VoteEvaluator {
    pub fn new(samples: usize) -> Self {
        Self { samples }
    }
}

#[async_trait]
impl<T: Task> Evaluator<T> for VoteEvaluator {
    fn name(&self) -> &'static str {
        "vote"
    }

    async fn evaluate(
        &self,
        task: &mut T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        ys: &[String],
    ) -> Result<Vec<Score>, SearchError> {
        if ys.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = task.vote_prompt_wrap(x, ys);
        let outputs = llm.complete(&prompt, self.samples, None).await?;
        let scores = task.vote_outputs_unwrap(&outputs, ys.len());
        if scores.len() != ys.len() {
            return Err(SearchError::ScoreCountMismatch {
                expected: ys.len(),
                actual: scores.len(),
            });
        }
        debug!(candidates = ys.len(), votes = ?scores, "vote evaluation done");
        Ok(scores)
    }
}
