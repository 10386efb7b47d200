//! Candidate generation: extend one candidate into several.

use async_trait::async_trait;
use tracing::debug;

use super::SearchError;
use crate::config::PromptMode;
use crate::llm::{LlmBackend, LlmError};
use crate::task::Task;

/// Produces new candidates from an existing one. New candidates always start with the
/// original candidate; the original is never modified.
#[async_trait]
pub trait Generator<T: Task>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(
        &self,
        task: &T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        y: &str,
        stop: Option<&str>,
    ) -> Result<Vec<String>, SearchError>;
}

/// Independent sampling: one call for `width` completions, each appended to the candidate.
#[derive(Clone, Copy, Debug)]
pub struct SampleGenerator {
    pub width: usize,
    pub prompt_mode: PromptMode,
}

impl SampleGenerator {
    pub fn new(width: usize, prompt_mode: PromptMode) -> Self {
        Self { width, prompt_mode }
    }
}

#[async_trait]
impl<T: Task> Generator<T> for SampleGenerator {
    fn name(&self) -> &'static str {
        "sample"
    }

    async fn generate(
        &self,
        task: &T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        y: &str,
        stop: Option<&str>,
    ) -> Result<Vec<String>, SearchError> {
        let prompt = match self.prompt_mode {
            PromptMode::Standard => task.standard_prompt_wrap(x, y),
            PromptMode::Cot => task.cot_prompt_wrap(x, y),
        };
        let samples = llm.complete(&prompt, self.width, stop).await?;
        debug!(width = self.width, returned = samples.len(), "sampled continuations");
        Ok(samples.into_iter().map(|s| format!("{}{}", y, s)).collect())
    }
}

/// Proposal: one completion, each non-empty line of it becomes a candidate (plus a newline).
/// Lines holding only whitespace are non-empty and are kept.
///
/// The number of candidates depends on the model output, not on any width setting.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProposeGenerator;

#[async_trait]
impl<T: Task> Generator<T> for ProposeGenerator {
    fn name(&self) -> &'static str {
        "propose"
    }

    async fn generate(
        &self,
        task: &T,
        llm: &dyn LlmBackend,
        x: &T::Input,
        y: &str,
        _stop: Option<&str>,
    ) -> Result<Vec<String>, SearchError> {
        let prompt = task.propose_prompt_wrap(x, y);
        let completion = llm
            .complete(&prompt, 1, None)
            .await?
            .into_iter()
            .next()
            .ok_or(LlmError::NoCompletions)?;
        let proposals: Vec<String> = completion
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(|line| format!("{}{}\n", y, line))
            .collect();
        debug!(proposals = proposals.len(), "proposed extensions");
        Ok(proposals)
    }
}
