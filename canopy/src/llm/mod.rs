//! Model backend abstraction used by the search loop.
//!
//! The core only needs one operation from a model: given a rendered prompt, return `n`
//! independent completions, each optionally cut at a stop string. This module defines that
//! trait ([`LlmBackend`]), token accounting ([`LlmUsage`]), a deterministic mock
//! ([`MockLlm`]) and an OpenAI-compatible chat backend ([`ChatOpenAI`]).
//!
//! Backends are passed explicitly to [`Searcher::solve`](crate::Searcher::solve) and
//! [`naive_solve`](crate::naive_solve); there is no process-wide model binding.

mod mock;
mod openai;

pub use mock::{MockCall, MockLlm};
pub use openai::ChatOpenAI;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a model backend. The search core never retries these.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request could not be built (bad parameters for this backend).
    #[error("request build failed: {0}")]
    Request(String),
    /// The backend call itself failed (network, rate limit, server error).
    #[error("backend call failed: {0}")]
    Api(String),
    /// A call that must yield at least one completion yielded none.
    #[error("backend returned no completions")]
    NoCompletions,
}

/// Cumulative token usage of a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Tokens sent in prompts.
    pub prompt_tokens: u64,
    /// Tokens produced in completions.
    pub completion_tokens: u64,
}

/// USD per 1k tokens: (model, prompt, completion).
const PRICES_PER_1K: &[(&str, f64, f64)] = &[
    ("gpt-4", 0.03, 0.06),
    ("gpt-3.5-turbo", 0.0015, 0.002),
    ("gpt-4o", 0.0025, 0.01),
];

impl LlmUsage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Adds one call's token counts.
    pub fn add(&mut self, prompt_tokens: u64, completion_tokens: u64) {
        self.prompt_tokens += prompt_tokens;
        self.completion_tokens += completion_tokens;
    }

    /// Estimated cost in USD for `model`, or `None` when the model has no known price.
    pub fn cost(&self, model: &str) -> Option<f64> {
        PRICES_PER_1K
            .iter()
            .find(|(name, _, _)| *name == model)
            .map(|(_, prompt, completion)| {
                self.prompt_tokens as f64 / 1000.0 * prompt
                    + self.completion_tokens as f64 / 1000.0 * completion
            })
    }
}

/// Model backend: one completion operation.
///
/// `complete` returns `n` completions for `prompt` (fewer only if the backend itself
/// returned fewer). Each completion is cut at `stop` when given.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        n: usize,
        stop: Option<&str>,
    ) -> Result<Vec<String>, LlmError>;

    /// Token usage accumulated since this backend was created.
    fn usage(&self) -> LlmUsage {
        LlmUsage::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubLlm {
        content: String,
    }

    #[async_trait]
    impl LlmBackend for StubLlm {
        async fn complete(
            &self,
            _prompt: &str,
            n: usize,
            _stop: Option<&str>,
        ) -> Result<Vec<String>, LlmError> {
            Ok(vec![self.content.clone(); n])
        }
    }

    #[tokio::test]
    async fn default_usage_is_zero() {
        let llm = StubLlm {
            content: "x".to_string(),
        };
        let out = llm.complete("p", 3, None).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(llm.usage(), LlmUsage::default());
    }

    #[test]
    fn cost_uses_price_table() {
        let usage = LlmUsage {
            prompt_tokens: 1000,
            completion_tokens: 2000,
        };
        let cost = usage.cost("gpt-4").unwrap();
        assert!((cost - 0.15).abs() < 1e-9);
        assert_eq!(usage.total_tokens(), 3000);
    }

    #[test]
    fn cost_unknown_model_is_none() {
        let usage = LlmUsage {
            prompt_tokens: 10,
            completion_tokens: 10,
        };
        assert!(usage.cost("some-local-model").is_none());
    }

    #[test]
    fn add_accumulates() {
        let mut usage = LlmUsage::default();
        usage.add(3, 4);
        usage.add(1, 1);
        assert_eq!(usage.prompt_tokens, 4);
        assert_eq!(usage.completion_tokens, 5);
    }
}
