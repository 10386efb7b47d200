//! Mock backend for tests and dry runs.
//!
//! Returns completions from a fixed text, a scripted queue, or a responder closure, and
//! records every call so tests can assert how many backend calls a search issued.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmBackend, LlmError, LlmUsage};

type Responder = Box<dyn Fn(&str, usize, Option<&str>) -> Vec<String> + Send + Sync>;

enum Mode {
    Repeat(String),
    Script(Mutex<VecDeque<Vec<String>>>),
    Respond(Responder),
}

/// One recorded call to [`MockLlm::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCall {
    pub prompt: String,
    pub n: usize,
    pub stop: Option<String>,
}

/// Deterministic backend.
///
/// Usage counts whitespace-separated words as tokens so usage reporting can be exercised
/// without a real tokenizer.
pub struct MockLlm {
    mode: Mode,
    calls: Mutex<Vec<MockCall>>,
    usage: Mutex<LlmUsage>,
    /// 0-based call number that fails with [`LlmError::Api`].
    fail_on_call: Option<usize>,
}

impl MockLlm {
    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
            usage: Mutex::new(LlmUsage::default()),
            fail_on_call: None,
        }
    }

    /// Every call returns `n` copies of `text`.
    pub fn repeating(text: impl Into<String>) -> Self {
        Self::with_mode(Mode::Repeat(text.into()))
    }

    /// Each call returns the next scripted response as-is (ignoring `n`); an exhausted
    /// script fails the call.
    pub fn scripted<I, R, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        Self::with_mode(Mode::Script(Mutex::new(queue)))
    }

    /// Each call is answered by `f(prompt, n, stop)`.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str, usize, Option<&str>) -> Vec<String> + Send + Sync + 'static,
    {
        Self::with_mode(Mode::Respond(Box::new(f)))
    }

    /// Makes the `call`-th call (0-based) fail with [`LlmError::Api`].
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn respond(&self, prompt: &str, n: usize, stop: Option<&str>) -> Result<Vec<String>, LlmError> {
        match &self.mode {
            Mode::Repeat(text) => Ok(vec![text.clone(); n]),
            Mode::Script(queue) => queue
                .lock()
                .map_err(|_| LlmError::Api("mock script lock poisoned".to_string()))?
                .pop_front()
                .ok_or_else(|| LlmError::Api("mock script exhausted".to_string())),
            Mode::Respond(f) => Ok(f(prompt, n, stop)),
        }
    }
}

fn word_count(s: &str) -> u64 {
    s.split_whitespace().count() as u64
}

#[async_trait]
impl LlmBackend for MockLlm {
    async fn complete(
        &self,
        prompt: &str,
        n: usize,
        stop: Option<&str>,
    ) -> Result<Vec<String>, LlmError> {
        let call_index = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| LlmError::Api("mock call log lock poisoned".to_string()))?;
            calls.push(MockCall {
                prompt: prompt.to_string(),
                n,
                stop: stop.map(str::to_string),
            });
            calls.len() - 1
        };
        if self.fail_on_call == Some(call_index) {
            return Err(LlmError::Api(format!("mock failure on call {}", call_index)));
        }
        let outputs = self.respond(prompt, n, stop)?;
        if let Ok(mut usage) = self.usage.lock() {
            let completion: u64 = outputs.iter().map(|o| word_count(o)).sum();
            usage.add(word_count(prompt), completion);
        }
        Ok(outputs)
    }

    fn usage(&self) -> LlmUsage {
        self.usage.lock().map(|u| *u).unwrap_or_default()
    }
}
