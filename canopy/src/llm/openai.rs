//! OpenAI Chat Completions backend implementing [`LlmBackend`].
//!
//! Sends the rendered prompt as a single user message and asks for `n` choices. The API caps
//! choices per request, so large `n` is split into batches of at most
//! [`MAX_CHOICES_PER_REQUEST`]; completions come back concatenated in request order.
//! Token usage reported by the API is accumulated and exposed through [`LlmBackend::usage`].
//!
//! Requires `OPENAI_API_KEY`; `OPENAI_BASE_URL` selects an OpenAI-compatible endpoint.

use std::sync::Mutex;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, trace};

use super::{LlmBackend, LlmError, LlmUsage};

/// Upper bound on `n` in one chat completion request.
pub const MAX_CHOICES_PER_REQUEST: usize = 20;

/// Default cap on completion tokens per choice.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// OpenAI-compatible chat completion backend.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    usage: Mutex<LlmUsage>,
}

impl ChatOpenAI {
    /// Builds a client with default config (API key from `OPENAI_API_KEY`).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    /// Builds a client from the environment: `OPENAI_API_KEY`, and `OPENAI_BASE_URL` or
    /// `OPENAI_API_BASE` when set.
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut config = OpenAIConfig::new();
        let base = std::env::var("OPENAI_BASE_URL").or_else(|_| std::env::var("OPENAI_API_BASE"));
        if let Ok(base) = base {
            config = config.with_api_base(base);
        }
        Self::with_config(config, model)
    }

    /// Builds a client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            usage: Mutex::new(LlmUsage::default()),
        }
    }

    /// Sets sampling temperature (0–2).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the completion-token cap per choice; `None` leaves it to the API default.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        &self,
        prompt: &str,
        n: usize,
        stop: Option<&str>,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let n = u8::try_from(n).map_err(|_| LlmError::Request(format!("n too large: {}", n)))?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessage::from(prompt),
        )]);
        args.n(n);
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        if let Some(max) = self.max_tokens {
            args.max_completion_tokens(max);
        }
        if let Some(s) = stop {
            args.stop(s);
        }
        args.build()
            .map_err(|e| LlmError::Request(format!("OpenAI request build failed: {}", e)))
    }
}

#[async_trait]
impl LlmBackend for ChatOpenAI {
    async fn complete(
        &self,
        prompt: &str,
        n: usize,
        stop: Option<&str>,
    ) -> Result<Vec<String>, LlmError> {
        let mut outputs = Vec::with_capacity(n);
        let mut remaining = n;
        while remaining > 0 {
            let batch = remaining.min(MAX_CHOICES_PER_REQUEST);
            remaining -= batch;
            let request = self.build_request(prompt, batch, stop)?;
            debug!(
                model = %self.model,
                n = batch,
                stop = ?stop,
                temperature = ?self.temperature,
                prompt_len = prompt.len(),
                "OpenAI chat create"
            );
            if let Ok(js) = serde_json::to_string_pretty(&request) {
                trace!(request = %js, "OpenAI request body");
            }

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| LlmError::Api(format!("OpenAI API error: {}", e)))?;

            if let Some(u) = &response.usage {
                if let Ok(mut usage) = self.usage.lock() {
                    usage.add(u64::from(u.prompt_tokens), u64::from(u.completion_tokens));
                }
            }
            outputs.extend(
                response
                    .choices
                    .into_iter()
                    .map(|c| c.message.content.unwrap_or_default()),
            );
        }
        Ok(outputs)
    }

    fn usage(&self) -> LlmUsage {
        self.usage.lock().map(|u| *u).unwrap_or_default()
    }
}
