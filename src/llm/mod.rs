//! LLM driver trait and the chat-completions implementation.
//!
//! The extraction pipeline talks to the model through [`LlmDriver`], which
//! takes a fully built [`CompletionRequest`] and returns the assistant's
//! reply text. Production code uses [`ChatCompletionsDriver`]; tests swap in
//! an in-process driver.
//!
//! # Example
//!
//! ```rust,ignore
//! use documind::llm::{ChatCompletionsDriver, CompletionRequest, LlmDriver, Message};
//!
//! let driver = ChatCompletionsDriver::new(settings)?;
//! let reply = driver
//!     .complete(CompletionRequest {
//!         messages: vec![Message::system("Be terse."), Message::user("Hi")],
//!         temperature: 0.3,
//!         max_tokens: 1000,
//!     })
//!     .await?;
//! ```

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use provider::Provider;

use std::time::Duration;

use crate::error::ExtractionError;

/// Model used when no model is configured.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// LLM connection and model settings.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// API key; required before any completion request is made.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-3.5-turbo`).
    pub model: String,
    /// Provider type (auto-detected from `base_url`).
    pub provider: Provider,
    /// Client-side timeout for a single completion request.
    pub request_timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl LlmSettings {
    /// Check that credentials are present.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        match &self.api_key {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(ExtractionError::Configuration(
                "OPENAI_API_KEY not found. Please set it in your environment or .env file."
                    .to_string(),
            )),
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// A message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A single non-streaming completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation messages, system prompt first.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token budget.
    pub max_tokens: u32,
}

/// Trait for LLM completion drivers.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync + std::fmt::Debug {
    /// Send one completion request and return the assistant's reply text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the provider answers with a
    /// non-success status, or the reply has no message content.
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String>;
}
