//! OpenAI Chat Completions API driver.
//!
//! This module implements the [`LlmDriver`] trait for the OpenAI Chat Completions
//! API (`/v1/chat/completions`) as a single non-streaming round-trip.

use anyhow::{Context, anyhow};

use super::{CompletionRequest, LlmDriver, LlmSettings};

/// Driver for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("settings", &self.settings)
            .finish()
    }
}

impl ChatCompletionsDriver {
    /// Create a new Chat Completions driver with the given settings.
    ///
    /// The HTTP client carries the settings' request timeout.
    pub fn new(settings: LlmSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, settings })
    }

    fn request_body(&self, req: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "messages": req.messages,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
        })
    }
}

#[async_trait::async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let url = self.settings.provider.build_chat_url(&self.settings.base_url);
        let body = self.request_body(&req);

        tracing::debug!(
            url = %url,
            model = %self.settings.model,
            message_count = req.messages.len(),
            max_tokens = req.max_tokens,
            "Sending completion request"
        );

        let mut rb = self.http.post(&url).json(&body);
        if let Some(k) = &self.settings.api_key {
            rb = if self.settings.provider.uses_api_key_header() {
                rb.header("api-key", k)
            } else {
                rb.bearer_auth(k)
            };
        }

        let resp = rb.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "provider returned status {status}: {}",
                detail.chars().take(500).collect::<String>()
            ));
        }

        let v: serde_json::Value = resp
            .json()
            .await
            .context("provider reply was not valid JSON")?;
        message_content(&v)
    }
}

/// Pull `choices[0].message.content` out of a completion reply.
pub(crate) fn message_content(v: &serde_json::Value) -> anyhow::Result<String> {
    v["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("provider reply had no message content"))
}
