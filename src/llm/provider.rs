//! Provider-specific configuration and detection.
//!
//! This module handles differences between LLM API providers, including
//! URL patterns and authentication headers.

/// Supported LLM providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// `OpenAI` (api.openai.com)
    OpenAI,
    /// Azure `OpenAI` Service
    AzureOpenAI {
        /// Deployment name (required for Azure)
        deployment_name: String,
        /// API version (e.g., "2024-08-01-preview")
        api_version: String,
    },
    /// `OpenRouter` (openrouter.ai)
    OpenRouter,
    /// Together AI (together.ai, together.xyz)
    TogetherAI,
    /// Groq (groq.com)
    Groq,
    /// Generic OpenAI-compatible provider
    Generic,
}

impl Provider {
    /// Detect provider from base URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use documind::llm::Provider;
    ///
    /// let provider = Provider::detect_from_url("https://api.openai.com");
    /// assert_eq!(provider, Provider::OpenAI);
    /// ```
    #[must_use]
    pub fn detect_from_url(base_url: &str) -> Self {
        let lower = base_url.to_lowercase();

        if lower.contains("azure.com") {
            Self::AzureOpenAI {
                deployment_name: String::new(),
                api_version: "2024-08-01-preview".to_string(),
            }
        } else if lower.contains("openrouter.ai") {
            Self::OpenRouter
        } else if lower.contains("together.ai") || lower.contains("together.xyz") {
            Self::TogetherAI
        } else if lower.contains("groq.com") {
            Self::Groq
        } else if lower.contains("openai.com") {
            Self::OpenAI
        } else {
            Self::Generic
        }
    }

    /// Build the chat completions URL for this provider.
    ///
    /// Azure routes by deployment name rather than by the model field.
    #[must_use]
    pub fn build_chat_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');

        match self {
            Self::AzureOpenAI {
                deployment_name,
                api_version,
            } => {
                format!(
                    "{base}/openai/deployments/{deployment_name}/chat/completions?api-version={api_version}"
                )
            }
            _ if base.ends_with("/v1") => format!("{base}/chat/completions"),
            _ => format!("{base}/v1/chat/completions"),
        }
    }

    /// Whether the key goes in an `api-key` header instead of bearer auth.
    #[must_use]
    pub fn uses_api_key_header(&self) -> bool {
        matches!(self, Self::AzureOpenAI { .. })
    }
}
