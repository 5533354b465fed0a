//! LLM-backed structured extraction.

use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::error::ExtractionError;
use crate::llm::{CompletionRequest, LlmDriver, LlmSettings, Message};

use super::mode::ExtractionMode;
use super::response::{ExtractionResult, parse_response};
use super::schema::SchemaTable;

/// Turns document text into structured fields with one completion call.
///
/// Holds only immutable state: provider settings, the shared schema table,
/// sampling parameters and the driver. Safe to share across requests.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    settings: LlmSettings,
    schemas: Arc<SchemaTable>,
    params: ExtractionConfig,
    driver: Arc<dyn LlmDriver>,
}

impl DocumentExtractor {
    pub fn new(
        settings: LlmSettings,
        schemas: Arc<SchemaTable>,
        params: ExtractionConfig,
        driver: Arc<dyn LlmDriver>,
    ) -> Self {
        Self {
            settings,
            schemas,
            params,
            driver,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    /// Extract structured data for a mode given by key or label.
    pub async fn extract_by_key(
        &self,
        text: &str,
        mode: &str,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mode: ExtractionMode = mode.parse()?;
        self.extract(text, mode).await
    }

    /// Extract structured data from `text` using the schema for `mode`.
    ///
    /// Credentials and document length are checked before any network call.
    /// The reply is fence-stripped and parsed, but not checked against the
    /// schema's expected fields.
    pub async fn extract(
        &self,
        text: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionResult, ExtractionError> {
        self.settings.validate()?;

        let schema = self
            .schemas
            .get(mode)
            .ok_or_else(|| ExtractionError::InvalidMode(mode.key().to_string()))?;

        let chars = text.chars().count();
        if chars > self.params.max_document_chars {
            return Err(ExtractionError::DocumentTooLong {
                chars,
                limit: self.params.max_document_chars,
            });
        }

        let request = CompletionRequest {
            messages: vec![
                Message::system(schema.system_prompt),
                Message::user(schema.render_user_prompt(text)),
            ],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
        };

        tracing::info!(
            name: "extraction.request",
            mode = mode.key(),
            model = %self.settings.model,
            text_chars = chars,
            "Requesting structured extraction"
        );

        let raw = self.driver.complete(request).await.map_err(|e| {
            tracing::error!(mode = mode.key(), error = %e, "Completion request failed");
            ExtractionError::Provider(format!("{e:#}"))
        })?;

        let result = parse_response(&raw).inspect_err(|e| {
            tracing::warn!(
                mode = mode.key(),
                error = %e,
                raw_length = raw.len(),
                "Model reply was not a JSON object"
            );
        })?;

        tracing::info!(
            name: "extraction.complete",
            mode = mode.key(),
            field_count = result.len(),
            "Extraction complete"
        );

        Ok(result)
    }
}
