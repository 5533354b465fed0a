//! Extension-based dispatch from an upload to plain text.

use std::sync::Arc;

use crate::error::ExtractionError;

use super::{PdfProcessor, PlainTextProcessor, UploadedDocument};

/// A source of plain text for one family of file types.
pub trait TextSource: Send + Sync + std::fmt::Debug {
    /// Extract trimmed plain text from raw file bytes.
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Whether this source handles `extension` (with leading dot).
    fn supports_extension(&self, extension: &str) -> bool;

    /// Name for logging.
    fn processor_name(&self) -> &'static str;
}

/// Picks the text source for an upload and runs it.
#[derive(Debug, Clone)]
pub struct DocumentProcessor {
    sources: Vec<Arc<dyn TextSource>>,
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor {
    /// Processor with the PDF and plain-text sources.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sources(vec![Arc::new(PdfProcessor), Arc::new(PlainTextProcessor)])
    }

    /// Processor with a custom set of sources, tried in order.
    #[must_use]
    pub fn with_sources(sources: Vec<Arc<dyn TextSource>>) -> Self {
        Self { sources }
    }

    /// Extract trimmed text from `document`.
    ///
    /// Runs on the blocking pool since PDF parsing is CPU-bound.
    pub async fn extract_text(&self, document: UploadedDocument) -> Result<String, ExtractionError> {
        let source = self.source_for(&document.extension)?;
        let name = document.name.clone();
        let processor = source.processor_name();

        tracing::info!(
            name: "document.extract.start",
            file = %name,
            processor,
            byte_size = document.byte_size(),
            "Extracting document text"
        );

        let text = tokio::task::spawn_blocking(move || source.extract(&document.bytes))
            .await
            .map_err(|e| ExtractionError::ExtractionTask {
                processor,
                reason: e.to_string(),
            })??;

        tracing::info!(
            name: "document.extract.done",
            file = %name,
            chars = text.chars().count(),
            "Document text extracted"
        );

        Ok(text)
    }

    fn source_for(&self, extension: &str) -> Result<Arc<dyn TextSource>, ExtractionError> {
        self.sources
            .iter()
            .find(|s| s.supports_extension(extension))
            .map(Arc::clone)
            .ok_or_else(|| ExtractionError::UnsupportedType {
                extension: extension.to_string(),
                allowed: ".pdf, .txt".to_string(),
            })
    }
}
