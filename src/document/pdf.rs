//! PDF text extraction using `lopdf`.
//!
//! Pages are read in page-number order. A page whose text cannot be
//! extracted, or that only holds whitespace (scanned images, blank pages),
//! contributes nothing to the output.

use lopdf::Document;

use crate::error::ExtractionError;

use super::processor::TextSource;

/// PDF processor for documents with an embedded text layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfProcessor;

impl PdfProcessor {
    /// Extract the text of every page, in order. `None` marks a page with
    /// no extractable text.
    pub fn page_texts(bytes: &[u8]) -> Result<Vec<Option<String>>, ExtractionError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| ExtractionError::PdfReadFailure(e.to_string()))?;

        let pages = doc.get_pages();
        tracing::debug!(page_count = pages.len(), "Loaded PDF");

        let texts = pages
            .keys()
            .map(|&page_number| match doc.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!(page = page_number, error = %e, "No text on page");
                    None
                }
            })
            .collect();

        Ok(texts)
    }
}

/// Join page texts with line breaks, skipping pages without text.
pub(crate) fn join_page_texts<I>(pages: I) -> Result<String, ExtractionError>
where
    I: IntoIterator<Item = Option<String>>,
{
    let joined = pages
        .into_iter()
        .flatten()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if joined.trim().is_empty() {
        return Err(ExtractionError::NoExtractableText);
    }
    Ok(joined)
}

impl TextSource for PdfProcessor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        join_page_texts(Self::page_texts(bytes)?)
    }

    fn supports_extension(&self, extension: &str) -> bool {
        extension.eq_ignore_ascii_case(".pdf")
    }

    fn processor_name(&self) -> &'static str {
        "Pdf"
    }
}
