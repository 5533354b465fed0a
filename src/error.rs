//! Error taxonomy for the analysis pipeline.
//!
//! Every stage (validation, text extraction, model call, reply parsing)
//! reports failures through [`ExtractionError`]. Each variant carries a
//! stable machine-readable code and maps onto an HTTP status for the
//! dashboard API.

use axum::http::StatusCode;

/// Errors that can occur while validating, reading or analysing a document.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// No file was supplied with the request.
    #[error("No file uploaded")]
    MissingFile,

    /// The file extension is not in the allow-list.
    #[error("Invalid file type '{extension}'. Allowed types: {allowed}")]
    UnsupportedType {
        /// The rejected extension (lower-cased, may be empty).
        extension: String,
        /// Comma-separated allow-list.
        allowed: String,
    },

    /// The file exceeds the configured size ceiling.
    #[error("File too large. Maximum size: {max_mb}MB")]
    TooLarge {
        /// Configured ceiling in megabytes.
        max_mb: u64,
    },

    /// The PDF could not be parsed at all.
    #[error("Failed to read PDF: {0}")]
    PdfReadFailure(String),

    /// The document parsed, but no page carried embedded text.
    #[error("No text could be extracted from the document (it may be scanned or image-only)")]
    NoExtractableText,

    /// None of the candidate encodings could decode the text file.
    #[error("Could not decode text file with supported encodings ({0})")]
    UndecodableText(String),

    /// Provider credentials or settings are missing.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested extraction mode does not exist.
    #[error("Invalid extraction type: {0}")]
    InvalidMode(String),

    /// The document text is too long to send in a single request.
    #[error("Document too long for a single request ({chars} characters, limit {limit})")]
    DocumentTooLong {
        /// Character count of the extracted text.
        chars: usize,
        /// Configured character limit.
        limit: usize,
    },

    /// The blocking text-extraction task panicked or was cancelled.
    #[error("{processor} text extraction failed: {reason}")]
    ExtractionTask {
        /// Processor that was running, e.g. `Pdf` or `PlainText`.
        processor: &'static str,
        /// Join error from the blocking pool.
        reason: String,
    },

    /// The completion request failed (transport error or non-success status).
    #[error("Extraction failed: {0}")]
    Provider(String),

    /// The model reply could not be parsed as a JSON object.
    #[error("Failed to parse AI response as JSON: {reason}")]
    MalformedResponse {
        /// Parser error or structural problem.
        reason: String,
        /// The reply exactly as the provider returned it.
        raw: String,
    },
}

impl ExtractionError {
    /// Stable error code used in API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFile => "MISSING_FILE",
            Self::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            Self::TooLarge { .. } => "TOO_LARGE",
            Self::PdfReadFailure(_) => "PDF_READ_FAILURE",
            Self::NoExtractableText => "NO_EXTRACTABLE_TEXT",
            Self::UndecodableText(_) => "UNDECODABLE_TEXT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidMode(_) => "INVALID_MODE",
            Self::DocumentTooLong { .. } => "DOCUMENT_TOO_LONG",
            Self::ExtractionTask { .. } => "EXTRACTION_TASK_FAILED",
            Self::Provider(_) => "PROVIDER_ERROR",
            Self::MalformedResponse { .. } => "MALFORMED_RESPONSE",
        }
    }

    /// HTTP status the dashboard API reports for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile | Self::InvalidMode(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::TooLarge { .. } | Self::DocumentTooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::PdfReadFailure(_) | Self::NoExtractableText | Self::UndecodableText(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Configuration(_) | Self::ExtractionTask { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Provider(_) | Self::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Raw provider reply, when the error carries one.
    #[must_use]
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Whether the user can recover by re-uploading or retrying.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_) | Self::InvalidMode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_limit() {
        let err = ExtractionError::TooLarge { max_mb: 10 };
        assert_eq!(err.to_string(), "File too large. Maximum size: 10MB");

        let err = ExtractionError::UnsupportedType {
            extension: ".exe".to_string(),
            allowed: ".pdf, .txt".to_string(),
        };
        assert!(err.to_string().contains(".pdf, .txt"));
    }

    #[test]
    fn test_malformed_response_keeps_raw() {
        let err = ExtractionError::MalformedResponse {
            reason: "expected value".to_string(),
            raw: "not json".to_string(),
        };
        assert_eq!(err.raw_response(), Some("not json"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_configuration_is_fatal() {
        let err = ExtractionError::Configuration("missing key".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }
}
