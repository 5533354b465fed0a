//! Structured extraction: modes, prompt schemas, the extractor and reply parsing.
//!
//! # Modules
//!
//! - [`mode`]: the closed [`ExtractionMode`] set
//! - [`schema`]: static prompt/field table shared by reference
//! - [`extractor`]: [`DocumentExtractor`], one completion call per document
//! - [`response`]: fence stripping and strict JSON parsing

pub mod extractor;
pub mod mode;
pub mod response;
pub mod schema;

pub use extractor::DocumentExtractor;
pub use mode::ExtractionMode;
pub use response::{ExtractionResult, parse_response, strip_code_fence};
pub use schema::{ExtractionSchema, SchemaTable};
