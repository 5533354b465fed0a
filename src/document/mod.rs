//! Uploaded documents and plain-text extraction.
//!
//! This module turns a single uploaded file into trimmed plain text ready
//! for the extractor.
//!
//! # Processors
//!
//! - [`PdfProcessor`] - embedded page text via `lopdf`
//! - [`PlainTextProcessor`] - UTF-8 / Latin-1 / Windows-1252 decode chain
//!
//! [`DocumentProcessor`] dispatches by extension; [`validation::validate`]
//! runs before either.

mod pdf;
mod processor;
mod text;
pub mod validation;

pub use pdf::PdfProcessor;
pub use processor::{DocumentProcessor, TextSource};
pub use text::{PlainTextProcessor, TextEncoding};

/// A single uploaded file, held only until its text is extracted.
#[derive(Clone)]
pub struct UploadedDocument {
    /// Original file name.
    pub name: String,
    /// Lower-cased extension including the dot (e.g. `.pdf`), or empty.
    pub extension: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("name", &self.name)
            .field("extension", &self.extension)
            .field("byte_size", &self.bytes.len())
            .finish()
    }
}

impl UploadedDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let extension = extension_of(&name);
        Self {
            name,
            extension,
            bytes,
        }
    }

    /// Size of the upload in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type guessed from the file name.
    #[must_use]
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .to_string()
    }
}

/// Lower-cased extension of `name` including the leading dot.
///
/// Leading dots of hidden files (`.env`) do not count as an extension.
#[must_use]
pub fn extension_of(name: &str) -> String {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match file.rfind('.') {
        Some(idx) if idx > 0 => file[idx..].to_lowercase(),
        _ => String::new(),
    }
}
