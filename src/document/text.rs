//! Plain-text decoding with an ordered encoding fallback.
//!
//! The first encoding that decodes without error and yields non-blank
//! content wins. Encoding order takes precedence over content quality: bytes
//! that are valid UTF-8 are never re-read as Latin-1, even when the UTF-8
//! reading looks garbled.

use crate::error::ExtractionError;

use super::processor::TextSource;

/// Candidate encodings for plain-text uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// Decode order used by [`PlainTextProcessor`].
    pub const FALLBACK_ORDER: [Self; 3] = [Self::Utf8, Self::Latin1, Self::Windows1252];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "windows-1252",
        }
    }

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(ToString::to_string),
            // ISO-8859-1 maps every byte to the code point of the same value.
            Self::Latin1 => Some(bytes.iter().copied().map(char::from).collect()),
            Self::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(std::borrow::Cow::into_owned),
        }
    }
}

/// Text-file processor.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextProcessor;

impl PlainTextProcessor {
    /// Decode `bytes` with the fallback chain, returning the text and the
    /// encoding that produced it.
    pub fn decode(bytes: &[u8]) -> Result<(String, TextEncoding), ExtractionError> {
        let mut decoded_any = false;

        for encoding in TextEncoding::FALLBACK_ORDER {
            let Some(text) = encoding.decode(bytes) else {
                tracing::debug!(encoding = encoding.name(), "Text did not decode");
                continue;
            };
            decoded_any = true;

            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Ok((trimmed.to_string(), encoding));
            }
        }

        if decoded_any {
            Err(ExtractionError::NoExtractableText)
        } else {
            let tried: Vec<&str> = TextEncoding::FALLBACK_ORDER
                .iter()
                .map(|e| e.name())
                .collect();
            Err(ExtractionError::UndecodableText(format!(
                "tried {}",
                tried.join(", ")
            )))
        }
    }
}

impl TextSource for PlainTextProcessor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let (text, encoding) = Self::decode(bytes)?;
        tracing::debug!(encoding = encoding.name(), chars = text.len(), "Decoded text file");
        Ok(text)
    }

    fn supports_extension(&self, extension: &str) -> bool {
        extension.eq_ignore_ascii_case(".txt")
    }

    fn processor_name(&self) -> &'static str {
        "PlainText"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_is_returned_trimmed() {
        let (text, encoding) = PlainTextProcessor::decode("  Héllo, wörld ✓\n\n".as_bytes()).unwrap();
        assert_eq!(text, "Héllo, wörld ✓");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_latin1() {
        // "café" in Latin-1: 0xE9 alone is not valid UTF-8.
        let bytes = b"caf\xe9 au lait";
        let (text, encoding) = PlainTextProcessor::decode(bytes).unwrap();
        assert_eq!(text, "café au lait");
        assert_eq!(encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_latin1_keeps_c1_bytes_as_code_points() {
        // 0x80 is the euro sign in Windows-1252 but U+0080 in Latin-1;
        // Latin-1 comes first in the chain.
        let (text, _) = PlainTextProcessor::decode(b"price \x80 5").unwrap();
        assert_eq!(text, "price \u{80} 5");
    }

    #[test]
    fn test_windows_1252_decoder() {
        assert_eq!(
            TextEncoding::Windows1252.decode(b"\x80 5").as_deref(),
            Some("€ 5")
        );
    }

    #[test]
    fn test_blank_file_has_no_text() {
        let err = PlainTextProcessor::decode(b"  \n\t ").unwrap_err();
        assert!(matches!(err, ExtractionError::NoExtractableText));
    }

    #[test]
    fn test_supports_only_txt() {
        let processor = PlainTextProcessor;
        assert!(processor.supports_extension(".txt"));
        assert!(processor.supports_extension(".TXT"));
        assert!(!processor.supports_extension(".pdf"));
    }
}
