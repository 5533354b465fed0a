//! Turning the model's reply text into an extraction result.
//!
//! Models often wrap JSON in a markdown code fence even when told not to.
//! [`strip_code_fence`] removes one fence pair (with an optional language
//! tag), then [`parse_response`] parses the remainder strictly as a JSON
//! object.

use serde_json::{Map, Value};

use crate::error::ExtractionError;

const FENCE: &str = "```";

/// Structured fields exactly as returned by the model.
pub type ExtractionResult = Map<String, Value>;

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.')
}

/// Remove a surrounding markdown code fence, if present.
///
/// Input that does not start with a fence is returned trimmed. A fence
/// without a closing marker is reported as [`ExtractionError::MalformedResponse`].
pub fn strip_code_fence(raw: &str) -> Result<&str, ExtractionError> {
    let trimmed = raw.trim();
    if !trimmed.starts_with(FENCE) {
        return Ok(trimmed);
    }
    // Longer fences (````json) open with the whole backtick run.
    let after_open = trimmed.trim_start_matches('`');

    // Opening line: optional language tag, then end of line.
    let tag_len = after_open
        .char_indices()
        .find(|(_, c)| !is_tag_char(*c))
        .map_or(after_open.len(), |(i, _)| i);
    let after_tag = &after_open[tag_len..];
    let body = match after_tag.split_once('\n') {
        Some((rest_of_line, body)) if rest_of_line.trim().is_empty() => body,
        // Content on the fence line itself, e.g. ```json {"a": 1}```
        _ if tag_len > 0
            && after_tag.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '[') =>
        {
            after_tag
        }
        _ => after_open,
    };

    let Some(close) = body.rfind(FENCE) else {
        return Err(ExtractionError::MalformedResponse {
            reason: "unterminated code fence".to_string(),
            raw: raw.to_string(),
        });
    };

    Ok(body[..close].trim_end_matches('`').trim())
}

/// Parse a raw reply into an [`ExtractionResult`].
pub fn parse_response(raw: &str) -> Result<ExtractionResult, ExtractionError> {
    let content = strip_code_fence(raw)?;

    let value: Value =
        serde_json::from_str(content).map_err(|e| ExtractionError::MalformedResponse {
            reason: e.to_string(),
            raw: raw.to_string(),
        })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ExtractionError::MalformedResponse {
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
            raw: raw.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json_passes_through() {
        assert_eq!(strip_code_fence("  {\"a\": 1}\n").unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_fence_with_language_tag() {
        let raw = "```json\n{\"Name\": \"A\"}\n```";
        assert_eq!(strip_code_fence(raw).unwrap(), "{\"Name\": \"A\"}");
        let parsed = parse_response(raw).unwrap();
        assert_eq!(Value::Object(parsed), json!({"Name": "A"}));
    }

    #[test]
    fn test_fence_without_tag() {
        let raw = "```\n{\"Tone\": \"Casual\"}\n```";
        assert_eq!(strip_code_fence(raw).unwrap(), "{\"Tone\": \"Casual\"}");
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fence("```json {\"a\":1}```").unwrap(), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```").unwrap(), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json{\"a\":1}```").unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_trailing_commentary_after_fence_is_dropped() {
        let raw = "```json\n{\"a\": 1}\n```\nLet me know if you need more.";
        assert_eq!(strip_code_fence(raw).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_four_backtick_fence() {
        let raw = "````json\n{\"Name\": \"Ada\"}\n````";
        assert_eq!(strip_code_fence(raw).unwrap(), "{\"Name\": \"Ada\"}");
        assert_eq!(parse_response(raw).unwrap()["Name"], "Ada");
    }

    #[test]
    fn test_unterminated_fence_is_malformed() {
        let raw = "```json\n{\"a\": 1}";
        let err = strip_code_fence(raw).unwrap_err();
        match err {
            ExtractionError::MalformedResponse { raw: kept, .. } => assert_eq!(kept, raw),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_keeps_raw_text() {
        let raw = "Sure! Here is the data: Name = A";
        let err = parse_response(raw).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_RESPONSE");
        assert_eq!(err.raw_response(), Some(raw));
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = parse_response("[\"a\", \"b\"]").unwrap_err();
        match err {
            ExtractionError::MalformedResponse { reason, .. } => {
                assert!(reason.contains("an array"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_keys_are_not_renamed_or_added() {
        let parsed = parse_response("{\"Main_Theme\": \"pricing\", \"Extra\": 3}").unwrap();
        let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Main_Theme", "Extra"]);
    }
}
