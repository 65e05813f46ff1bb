//! Response extractor
//!
//! Strips incidental code-fence wrapping from raw model text and parses the
//! remainder as JSON. The parsed value is returned untyped; shape checking
//! belongs to the itinerary validator.

use serde_json::Value as JsonValue;

/// Raw text that could not be parsed
///
/// Keeps the raw text and the parser message verbatim; both are needed to
/// diagnose prompt or schema drift.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("response is not valid JSON: {message}")]
pub struct ParseError {
    pub raw: String,
    pub message: String,
}

/// Parse raw model output
pub fn extract(raw: &str) -> Result<JsonValue, ParseError> {
    let content = strip_fences(raw);
    serde_json::from_str(content).map_err(|e| ParseError {
        raw: raw.to_string(),
        message: e.to_string(),
    })
}

/// Remove a surrounding markdown code block if present
///
/// Handles ```json ... ``` and ``` ... ```, with or without text around the
/// block. Text without a fence is returned trimmed.
pub fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[start + 3..];
    // Skip the language tag on the opening fence line
    let body = match after_open.find('\n') {
        Some(nl) if !after_open[..nl].contains('{') && !after_open[..nl].contains('[') => {
            &after_open[nl + 1..]
        }
        _ => strip_inline_tag(after_open),
    };

    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Drop a language tag written on the same line as the JSON, as in ```json {...}```
fn strip_inline_tag(text: &str) -> &str {
    let tag_len = text
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    let rest = text[tag_len..].trim_start();
    if tag_len > 0 && (rest.starts_with('{') || rest.starts_with('[')) {
        rest
    } else {
        text
    }
}
