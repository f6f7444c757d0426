//! JSON extraction from free-text model replies.
//!
//! Even with a schema hint, models sometimes wrap their JSON in markdown
//! fences or surround it with prose. These helpers locate the payload
//! before handing it to serde.

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::OutputParseError;

/// Extract a JSON document from text that may contain markdown or prose.
///
/// Tried in order: a ```json fence, a plain ``` fence, an embedded object
/// (brace matching), an embedded array (bracket matching), then the whole
/// text verbatim.
pub fn extract_json_from_text(text: &str) -> Result<String, OutputParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(OutputParseError::Empty);
    }

    if let Some(json) = fenced_block(text, "```json")
        .or_else(|| fenced_block(text, "```"))
        .or_else(|| delimited(text, '{', '}'))
        .or_else(|| delimited(text, '[', ']'))
    {
        return Ok(json);
    }

    if serde_json::from_str::<JsonValue>(text).is_ok() {
        return Ok(text.to_string());
    }

    Err(OutputParseError::NoJsonFound)
}

/// Extract and deserialize in one step.
pub fn parse_json_from_text<T: DeserializeOwned>(text: &str) -> Result<T, OutputParseError> {
    let json = extract_json_from_text(text)?;
    Ok(serde_json::from_str(&json)?)
}

/// Quick check for text that plausibly contains JSON.
#[must_use]
pub fn looks_like_json(text: &str) -> bool {
    let text = text.trim();
    text.starts_with('{') || text.starts_with('[') || text.contains("```json")
}

/// Case-insensitive search for an ASCII `needle`, returning a byte index
/// valid in `text` itself. Lowercasing a copy would not do: Unicode case
/// folding can change byte lengths, so indices found in a folded copy can
/// fall outside the original string.
fn find_ascii_ci(text: &str, needle: &str) -> Option<usize> {
    text.as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Pull the contents of a markdown fence opened by `marker`, validating
/// that it parses as JSON.
fn fenced_block(text: &str, marker: &str) -> Option<String> {
    let start = find_ascii_ci(text, marker)?;
    let after_marker = start + marker.len();
    // Skip to the end of the opening fence line.
    let content_start = text[after_marker..]
        .find('\n')
        .map(|i| after_marker + i + 1)
        .unwrap_or(after_marker);
    let end = text[content_start..].find("```")?;
    let candidate = text[content_start..content_start + end].trim();
    serde_json::from_str::<JsonValue>(candidate)
        .ok()
        .map(|_| candidate.to_string())
}

/// Find a balanced `open`..`close` span that parses as JSON, skipping
/// delimiters inside string literals.
fn delimited(text: &str, open: char, close: char) -> Option<String> {
    let start = text.find(open)?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    let candidate = &text[start..=start + i];
                    if serde_json::from_str::<JsonValue>(candidate).is_ok() {
                        return Some(candidate.to_string());
                    }
                    return None;
                }
            }
            _ => {}
        }
    }
    None
}
