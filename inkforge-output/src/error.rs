//! Output parsing errors.

use thiserror::Error;

/// Errors from extracting or parsing model output.
#[derive(Debug, Error)]
pub enum OutputParseError {
    /// No JSON object or array could be located in the text.
    #[error("no JSON found in model output")]
    NoJsonFound,

    /// The located JSON failed to deserialize into the expected shape.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The model returned no usable content at all.
    #[error("empty model output")]
    Empty,
}
