//! Generated content types.
//!
//! The result of a generation call: zero or more text parts and/or inline
//! images, plus metadata about the producing model and token usage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inline binary image returned by a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME type (e.g. "image/png").
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// One part of a generated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratedPart {
    /// Generated text (often JSON-encoded when a schema hint was supplied).
    Text(String),
    /// A generated image.
    Image(InlineImage),
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// Natural stop.
    Stop,
    /// Hit the output token limit.
    Length,
    /// Safety filter intervened.
    ContentFilter,
    /// Anything else the upstream reports.
    Other,
}

/// Token usage reported by the upstream API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: u64,
    /// Tokens in the generated response.
    pub response_tokens: u64,
    /// Total billed tokens.
    pub total_tokens: u64,
}

/// The parsed result of a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generated {
    /// Response parts, in order.
    pub parts: Vec<GeneratedPart>,
    /// Name of the model that produced the response, if reported.
    pub model_name: Option<String>,
    /// Finish reason, if reported.
    pub finish_reason: Option<FinishReason>,
    /// Token usage, if reported.
    pub usage: Option<Usage>,
    /// When the response was received.
    pub timestamp: DateTime<Utc>,
}

impl Generated {
    /// Create a response holding a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![GeneratedPart::Text(text.into())],
            model_name: None,
            finish_reason: Some(FinishReason::Stop),
            usage: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a response holding a single image part.
    pub fn image(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            parts: vec![GeneratedPart::Image(InlineImage {
                mime_type: mime_type.into(),
                data,
            })],
            model_name: None,
            finish_reason: Some(FinishReason::Stop),
            usage: None,
            timestamp: Utc::now(),
        }
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                GeneratedPart::Text(t) => Some(t.as_str()),
                GeneratedPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// All image parts.
    #[must_use]
    pub fn images(&self) -> Vec<&InlineImage> {
        self.parts
            .iter()
            .filter_map(|p| match p {
                GeneratedPart::Image(img) => Some(img),
                GeneratedPart::Text(_) => None,
            })
            .collect()
    }

    /// First image part, if any.
    #[must_use]
    pub fn first_image(&self) -> Option<&InlineImage> {
        self.images().into_iter().next()
    }
}
