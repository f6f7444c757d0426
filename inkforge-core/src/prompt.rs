//! Prompt types.
//!
//! A [`Prompt`] is an ordered list of parts: plain text interleaved with
//! inline binary images (manuscript pages, reference art). Call sites build
//! prompts by straightforward string interpolation of their form fields; the
//! model layer converts the parts to the upstream wire format.

use serde::{Deserialize, Serialize};

/// A single part of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptPart {
    /// Plain text.
    Text(String),
    /// Inline binary image data.
    InlineImage {
        /// MIME type (e.g. "image/png").
        mime_type: String,
        /// Raw image bytes.
        data: Vec<u8>,
    },
}

/// An ordered prompt handed to a generative model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Optional system instruction, kept separate from user parts.
    pub system: Option<String>,
    /// User-facing parts, in order.
    pub parts: Vec<PromptPart>,
}

impl Prompt {
    /// Create an empty prompt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prompt from a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            system: None,
            parts: vec![PromptPart::Text(text.into())],
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Append a text part.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Text(text.into()));
        self
    }

    /// Append an inline image part.
    #[must_use]
    pub fn with_image(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.parts.push(PromptPart::InlineImage {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                PromptPart::Text(t) => Some(t.as_str()),
                PromptPart::InlineImage { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Number of inline image parts.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, PromptPart::InlineImage { .. }))
            .count()
    }

    /// Whether the prompt has no parts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prompt() {
        let prompt = Prompt::text("Propose five topics.");
        assert_eq!(prompt.parts.len(), 1);
        assert_eq!(prompt.text_content(), "Propose five topics.");
        assert_eq!(prompt.image_count(), 0);
    }

    #[test]
    fn test_builder_ordering() {
        let prompt = Prompt::new()
            .with_system("You are an editor.")
            .with_text("Review this page:")
            .with_image("image/png", vec![1, 2, 3])
            .with_text("Focus on pacing.");

        assert_eq!(prompt.system.as_deref(), Some("You are an editor."));
        assert_eq!(prompt.parts.len(), 3);
        assert_eq!(prompt.image_count(), 1);
        assert_eq!(prompt.text_content(), "Review this page:\nFocus on pacing.");
    }

    #[test]
    fn test_empty() {
        let prompt = Prompt::new();
        assert!(prompt.is_empty());
        assert_eq!(prompt.text_content(), "");
    }
}
