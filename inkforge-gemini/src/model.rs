//! The [`GenerativeModel`] trait and per-request options.

use async_trait::async_trait;

use inkforge_core::{GenerationSettings, Generated, Prompt};
use inkforge_output::ResponseSchema;

use crate::error::ModelError;

/// Per-request options that shape the response format.
///
/// These sit alongside [`GenerationSettings`]: settings tune sampling, while
/// options tell the provider what kind of output to produce.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Ask the provider to emit JSON conforming to this schema.
    pub response_schema: Option<ResponseSchema>,
    /// MIME type of the response body, e.g. `application/json`.
    pub response_mime_type: Option<String>,
    /// Output modalities to request, e.g. `["IMAGE", "TEXT"]` for image
    /// generation. Omitted for plain text.
    pub response_modalities: Option<Vec<String>>,
}

impl RequestOptions {
    /// Options for a plain text response.
    #[must_use]
    pub fn text() -> Self {
        Self::default()
    }

    /// Options for a structured JSON response conforming to `schema`.
    #[must_use]
    pub fn json(schema: ResponseSchema) -> Self {
        Self {
            response_schema: Some(schema),
            response_mime_type: Some("application/json".to_string()),
            response_modalities: None,
        }
    }

    /// Options for an image generation response.
    #[must_use]
    pub fn image() -> Self {
        Self {
            response_schema: None,
            response_mime_type: None,
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
        }
    }
}

/// A generative model that turns a prompt into generated content.
///
/// Implementations are expected to be cheap to share behind an `Arc` and to
/// classify provider failures into [`ModelError`] variants so callers can
/// distinguish rate limiting from terminal errors.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Short name identifying the implementation, e.g. `gemini`.
    fn name(&self) -> &str;

    /// The provider-side model identifier, e.g. `gemini-2.5-flash`.
    fn identifier(&self) -> &str;

    /// Run one generation request.
    async fn generate(
        &self,
        prompt: &Prompt,
        settings: &GenerationSettings,
        options: &RequestOptions,
    ) -> Result<Generated, ModelError>;
}

#[async_trait]
impl<M: GenerativeModel + ?Sized> GenerativeModel for std::sync::Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        settings: &GenerationSettings,
        options: &RequestOptions,
    ) -> Result<Generated, ModelError> {
        (**self).generate(prompt, settings, options).await
    }
}
