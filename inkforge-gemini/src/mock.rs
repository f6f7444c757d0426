//! A scriptable in-memory model for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use inkforge_core::{Generated, GenerationSettings, Prompt};

use crate::error::ModelError;
use crate::model::{GenerativeModel, RequestOptions};

#[derive(Debug, Clone)]
enum Outcome {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
    RateLimited { retry_after: Option<Duration> },
    Error(String),
}

impl Outcome {
    fn produce(&self) -> Result<Generated, ModelError> {
        match self {
            Outcome::Text(text) => Ok(Generated::text(text.clone())),
            Outcome::Image { mime_type, data } => {
                Ok(Generated::image(mime_type.clone(), data.clone()))
            }
            Outcome::RateLimited { retry_after } => Err(ModelError::RateLimited {
                message: "quota exceeded".to_string(),
                retry_after: *retry_after,
            }),
            Outcome::Error(message) => Err(ModelError::Api {
                code: 400,
                message: message.clone(),
            }),
        }
    }
}

/// A model whose responses follow a script.
///
/// Outcomes are consumed in order; once the script runs out, the final
/// outcome repeats. Call counts and received prompts are recorded for
/// assertions.
pub struct MockModel {
    identifier: String,
    script: Vec<Outcome>,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockModel {
    /// Create a mock with the given model identifier and an empty script.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            script: Vec::new(),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a text response to the script.
    #[must_use]
    pub fn with_text_response(mut self, text: impl Into<String>) -> Self {
        self.script.push(Outcome::Text(text.into()));
        self
    }

    /// Append an image response to the script.
    #[must_use]
    pub fn with_image_response(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.script.push(Outcome::Image {
            mime_type: mime_type.into(),
            data,
        });
        self
    }

    /// Append a rate-limit failure, optionally carrying a pacing hint.
    #[must_use]
    pub fn with_rate_limit(mut self, retry_after: Option<Duration>) -> Self {
        self.script.push(Outcome::RateLimited { retry_after });
        self
    }

    /// Append a terminal API failure.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.script.push(Outcome::Error(message.into()));
        self
    }

    /// Shared counter of calls made so far.
    #[must_use]
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared log of prompts received so far.
    #[must_use]
    pub fn prompt_log(&self) -> Arc<Mutex<Vec<Prompt>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        _settings: &GenerationSettings,
        _options: &RequestOptions,
    ) -> Result<Generated, ModelError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.clone());

        let index = call.min(self.script.len().saturating_sub(1));
        match self.script.get(index) {
            Some(outcome) => outcome.produce(),
            None => Err(ModelError::Configuration(format!(
                "mock model '{}' has no scripted outcomes",
                self.identifier
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_plays_in_order_then_repeats_last() {
        let mock = MockModel::new("m")
            .with_rate_limit(None)
            .with_text_response("done");

        let prompt = Prompt::text("go");
        let settings = GenerationSettings::new();
        let options = RequestOptions::text();

        assert!(mock.generate(&prompt, &settings, &options).await.is_err());
        for _ in 0..2 {
            let generated = mock
                .generate(&prompt, &settings, &options)
                .await
                .expect("text outcome");
            assert_eq!(generated.text_content(), "done");
        }
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn prompts_are_recorded() {
        let mock = MockModel::new("m").with_text_response("ok");
        let log = mock.prompt_log();

        mock.generate(
            &Prompt::text("remember me"),
            &GenerationSettings::new(),
            &RequestOptions::text(),
        )
        .await
        .expect("success");

        let prompts = log.lock();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].text_content(), "remember me");
    }

    #[tokio::test]
    async fn empty_script_is_a_configuration_error() {
        let mock = MockModel::new("m");
        let err = mock
            .generate(
                &Prompt::text("go"),
                &GenerationSettings::new(),
                &RequestOptions::text(),
            )
            .await
            .expect_err("no script");
        assert!(matches!(err, ModelError::Configuration(_)));
    }
}
