//! Model fallback.
//!
//! A [`FallbackChain`] holds an ordered list of models and tries each one
//! exactly once per request. Fallback is a single pass over the list; any
//! per-model retrying is layered separately via
//! [`RetryingModel`](crate::RetryingModel).

use async_trait::async_trait;
use tracing::{debug, warn};

use inkforge_core::{Generated, GenerationSettings, Prompt};
use inkforge_retries::Retryable;

use crate::error::ModelError;
use crate::model::{GenerativeModel, RequestOptions};

/// Which failures cause the chain to move on to the next model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackOn {
    /// Fall back on any failure.
    #[default]
    AnyError,
    /// Fall back only on rate limiting; other failures stop the chain.
    RateLimits,
}

impl FallbackOn {
    fn should_fall_back(self, error: &ModelError) -> bool {
        match self {
            FallbackOn::AnyError => true,
            FallbackOn::RateLimits => error.is_retryable(),
        }
    }
}

/// An ordered chain of models tried once each, in order.
pub struct FallbackChain {
    models: Vec<Box<dyn GenerativeModel>>,
    fallback_on: FallbackOn,
}

impl FallbackChain {
    /// Build a chain from an ordered list of models.
    #[must_use]
    pub fn new(models: Vec<Box<dyn GenerativeModel>>) -> Self {
        Self {
            models,
            fallback_on: FallbackOn::default(),
        }
    }

    /// Set the fallback policy.
    #[must_use]
    pub fn fallback_on(mut self, policy: FallbackOn) -> Self {
        self.fallback_on = policy;
        self
    }

    /// Number of models in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the chain holds no models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[async_trait]
impl GenerativeModel for FallbackChain {
    fn name(&self) -> &str {
        "fallback"
    }

    fn identifier(&self) -> &str {
        self.models
            .first()
            .map(|m| m.identifier())
            .unwrap_or("empty")
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        settings: &GenerationSettings,
        options: &RequestOptions,
    ) -> Result<Generated, ModelError> {
        if self.models.is_empty() {
            return Err(ModelError::Configuration(
                "fallback chain has no models".to_string(),
            ));
        }

        let mut last_error = None;
        for (position, model) in self.models.iter().enumerate() {
            match model.generate(prompt, settings, options).await {
                Ok(generated) => {
                    if position > 0 {
                        debug!(
                            model = %model.identifier(),
                            position,
                            "fallback model succeeded"
                        );
                    }
                    return Ok(generated);
                }
                Err(error) => {
                    let exhausted = position + 1 == self.models.len();
                    if !exhausted && self.fallback_on.should_fall_back(&error) {
                        warn!(
                            model = %model.identifier(),
                            position,
                            error = %error,
                            "model failed, falling back to next"
                        );
                        last_error = Some(error);
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        // The last iteration always returns, so this is only reachable if
        // the loop body never ran, which the emptiness check rules out.
        Err(last_error.unwrap_or_else(|| {
            ModelError::Configuration("fallback chain has no models".to_string())
        }))
    }
}
