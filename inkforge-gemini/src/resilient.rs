//! Retry wrapper for a single model.

use async_trait::async_trait;

use inkforge_core::{Generated, GenerationSettings, Prompt};
use inkforge_retries::{run_with_backoff, BackoffPolicy};

use crate::error::ModelError;
use crate::model::{GenerativeModel, RequestOptions};

/// Wraps a model so each request runs under a backoff policy.
///
/// Composes with [`FallbackChain`](crate::FallbackChain) in either order:
/// wrap each chain member for per-model retrying, or wrap the whole chain to
/// retry full passes over it.
pub struct RetryingModel<M> {
    inner: M,
    policy: BackoffPolicy,
}

impl<M> RetryingModel<M> {
    /// Wrap `inner` with the default backoff policy.
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            policy: BackoffPolicy::new(),
        }
    }

    /// Wrap `inner` with an explicit policy.
    #[must_use]
    pub fn with_policy(inner: M, policy: BackoffPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped model.
    pub fn inner(&self) -> &M {
        &self.inner
    }
}

#[async_trait]
impl<M: GenerativeModel> GenerativeModel for RetryingModel<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn identifier(&self) -> &str {
        self.inner.identifier()
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        settings: &GenerationSettings,
        options: &RequestOptions,
    ) -> Result<Generated, ModelError> {
        run_with_backoff(&self.policy, || {
            self.inner.generate(prompt, settings, options)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockModel;
    use std::time::Duration;

    fn fast_policy(attempts: u32) -> BackoffPolicy {
        BackoffPolicy::new()
            .max_attempts(attempts)
            .base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn rate_limits_are_retried_until_success() {
        let mock = MockModel::new("m")
            .with_rate_limit(None)
            .with_rate_limit(None)
            .with_text_response("recovered");
        let calls = mock.call_counter();

        let model = RetryingModel::with_policy(mock, fast_policy(5));
        let generated = model
            .generate(
                &Prompt::text("go"),
                &GenerationSettings::new(),
                &RequestOptions::text(),
            )
            .await
            .expect("recovers on third attempt");

        assert_eq!(generated.text_content(), "recovered");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_are_not_retried() {
        let mock = MockModel::new("m").with_error("bad request");
        let calls = mock.call_counter();

        let model = RetryingModel::with_policy(mock, fast_policy(5));
        let err = model
            .generate(
                &Prompt::text("go"),
                &GenerationSettings::new(),
                &RequestOptions::text(),
            )
            .await
            .expect_err("terminal");

        assert!(matches!(err, ModelError::Api { .. }));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_budget_returns_last_rate_limit() {
        let mock = MockModel::new("m").with_rate_limit(None);
        let calls = mock.call_counter();

        let model = RetryingModel::with_policy(mock, fast_policy(3));
        let err = model
            .generate(
                &Prompt::text("go"),
                &GenerationSettings::new(),
                &RequestOptions::text(),
            )
            .await
            .expect_err("exhausted");

        assert!(matches!(err, ModelError::RateLimited { .. }));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}
