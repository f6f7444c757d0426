//! Error types for model calls.

use std::time::Duration;

use inkforge_retries::Retryable;

/// Errors produced when invoking a generative model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The provider rejected the request because of rate limiting or an
    /// exhausted quota. `retry_after` carries the server's pacing hint when
    /// the response included one.
    #[error("rate limited: {message}")]
    RateLimited {
        /// Human-readable message from the provider.
        message: String,
        /// Server-suggested wait before the next attempt.
        retry_after: Option<Duration>,
    },

    /// The API key was missing, malformed, or rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// No API key could be resolved for the request.
    #[error("no API key configured for feature '{feature}'")]
    MissingCredential {
        /// The feature whose credential lookup failed.
        feature: String,
    },

    /// The provider returned a structured error payload.
    #[error("API error ({code}): {message}")]
    Api {
        /// Numeric error code from the provider.
        code: u16,
        /// Error message from the provider.
        message: String,
    },

    /// Non-success HTTP status with an unstructured body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body, truncated for logging.
        body: String,
    },

    /// The prompt or response was blocked by the provider's safety filters.
    #[error("content blocked: {0}")]
    ContentFiltered(String),

    /// The response arrived but did not contain usable output.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request timed out before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not reach the provider.
    #[error("connection error: {0}")]
    Connection(String),

    /// The model or request was misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A request or response body failed to serialize or deserialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    /// Build a rate-limit error, extracting any pacing hint embedded in the
    /// provider's message ("Please retry in 21.23s").
    pub fn rate_limited(message: impl Into<String>) -> Self {
        let message = message.into();
        let retry_after = inkforge_retries::parse_retry_hint(&message);
        ModelError::RateLimited {
            message,
            retry_after,
        }
    }
}

impl Retryable for ModelError {
    fn is_retryable(&self) -> bool {
        matches!(self, ModelError::RateLimited { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout(err.to_string())
        } else if err.is_connect() {
            ModelError::Connection(err.to_string())
        } else {
            ModelError::Http {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                body: err.to_string(),
            }
        }
    }
}
