//! Gemini model access for inkforge.
//!
//! This crate owns everything between a [`Prompt`](inkforge_core::Prompt)
//! and Google's Generative Language API:
//!
//! - [`GenerativeModel`]: the trait call sites program against
//! - [`GeminiModel`]: the HTTP client for `generateContent`
//! - [`FallbackChain`]: an ordered list of models tried once each
//! - [`RetryingModel`]: a backoff wrapper composable with the chain
//! - [`CredentialStore`]: chained API key resolution
//! - [`MockModel`]: a scriptable model for tests
//!
//! Failures are classified into [`ModelError`]; only
//! [`ModelError::RateLimited`] is considered retryable.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod credentials;
mod error;
mod fallback;
mod gemini;
mod mock;
mod model;
mod resilient;

pub use credentials::{CredentialStore, SHARED_FEATURE};
pub use error::ModelError;
pub use fallback::{FallbackChain, FallbackOn};
pub use gemini::{GeminiModel, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use mock::MockModel;
pub use model::{GenerativeModel, RequestOptions};
pub use resilient::RetryingModel;
