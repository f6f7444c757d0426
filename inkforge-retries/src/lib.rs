//! # inkforge-retries
//!
//! Rate-limit aware retry with exponential backoff.
//!
//! Every generative call in the workspace goes through this crate's
//! executor: on a rate-limit failure it waits an increasing delay and
//! re-invokes the operation up to a bounded attempt count; any other
//! failure propagates immediately. Upstream APIs sometimes embed a
//! suggested wait ("Please retry in 21.23s") in their error text; when
//! present, the wait honors whichever is larger, the exponential
//! schedule or the server hint plus one second of padding.
//!
//! ## Core pieces
//!
//! - [`BackoffPolicy`]: attempt budget and delay schedule.
//! - [`Retryable`]: implemented by error types that can classify
//!   themselves as rate-limited and surface a server wait hint.
//! - [`run_with_backoff`]: the executor.
//! - [`hints`]: string-matching fallbacks for upstream APIs that only
//!   report rate limits as free text.
//!
//! ## Example
//!
//! ```ignore
//! use inkforge_retries::{run_with_backoff, BackoffPolicy};
//!
//! let policy = BackoffPolicy::new().max_attempts(3);
//! let result = run_with_backoff(&policy, || async {
//!     call_the_model().await
//! }).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod executor;
pub mod hints;
pub mod policy;
pub mod retryable;

pub use executor::{run_with_backoff, run_with_backoff_state, AttemptInfo, RetryState};
pub use hints::{is_rate_limit_message, parse_retry_hint};
pub use policy::BackoffPolicy;
pub use retryable::Retryable;
