//! The inkforge studio server.
//!
//! An axum JSON API with one endpoint per content-generation feature. Each
//! endpoint assembles a prompt and response schema from its request body and
//! hands a [`TaskSpec`](engine::TaskSpec) to the shared [`Engine`], which
//! owns the HTTP connection pool and credential store and runs the
//! retry-wrapped, fallback-chained model call.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod routes;
pub mod tasks;

pub use config::StudioConfig;
pub use engine::{Engine, RetryNesting, TaskSpec};
pub use error::ApiError;
pub use routes::router;
