//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use inkforge_gemini::ModelError;
use inkforge_output::OutputParseError;

/// An error returned to the HTTP client as `{ "error": message }`.
///
/// The message travels verbatim so callers see exactly what failed.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status to respond with.
    pub status: StatusCode,
    /// Message placed in the body.
    pub message: String,
}

impl ApiError {
    /// Build an error with an explicit status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 response for a rejected request body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 502 response for an unusable upstream reply.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        let status = match &err {
            ModelError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ModelError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ModelError::MissingCredential { .. } => StatusCode::BAD_REQUEST,
            ModelError::ContentFiltered(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ModelError::Configuration(_) | ModelError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ModelError::Api { .. }
            | ModelError::Http { .. }
            | ModelError::InvalidResponse(_)
            | ModelError::Timeout(_)
            | ModelError::Connection(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<OutputParseError> for ApiError {
    fn from(err: OutputParseError) -> Self {
        Self::bad_gateway(err.to_string())
    }
}
