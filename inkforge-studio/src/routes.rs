//! HTTP routing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::engine::Engine;
use crate::tasks;

/// Build the full API router around a shared engine.
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/settings/api-key", post(set_api_key))
        .route("/api/research/topics", post(tasks::research::topics))
        .route("/api/research/genres", post(tasks::research::genres))
        .route("/api/worldbuilding", post(tasks::worldbuilding::generate))
        .route("/api/characters", post(tasks::characters::generate))
        .route("/api/story/episode", post(tasks::story::episode))
        .route("/api/panels", post(tasks::panels::generate))
        .route("/api/cover", post(tasks::cover::generate))
        .route("/api/analysis", post(tasks::analysis::analyze))
        .route("/api/listing", post(tasks::listing::generate))
        .with_state(engine)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct SetApiKeyRequest {
    /// Feature to scope the key to; omitted means the shared default.
    #[serde(default)]
    feature: Option<String>,
    /// The key itself; empty removes the stored key.
    api_key: String,
}

async fn set_api_key(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<SetApiKeyRequest>,
) -> StatusCode {
    match req.feature.as_deref() {
        Some(feature) => {
            engine.credentials().set(feature, &req.api_key);
            info!(feature, "stored API key");
        }
        None => {
            engine.credentials().set_shared(&req.api_key);
            info!("stored shared API key");
        }
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudioConfig;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::util::ServiceExt;

    fn test_router() -> Router {
        router(Arc::new(Engine::new(StudioConfig::default())))
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_genre_is_rejected_before_any_upstream_call() {
        let response = test_router()
            .oneshot(json_post(
                "/api/research/topics",
                json!({ "genre": "  " }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["error"], "genre must not be empty");
    }

    #[tokio::test]
    async fn api_key_endpoint_stores_and_clears_keys() {
        let engine = Arc::new(Engine::new(StudioConfig::default()));
        let app = router(Arc::clone(&engine));

        engine.credentials().set_shared("shared-key");

        let response = app
            .clone()
            .oneshot(json_post(
                "/api/settings/api-key",
                json!({ "feature": "cover", "api_key": "stored-key" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            engine.credentials().resolve("cover", None).expect("key"),
            "stored-key"
        );

        // Clearing the feature key falls back to the shared default.
        app.oneshot(json_post(
            "/api/settings/api-key",
            json!({ "feature": "cover", "api_key": "" }),
        ))
        .await
        .expect("response");
        assert_eq!(
            engine.credentials().resolve("cover", None).expect("key"),
            "shared-key"
        );
    }
}
