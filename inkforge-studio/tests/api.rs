//! End-to-end tests: HTTP route through the engine to a mocked Gemini API.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::util::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inkforge_studio::{router, Engine, StudioConfig};

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn gemini_text(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

async fn app_for(server: &MockServer) -> (axum::Router, Arc<Engine>) {
    let mut config = StudioConfig::default().with_api_base_url(server.uri());
    config.text_models = vec!["text-model".to_string()];
    config.image_models = vec!["image-model".to_string()];
    let engine = Arc::new(Engine::new(config));
    engine.credentials().set_shared("test-key");
    (router(Arc::clone(&engine)), engine)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn topics_round_trip() {
    let server = MockServer::start().await;
    let payload = serde_json::json!({
        "topics": [{
            "title": "Ronin Bakery",
            "angle": "swords to sourdough",
            "keywords": ["bakery", "ronin"],
            "rationale": "cozy niche is underserved"
        }]
    });
    Mock::given(method("POST"))
        .and(path("/v1beta/models/text-model:generateContent"))
        .respond_with(gemini_text(&payload.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = app_for(&server).await;
    let response = app
        .oneshot(json_post(
            "/api/research/topics",
            serde_json::json!({ "genre": "slice of life", "count": 1 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["topics"][0]["title"], "Ronin Bakery");
}

#[tokio::test]
async fn cover_returns_base64_image() {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/image-model:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"inlineData": {"mimeType": "image/png", "data": BASE64.encode([1u8, 2, 3])}}
                ]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = app_for(&server).await;
    let response = app
        .oneshot(json_post(
            "/api/cover",
            serde_json::json!({ "title": "Ronin Bakery" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["mime_type"], "image/png");
    assert_eq!(body["image_base64"], BASE64.encode([1u8, 2, 3]));
}

#[tokio::test]
async fn panels_runs_director_then_artist() {
    let server = MockServer::start().await;
    let plan = serde_json::json!({
        "pages": [{
            "page": 1,
            "panels": [{
                "panel": 1,
                "description": "Kenji kneads dough",
                "camera": "wide",
                "dialogue": ""
            }]
        }]
    });
    let prompts = serde_json::json!({
        "prompts": [{ "page": 1, "panel": 1, "prompt": "A ronin kneading dough at dawn" }]
    });
    Mock::given(method("POST"))
        .and(body_string_contains("Break this manga episode script"))
        .respond_with(gemini_text(&plan.to_string()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("Turn every panel"))
        .respond_with(gemini_text(&prompts.to_string()))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _) = app_for(&server).await;
    let response = app
        .oneshot(json_post(
            "/api/panels",
            serde_json::json!({ "script": "INT. BAKERY - DAWN", "pages": 1 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pages"][0]["panels"][0]["description"], "Kenji kneads dough");
    assert_eq!(
        body["art_prompts"][0]["prompt"],
        "A ronin kneading dough at dawn"
    );
}

#[tokio::test]
async fn listing_stops_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {
                "code": 429,
                "message": "quota exceeded. Please retry in 0.01s.",
                "status": "RESOURCE_EXHAUSTED"
            }
        })))
        .mount(&server)
        .await;

    let (app, _) = app_for(&server).await;
    let response = app
        .oneshot(json_post(
            "/api/listing",
            serde_json::json!({ "title": "Ronin Bakery", "synopsis": "Swords to sourdough." }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(server.received_requests().await.expect("requests").len(), 3);
    let body = body_json(response).await;
    assert!(body["error"].as_str().expect("message").contains("quota exceeded"));
}

#[tokio::test]
async fn missing_key_surfaces_as_client_error() {
    let server = MockServer::start().await;
    let mut config = StudioConfig::default().with_api_base_url(server.uri());
    config.text_models = vec!["text-model".to_string()];
    // Isolated store: no stored keys and no environment fallback.
    let engine = Arc::new(
        Engine::new(config)
            .with_credential_store(inkforge_gemini::CredentialStore::isolated()),
    );
    let app = router(engine);

    let response = app
        .oneshot(json_post(
            "/api/characters",
            serde_json::json!({ "premise": "rival food trucks" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(server.received_requests().await.expect("requests").is_empty());
}
