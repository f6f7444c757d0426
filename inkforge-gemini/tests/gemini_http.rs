//! HTTP-level tests for [`GeminiModel`] against a wiremock server.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::{
    FallbackChain, GeminiModel, GenerativeModel, ModelError, RequestOptions, RetryingModel,
};
use inkforge_output::SchemaBuilder;
use inkforge_retries::BackoffPolicy;

fn model_for(server: &MockServer, model_name: &str) -> GeminiModel {
    GeminiModel::new(reqwest::Client::new(), model_name, "test-key").with_base_url(server.uri())
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 10,
            "candidatesTokenCount": 5,
            "totalTokenCount": 15
        }
    }))
}

fn quota_response(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(429).set_body_json(serde_json::json!({
        "error": {"code": 429, "message": message, "status": "RESOURCE_EXHAUSTED"}
    }))
}

#[tokio::test]
async fn generates_text_and_reports_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(text_response("Five topics about ronin bakers."))
        .expect(1)
        .mount(&server)
        .await;

    let model = model_for(&server, "gemini-2.5-flash");
    let generated = model
        .generate(
            &Prompt::text("Propose five topics."),
            &GenerationSettings::new().temperature(0.9),
            &RequestOptions::text(),
        )
        .await
        .expect("success");

    assert_eq!(generated.text_content(), "Five topics about ronin bakers.");
    let usage = generated.usage.expect("usage");
    assert_eq!(usage.total_tokens, 15);
}

#[tokio::test]
async fn sends_schema_and_mime_type_for_json_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {"type": "OBJECT"}
            }
        })))
        .respond_with(text_response(r#"{"title": "Ronin Bakery"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let schema = SchemaBuilder::object()
        .string("title", "Series title")
        .require(["title"])
        .build();
    let model = model_for(&server, "gemini-2.5-pro");
    let generated = model
        .generate(
            &Prompt::text("Name the series."),
            &GenerationSettings::new(),
            &RequestOptions::json(schema),
        )
        .await
        .expect("success");

    assert_eq!(generated.text_content(), r#"{"title": "Ronin Bakery"}"#);
}

#[tokio::test]
async fn quota_response_carries_typed_hint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(quota_response("Resource exhausted. Please retry in 21.23s."))
        .mount(&server)
        .await;

    let model = model_for(&server, "gemini-2.5-flash");
    let err = model
        .generate(
            &Prompt::text("go"),
            &GenerationSettings::new(),
            &RequestOptions::text(),
        )
        .await
        .expect_err("rate limited");

    match err {
        ModelError::RateLimited { retry_after, .. } => {
            assert_eq!(retry_after, Some(Duration::from_millis(21_230)));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn bad_key_maps_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let model = model_for(&server, "gemini-2.5-flash");
    let err = model
        .generate(
            &Prompt::text("go"),
            &GenerationSettings::new(),
            &RequestOptions::text(),
        )
        .await
        .expect_err("auth");
    assert!(matches!(err, ModelError::Authentication(_)));
}

#[tokio::test]
async fn retrying_model_recovers_after_quota_responses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(quota_response("too many requests"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(text_response("recovered"))
        .mount(&server)
        .await;

    let policy = BackoffPolicy::new()
        .max_attempts(5)
        .base_delay(Duration::from_millis(1));
    let model = RetryingModel::with_policy(model_for(&server, "gemini-2.5-flash"), policy);
    let generated = model
        .generate(
            &Prompt::text("go"),
            &GenerationSettings::new(),
            &RequestOptions::text(),
        )
        .await
        .expect("recovers");

    assert_eq!(generated.text_content(), "recovered");
    assert_eq!(server.received_requests().await.expect("requests").len(), 3);
}

#[tokio::test]
async fn fallback_moves_to_second_model_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(quota_response("quota exceeded"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .respond_with(text_response("from flash"))
        .expect(1)
        .mount(&server)
        .await;

    let chain = FallbackChain::new(vec![
        Box::new(model_for(&server, "gemini-2.5-pro")),
        Box::new(model_for(&server, "gemini-2.5-flash")),
    ]);
    let generated = chain
        .generate(
            &Prompt::text("go"),
            &GenerationSettings::new(),
            &RequestOptions::text(),
        )
        .await
        .expect("falls back");

    assert_eq!(generated.text_content(), "from flash");
}
