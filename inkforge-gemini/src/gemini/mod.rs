//! HTTP client for Google's Gemini Generative Language API.
//!
//! Talks to the `v1beta` `generateContent` endpoint. The API key travels as
//! a query parameter, so request URLs are never logged.

mod types;

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use tracing::debug;

use inkforge_core::{
    FinishReason, Generated, GeneratedPart, GenerationSettings, InlineImage, Prompt, PromptPart,
    Usage,
};
use inkforge_retries::is_rate_limit_message;

use crate::error::ModelError;
use crate::model::{GenerativeModel, RequestOptions};

use types::{
    ApiErrorBody, Blob, Content, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part,
};

/// Production endpoint for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const MAX_LOGGED_BODY: usize = 512;

/// A Gemini model reachable over HTTP.
///
/// The [`reqwest::Client`] is injected so callers can share one connection
/// pool across every model instance.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: reqwest::Client,
    model_name: String,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiModel {
    /// Create a model for `model_name` authenticated with `api_key`.
    pub fn new(
        client: reqwest::Client,
        model_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model_name: model_name.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the API base URL (used by tests against a local server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model_name,
            self.api_key
        )
    }

    fn build_request(
        prompt: &Prompt,
        settings: &GenerationSettings,
        options: &RequestOptions,
    ) -> GenerateContentRequest {
        let parts = prompt
            .parts
            .iter()
            .map(|part| match part {
                PromptPart::Text(text) => Part::Text { text: text.clone() },
                PromptPart::InlineImage { mime_type, data } => Part::InlineData {
                    inline_data: Blob {
                        mime_type: mime_type.clone(),
                        data: BASE64.encode(data),
                    },
                },
            })
            .collect();

        let system_instruction = prompt.system.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part::Text { text: text.clone() }],
        });

        let config = GenerationConfig {
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            top_p: settings.top_p,
            top_k: settings.top_k,
            stop_sequences: settings.stop.clone(),
            response_mime_type: options.response_mime_type.clone(),
            response_schema: options
                .response_schema
                .as_ref()
                .map(|schema| schema.to_value().clone()),
            response_modalities: options.response_modalities.clone(),
        };
        let has_config = config.temperature.is_some()
            || config.max_output_tokens.is_some()
            || config.top_p.is_some()
            || config.top_k.is_some()
            || config.stop_sequences.is_some()
            || config.response_mime_type.is_some()
            || config.response_schema.is_some()
            || config.response_modalities.is_some();

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction,
            generation_config: has_config.then_some(config),
        }
    }

    fn parse_success(&self, response: GenerateContentResponse) -> Result<Generated, ModelError> {
        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return Err(ModelError::ContentFiltered(format!(
                "prompt blocked: {reason}"
            )));
        }

        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            ModelError::InvalidResponse("response contained no candidates".to_string())
        })?;
        let finish_reason = candidate.finish_reason.as_deref().map(map_finish_reason);

        let mut parts = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            match part {
                Part::Text { text } => parts.push(GeneratedPart::Text(text)),
                Part::InlineData { inline_data } => {
                    let data = BASE64.decode(inline_data.data.as_bytes()).map_err(|e| {
                        ModelError::InvalidResponse(format!("undecodable inline image: {e}"))
                    })?;
                    parts.push(GeneratedPart::Image(InlineImage {
                        mime_type: inline_data.mime_type,
                        data,
                    }));
                }
            }
        }

        if parts.is_empty() {
            return Err(match finish_reason {
                Some(FinishReason::ContentFilter) => {
                    ModelError::ContentFiltered("response blocked by safety filter".to_string())
                }
                _ => ModelError::InvalidResponse("candidate contained no parts".to_string()),
            });
        }

        Ok(Generated {
            parts,
            model_name: Some(self.model_name.clone()),
            finish_reason,
            usage: response.usage_metadata.map(|u| Usage {
                prompt_tokens: u64::from(u.prompt_token_count),
                response_tokens: u64::from(u.candidates_token_count),
                total_tokens: u64::from(u.total_token_count),
            }),
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    fn identifier(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        settings: &GenerationSettings,
        options: &RequestOptions,
    ) -> Result<Generated, ModelError> {
        let request = Self::build_request(prompt, settings, options);
        debug!(
            model = %self.model_name,
            parts = prompt.parts.len(),
            images = prompt.image_count(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.build_url())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(ModelError::from)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(ModelError::from)?;
        if !(200..300).contains(&status) {
            return Err(error_from_response(status, &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        self.parse_success(parsed)
    }
}

/// Map a non-success HTTP response to a [`ModelError`].
///
/// String matching against the body happens only here, at the upstream
/// boundary; everything downstream works with the typed variants.
fn error_from_response(status: u16, body: &str) -> ModelError {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        let detail = parsed.error;
        return match status {
            401 | 403 => ModelError::Authentication(detail.message),
            429 => ModelError::rate_limited(detail.message),
            _ if detail.status == "RESOURCE_EXHAUSTED"
                || is_rate_limit_message(&detail.message) =>
            {
                ModelError::rate_limited(detail.message)
            }
            _ => ModelError::Api {
                code: if detail.code != 0 { detail.code } else { status },
                message: detail.message,
            },
        };
    }

    if status == 429 || is_rate_limit_message(body) {
        return ModelError::rate_limited(truncate(body, MAX_LOGGED_BODY));
    }
    match status {
        401 | 403 => ModelError::Authentication(truncate(body, MAX_LOGGED_BODY)),
        _ => ModelError::Http {
            status,
            body: truncate(body, MAX_LOGGED_BODY),
        },
    }
}

fn map_finish_reason(raw: &str) -> FinishReason {
    match raw {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "PROHIBITED_CONTENT" | "BLOCKLIST" => FinishReason::ContentFilter,
        _ => FinishReason::Other,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
