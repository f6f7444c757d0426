//! Cover image generation.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;

use crate::engine::{Engine, RetryNesting, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "cover";

/// Request body for `POST /api/cover`.
#[derive(Debug, Deserialize)]
pub struct CoverRequest {
    /// Book title to feature on the cover.
    pub title: String,
    /// Genre, used to pick visual language.
    #[serde(default)]
    pub genre: Option<String>,
    /// Art direction notes.
    #[serde(default)]
    pub art_direction: Option<String>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response body for `POST /api/cover`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CoverResponse {
    /// MIME type of the generated image.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub image_base64: String,
}

fn prompt(req: &CoverRequest) -> Prompt {
    let mut text = format!(
        "Generate a manga cover illustration for a book titled \"{title}\".",
        title = req.title
    );
    if let Some(genre) = req.genre.as_deref() {
        text.push_str(&format!(" Genre: {genre}."));
    }
    if let Some(direction) = req.art_direction.as_deref() {
        text.push_str(&format!(" Art direction: {direction}."));
    }
    text.push_str(" Leave room at the top for title typography.");
    Prompt::text(text)
}

/// `POST /api/cover`
///
/// Image models are scarcer than text models, so this call site retries
/// around the whole fallback chain rather than per model.
pub async fn generate(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<CoverRequest>,
) -> Result<Json<CoverResponse>, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("title must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, prompt(&req))
        .settings(GenerationSettings::new().temperature(1.0))
        .options(RequestOptions::image())
        .models(engine.config().image_models.clone())
        .nesting(RetryNesting::AroundChain)
        .api_key(req.api_key.clone());

    let generated = engine.run(spec).await?;
    let image = generated
        .first_image()
        .ok_or_else(|| ApiError::bad_gateway("model returned no image"))?;

    Ok(Json(CoverResponse {
        mime_type: image.mime_type.clone(),
        image_base64: BASE64.encode(&image.data),
    }))
}
