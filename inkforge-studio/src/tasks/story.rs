//! Episode script generation.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "story";

/// Request body for `POST /api/story/episode`.
#[derive(Debug, Deserialize)]
pub struct EpisodeRequest {
    /// Outline of the episode to write.
    pub outline: String,
    /// Synopsis of what has happened so far.
    #[serde(default)]
    pub previous_synopsis: Option<String>,
    /// Episode number in the series.
    #[serde(default)]
    pub episode_number: Option<u32>,
    /// Prose style notes, e.g. "fast-paced, dry humor".
    #[serde(default)]
    pub style: Option<String>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response body for `POST /api/story/episode`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EpisodeResponse {
    /// Episode title.
    pub title: String,
    /// One-paragraph synopsis for the next episode's context.
    pub synopsis: String,
    /// The full episode script.
    pub script: String,
}

fn prompt(req: &EpisodeRequest) -> Prompt {
    let mut text = String::new();
    if let Some(n) = req.episode_number {
        text.push_str(&format!("Write episode {n} of a serialized manga. "));
    } else {
        text.push_str("Write the next episode of a serialized manga. ");
    }
    if let Some(prev) = req.previous_synopsis.as_deref() {
        text.push_str(&format!("Previously: {prev} "));
    }
    text.push_str(&format!("Outline for this episode: {}", req.outline));
    if let Some(style) = req.style.as_deref() {
        text.push_str(&format!(" Style notes: {style}."));
    }
    text.push_str(
        " Return a title, a one-paragraph synopsis usable as context for the \
         next episode, and the full script with scene headings and dialogue.",
    );
    Prompt::text(text).with_system("You are a manga scriptwriter. Write vivid, paneled scenes.")
}

fn schema() -> ResponseSchema {
    SchemaBuilder::object()
        .string("title", "Episode title")
        .string("synopsis", "One-paragraph synopsis for continuity")
        .string("script", "Full episode script with scene headings and dialogue")
        .require(["title", "synopsis", "script"])
        .build()
}

/// `POST /api/story/episode`
pub async fn episode(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<EpisodeRequest>,
) -> Result<Json<EpisodeResponse>, ApiError> {
    if req.outline.trim().is_empty() {
        return Err(ApiError::bad_request("outline must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, prompt(&req))
        .settings(
            GenerationSettings::new()
                .temperature(1.0)
                .max_output_tokens(8192),
        )
        .options(RequestOptions::json(schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let response: EpisodeResponse = engine.run_json(spec).await?;
    Ok(Json(response))
}
