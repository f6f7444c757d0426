//! Amazon KDP listing metadata.
//!
//! Listing generation runs in bulk during publishing pushes, so this call
//! site keeps a reduced retry budget of three attempts.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};
use inkforge_retries::BackoffPolicy;

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "listing";
const RETRY_BUDGET: u32 = 3;
const KEYWORD_COUNT: usize = 7;

/// Request body for `POST /api/listing`.
#[derive(Debug, Deserialize)]
pub struct ListingRequest {
    /// Book title.
    pub title: String,
    /// Story synopsis.
    pub synopsis: String,
    /// Genre, if decided.
    #[serde(default)]
    pub genre: Option<String>,
    /// Target audience.
    #[serde(default)]
    pub audience: Option<String>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response body for `POST /api/listing`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    /// Listing title.
    pub title: String,
    /// Listing subtitle.
    pub subtitle: String,
    /// Sales description.
    pub description: String,
    /// Exactly seven search keywords, per the KDP form.
    pub keywords: Vec<String>,
    /// Suggested browse categories.
    pub categories: Vec<String>,
}

fn prompt(req: &ListingRequest) -> Prompt {
    let mut text = format!(
        "Write Amazon KDP listing metadata for the manga \"{title}\". \
         Synopsis: {synopsis}",
        title = req.title,
        synopsis = req.synopsis,
    );
    if let Some(genre) = req.genre.as_deref() {
        text.push_str(&format!(" Genre: {genre}."));
    }
    if let Some(audience) = req.audience.as_deref() {
        text.push_str(&format!(" Target audience: {audience}."));
    }
    text.push_str(
        " Return a listing title, subtitle, sales description, exactly seven \
         search keywords, and suggested browse categories.",
    );
    Prompt::text(text).with_system(
        "You are a self-publishing consultant. Optimize for search without \
         keyword stuffing.",
    )
}

fn schema() -> ResponseSchema {
    SchemaBuilder::object()
        .string("title", "Listing title")
        .string("subtitle", "Listing subtitle")
        .string("description", "Sales description")
        .array_of_strings("keywords", "Exactly seven search keywords")
        .array_of_strings("categories", "Suggested browse categories")
        .require([
            "title",
            "subtitle",
            "description",
            "keywords",
            "categories",
        ])
        .build()
}

/// `POST /api/listing`
pub async fn generate(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<ListingRequest>,
) -> Result<Json<ListingResponse>, ApiError> {
    if req.title.trim().is_empty() || req.synopsis.trim().is_empty() {
        return Err(ApiError::bad_request("title and synopsis must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, prompt(&req))
        .settings(GenerationSettings::new().temperature(0.7))
        .options(RequestOptions::json(schema()))
        .models(engine.config().text_models.clone())
        .backoff(BackoffPolicy::new().max_attempts(RETRY_BUDGET))
        .api_key(req.api_key.clone());
    let mut response: ListingResponse = engine.run_json(spec).await?;
    response.keywords.truncate(KEYWORD_COUNT);
    Ok(Json(response))
}
