//! Market research: topic and genre proposals.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "research";
const DEFAULT_COUNT: u32 = 5;

/// Request body for `POST /api/research/topics`.
#[derive(Debug, Deserialize)]
pub struct TopicsRequest {
    /// Genre to research, e.g. "isekai comedy".
    pub genre: String,
    /// Target audience, e.g. "young adult".
    #[serde(default)]
    pub audience: Option<String>,
    /// How many proposals to return.
    #[serde(default)]
    pub count: Option<u32>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// One proposed topic.
#[derive(Debug, Serialize, Deserialize)]
pub struct Topic {
    /// Working title for the topic.
    pub title: String,
    /// The angle that makes it distinct.
    pub angle: String,
    /// Search keywords a reader would use.
    pub keywords: Vec<String>,
    /// Why this topic fits the genre and audience.
    pub rationale: String,
}

/// Response body for `POST /api/research/topics`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopicsResponse {
    /// Proposed topics, in ranked order.
    pub topics: Vec<Topic>,
}

fn topics_prompt(req: &TopicsRequest) -> Prompt {
    let count = req.count.unwrap_or(DEFAULT_COUNT);
    let audience = req.audience.as_deref().unwrap_or("general readers");
    Prompt::text(format!(
        "Propose {count} manga topic ideas in the \"{genre}\" genre for {audience}. \
         For each topic give a working title, the angle that sets it apart, \
         search keywords readers would use, and a short rationale.",
        genre = req.genre,
    ))
    .with_system(
        "You are a market researcher for a manga publisher. \
         Ground every proposal in current reader demand.",
    )
}

fn topics_schema() -> ResponseSchema {
    let topic = SchemaBuilder::object()
        .string("title", "Working title")
        .string("angle", "What sets this topic apart")
        .array_of_strings("keywords", "Search keywords readers would use")
        .string("rationale", "Why this topic fits the genre and audience")
        .require(["title", "angle", "keywords", "rationale"])
        .build();
    SchemaBuilder::object()
        .array_of("topics", "Proposed topics, ranked", topic)
        .require(["topics"])
        .build()
}

/// `POST /api/research/topics`
pub async fn topics(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<TopicsRequest>,
) -> Result<Json<TopicsResponse>, ApiError> {
    if req.genre.trim().is_empty() {
        return Err(ApiError::bad_request("genre must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, topics_prompt(&req))
        .settings(GenerationSettings::new().temperature(0.9))
        .options(RequestOptions::json(topics_schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let response: TopicsResponse = engine.run_json(spec).await?;
    Ok(Json(response))
}

/// Request body for `POST /api/research/genres`.
#[derive(Debug, Deserialize)]
pub struct GenresRequest {
    /// Topic or premise to match genres against.
    pub topic: String,
    /// How many genres to return.
    #[serde(default)]
    pub count: Option<u32>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// One proposed genre.
#[derive(Debug, Serialize, Deserialize)]
pub struct Genre {
    /// Genre name, e.g. "slice of life".
    pub name: String,
    /// Why the topic works in this genre.
    pub fit: String,
    /// Comparable published titles.
    pub comparables: Vec<String>,
}

/// Response body for `POST /api/research/genres`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenresResponse {
    /// Proposed genres, best fit first.
    pub genres: Vec<Genre>,
}

fn genres_prompt(req: &GenresRequest) -> Prompt {
    let count = req.count.unwrap_or(DEFAULT_COUNT);
    Prompt::text(format!(
        "Suggest {count} genres that would suit this manga topic: {topic}. \
         For each genre explain the fit and name comparable published titles.",
        topic = req.topic,
    ))
    .with_system(
        "You are a market researcher for a manga publisher. \
         Ground every proposal in current reader demand.",
    )
}

fn genres_schema() -> ResponseSchema {
    let genre = SchemaBuilder::object()
        .string("name", "Genre name")
        .string("fit", "Why the topic works in this genre")
        .array_of_strings("comparables", "Comparable published titles")
        .require(["name", "fit", "comparables"])
        .build();
    SchemaBuilder::object()
        .array_of("genres", "Proposed genres, best fit first", genre)
        .require(["genres"])
        .build()
}

/// `POST /api/research/genres`
pub async fn genres(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<GenresRequest>,
) -> Result<Json<GenresResponse>, ApiError> {
    if req.topic.trim().is_empty() {
        return Err(ApiError::bad_request("topic must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, genres_prompt(&req))
        .settings(GenerationSettings::new().temperature(0.9))
        .options(RequestOptions::json(genres_schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let response: GenresResponse = engine.run_json(spec).await?;
    Ok(Json(response))
}
