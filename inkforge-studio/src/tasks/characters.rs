//! Character sheet generation.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "characters";
const DEFAULT_COUNT: u32 = 4;

/// Request body for `POST /api/characters`.
#[derive(Debug, Deserialize)]
pub struct CharactersRequest {
    /// Story premise the cast belongs to.
    pub premise: String,
    /// How many characters to generate.
    #[serde(default)]
    pub count: Option<u32>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// One character sheet.
#[derive(Debug, Serialize, Deserialize)]
pub struct CharacterSheet {
    /// Character name.
    pub name: String,
    /// Narrative role (protagonist, rival, mentor, ...).
    pub role: String,
    /// Visual description for the artist.
    pub appearance: String,
    /// Personality in a few sentences.
    pub personality: String,
    /// Backstory relevant to the premise.
    pub backstory: String,
    /// What the character wants.
    pub goal: String,
}

/// Response body for `POST /api/characters`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CharactersResponse {
    /// The generated cast.
    pub characters: Vec<CharacterSheet>,
}

fn prompt(req: &CharactersRequest) -> Prompt {
    let count = req.count.unwrap_or(DEFAULT_COUNT);
    Prompt::text(format!(
        "Create {count} character sheets for this manga premise: {premise}. \
         For each character give a name, narrative role, visual description \
         for the artist, personality, backstory, and goal. \
         Make the cast play off each other.",
        premise = req.premise,
    ))
    .with_system("You are a character designer for serialized manga.")
}

fn schema() -> ResponseSchema {
    let sheet = SchemaBuilder::object()
        .string("name", "Character name")
        .string("role", "Narrative role")
        .string("appearance", "Visual description for the artist")
        .string("personality", "Personality in a few sentences")
        .string("backstory", "Backstory relevant to the premise")
        .string("goal", "What the character wants")
        .require([
            "name",
            "role",
            "appearance",
            "personality",
            "backstory",
            "goal",
        ])
        .build();
    SchemaBuilder::object()
        .array_of("characters", "The generated cast", sheet)
        .require(["characters"])
        .build()
}

/// `POST /api/characters`
pub async fn generate(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<CharactersRequest>,
) -> Result<Json<CharactersResponse>, ApiError> {
    if req.premise.trim().is_empty() {
        return Err(ApiError::bad_request("premise must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, prompt(&req))
        .settings(GenerationSettings::new().temperature(1.0))
        .options(RequestOptions::json(schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let response: CharactersResponse = engine.run_json(spec).await?;
    Ok(Json(response))
}
