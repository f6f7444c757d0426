//! Worldbuilding detail for a premise.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "worldbuilding";

/// Request body for `POST /api/worldbuilding`.
#[derive(Debug, Deserialize)]
pub struct WorldbuildingRequest {
    /// Story premise to build a world around.
    pub premise: String,
    /// Genre, if already decided.
    #[serde(default)]
    pub genre: Option<String>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// A faction or power bloc in the world.
#[derive(Debug, Serialize, Deserialize)]
pub struct Faction {
    /// Faction name.
    pub name: String,
    /// What the faction wants.
    pub agenda: String,
}

/// A glossary entry for an invented term.
#[derive(Debug, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// The invented term.
    pub term: String,
    /// What it means in-world.
    pub meaning: String,
}

/// Response body for `POST /api/worldbuilding`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorldbuildingResponse {
    /// Description of the setting.
    pub setting: String,
    /// Major factions.
    pub factions: Vec<Faction>,
    /// Hard rules of the world (magic systems, taboos, physics).
    pub rules: Vec<String>,
    /// Invented vocabulary.
    pub glossary: Vec<GlossaryEntry>,
}

fn prompt(req: &WorldbuildingRequest) -> Prompt {
    let mut text = format!(
        "Build the world for this manga premise: {premise}.",
        premise = req.premise
    );
    if let Some(genre) = req.genre.as_deref() {
        text.push_str(&format!(" The genre is {genre}."));
    }
    text.push_str(
        " Describe the setting, the major factions and their agendas, \
         the hard rules of the world, and a glossary of invented terms.",
    );
    Prompt::text(text).with_system(
        "You are a worldbuilding consultant for serialized manga. \
         Keep every detail consistent with the premise.",
    )
}

fn schema() -> ResponseSchema {
    let faction = SchemaBuilder::object()
        .string("name", "Faction name")
        .string("agenda", "What the faction wants")
        .require(["name", "agenda"])
        .build();
    let entry = SchemaBuilder::object()
        .string("term", "The invented term")
        .string("meaning", "What it means in-world")
        .require(["term", "meaning"])
        .build();
    SchemaBuilder::object()
        .string("setting", "Description of the setting")
        .array_of("factions", "Major factions", faction)
        .array_of_strings("rules", "Hard rules of the world")
        .array_of("glossary", "Invented vocabulary", entry)
        .require(["setting", "factions", "rules", "glossary"])
        .build()
}

/// `POST /api/worldbuilding`
pub async fn generate(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<WorldbuildingRequest>,
) -> Result<Json<WorldbuildingResponse>, ApiError> {
    if req.premise.trim().is_empty() {
        return Err(ApiError::bad_request("premise must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, prompt(&req))
        .settings(GenerationSettings::new().temperature(1.0))
        .options(RequestOptions::json(schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let response: WorldbuildingResponse = engine.run_json(spec).await?;
    Ok(Json(response))
}
