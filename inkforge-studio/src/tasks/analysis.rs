//! Scenario analysis of a manuscript, optionally with page images.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "analysis";

/// A page image attached to the manuscript.
#[derive(Debug, Deserialize)]
pub struct InlinePage {
    /// MIME type of the image, e.g. `image/png`.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
}

/// Request body for `POST /api/analysis`.
#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    /// The manuscript text to analyze.
    pub manuscript: String,
    /// Drawn pages to analyze alongside the text.
    #[serde(default)]
    pub pages: Vec<InlinePage>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Response body for `POST /api/analysis`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    /// What the manuscript does well.
    pub strengths: Vec<String>,
    /// Where it falls short.
    pub weaknesses: Vec<String>,
    /// Assessment of the pacing.
    pub pacing: String,
    /// Concrete revision suggestions.
    pub suggestions: Vec<String>,
}

fn prompt(req: &AnalysisRequest) -> Result<Prompt, ApiError> {
    let mut prompt = Prompt::new()
        .with_system(
            "You are a veteran manga editor. Critique honestly; vague praise \
             helps nobody.",
        )
        .with_text(format!(
            "Analyze this manga manuscript. Cover strengths, weaknesses, \
             pacing, and concrete revision suggestions.\n\n{}",
            req.manuscript
        ));
    for (index, page) in req.pages.iter().enumerate() {
        let data = BASE64.decode(page.data_base64.as_bytes()).map_err(|e| {
            ApiError::bad_request(format!("page {} is not valid base64: {e}", index + 1))
        })?;
        prompt = prompt
            .with_text(format!("Drawn page {}:", index + 1))
            .with_image(page.mime_type.clone(), data);
    }
    Ok(prompt)
}

fn schema() -> ResponseSchema {
    SchemaBuilder::object()
        .array_of_strings("strengths", "What the manuscript does well")
        .array_of_strings("weaknesses", "Where it falls short")
        .string("pacing", "Assessment of the pacing")
        .array_of_strings("suggestions", "Concrete revision suggestions")
        .require(["strengths", "weaknesses", "pacing", "suggestions"])
        .build()
}

/// `POST /api/analysis`
pub async fn analyze(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    if req.manuscript.trim().is_empty() {
        return Err(ApiError::bad_request("manuscript must not be empty"));
    }
    let spec = TaskSpec::new(FEATURE, prompt(&req)?)
        .settings(GenerationSettings::new().temperature(0.4))
        .options(RequestOptions::json(schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let response: AnalysisResponse = engine.run_json(spec).await?;
    Ok(Json(response))
}
