//! Panel layout: a two-step director then artist call chain.
//!
//! The director call plans pages and panels from the episode script. The
//! artist call then turns every planned panel into an image-generation
//! prompt. Two sequential generation calls, nothing more.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use inkforge_core::{GenerationSettings, Prompt};
use inkforge_gemini::RequestOptions;
use inkforge_output::{ResponseSchema, SchemaBuilder};

use crate::engine::{Engine, TaskSpec};
use crate::error::ApiError;

const FEATURE: &str = "panels";
const DEFAULT_PAGES: u32 = 8;

/// Request body for `POST /api/panels`.
#[derive(Debug, Deserialize)]
pub struct PanelsRequest {
    /// The episode script to lay out.
    pub script: String,
    /// Target page count.
    #[serde(default)]
    pub pages: Option<u32>,
    /// Art style notes passed to the artist step.
    #[serde(default)]
    pub style: Option<String>,
    /// Optional API key override.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// One planned panel within a page.
#[derive(Debug, Serialize, Deserialize)]
pub struct PanelBeat {
    /// Panel number within the page, starting at 1.
    pub panel: u32,
    /// What happens in the panel.
    pub description: String,
    /// Camera note (close-up, wide, dutch angle, ...).
    pub camera: String,
    /// Dialogue or caption text, empty when silent.
    pub dialogue: String,
}

/// One planned page.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page number, starting at 1.
    pub page: u32,
    /// Panels on the page, in reading order.
    pub panels: Vec<PanelBeat>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DirectorPlan {
    pages: Vec<PageLayout>,
}

/// An image-generation prompt for one panel.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtPrompt {
    /// Page number the panel belongs to.
    pub page: u32,
    /// Panel number within the page.
    pub panel: u32,
    /// Self-contained image-generation prompt.
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ArtistPass {
    prompts: Vec<ArtPrompt>,
}

/// Response body for `POST /api/panels`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PanelsResponse {
    /// The director's page plan.
    pub pages: Vec<PageLayout>,
    /// One image prompt per planned panel.
    pub art_prompts: Vec<ArtPrompt>,
}

fn director_prompt(req: &PanelsRequest) -> Prompt {
    let pages = req.pages.unwrap_or(DEFAULT_PAGES);
    Prompt::text(format!(
        "Break this manga episode script into {pages} pages of panels. \
         For every panel give what happens, a camera note, and any dialogue \
         or caption. Script:\n{script}",
        script = req.script,
    ))
    .with_system(
        "You are a manga director. Pace the pages so every page turn lands \
         on a beat.",
    )
}

fn director_schema() -> ResponseSchema {
    let panel = SchemaBuilder::object()
        .integer("panel", "Panel number within the page, starting at 1")
        .string("description", "What happens in the panel")
        .string("camera", "Camera note")
        .string("dialogue", "Dialogue or caption text, empty when silent")
        .require(["panel", "description", "camera", "dialogue"])
        .build();
    let page = SchemaBuilder::object()
        .integer("page", "Page number, starting at 1")
        .array_of("panels", "Panels in reading order", panel)
        .require(["page", "panels"])
        .build();
    SchemaBuilder::object()
        .array_of("pages", "The planned pages, in order", page)
        .require(["pages"])
        .build()
}

fn artist_prompt(plan: &DirectorPlan, style: Option<&str>) -> Result<Prompt, ApiError> {
    let plan_json = serde_json::to_string(plan)
        .map_err(|e| ApiError::bad_gateway(format!("unserializable panel plan: {e}")))?;
    let style = style.unwrap_or("clean black-and-white manga line art");
    Ok(Prompt::text(format!(
        "Turn every panel in this page plan into a self-contained \
         image-generation prompt in the style of {style}. Carry character \
         and setting continuity across panels. Page plan:\n{plan_json}",
    ))
    .with_system(
        "You are a manga artist writing prompts for an image model. Each \
         prompt must stand alone.",
    ))
}

fn artist_schema() -> ResponseSchema {
    let art = SchemaBuilder::object()
        .integer("page", "Page number the panel belongs to")
        .integer("panel", "Panel number within the page")
        .string("prompt", "Self-contained image-generation prompt")
        .require(["page", "panel", "prompt"])
        .build();
    SchemaBuilder::object()
        .array_of("prompts", "One prompt per planned panel", art)
        .require(["prompts"])
        .build()
}

/// `POST /api/panels`
pub async fn generate(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<PanelsRequest>,
) -> Result<Json<PanelsResponse>, ApiError> {
    if req.script.trim().is_empty() {
        return Err(ApiError::bad_request("script must not be empty"));
    }

    let director_spec = TaskSpec::new(FEATURE, director_prompt(&req))
        .settings(GenerationSettings::new().temperature(0.8))
        .options(RequestOptions::json(director_schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let plan: DirectorPlan = engine.run_json(director_spec).await?;

    let artist_spec = TaskSpec::new(FEATURE, artist_prompt(&plan, req.style.as_deref())?)
        .settings(GenerationSettings::new().temperature(0.8))
        .options(RequestOptions::json(artist_schema()))
        .models(engine.config().text_models.clone())
        .api_key(req.api_key.clone());
    let pass: ArtistPass = engine.run_json(artist_spec).await?;

    Ok(Json(PanelsResponse {
        pages: plan.pages,
        art_prompts: pass.prompts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> DirectorPlan {
        DirectorPlan {
            pages: vec![PageLayout {
                page: 1,
                panels: vec![PanelBeat {
                    panel: 1,
                    description: "Kenji kneads dough at dawn".into(),
                    camera: "wide".into(),
                    dialogue: String::new(),
                }],
            }],
        }
    }

    #[test]
    fn director_prompt_embeds_script_and_page_count() {
        let req = PanelsRequest {
            script: "INT. BAKERY - DAWN".into(),
            pages: Some(12),
            style: None,
            api_key: None,
        };
        let text = director_prompt(&req).text_content();
        assert!(text.contains("12 pages"));
        assert!(text.contains("INT. BAKERY - DAWN"));
    }

    #[test]
    fn artist_prompt_embeds_plan_and_style() {
        let prompt =
            artist_prompt(&sample_plan(), Some("watercolor")).expect("serializable plan");
        let text = prompt.text_content();
        assert!(text.contains("watercolor"));
        assert!(text.contains("Kenji kneads dough at dawn"));
    }

    #[test]
    fn schemas_use_integer_panel_numbers() {
        let value = director_schema().to_value().clone();
        let panel =
            &value["properties"]["pages"]["items"]["properties"]["panels"]["items"];
        assert_eq!(panel["properties"]["panel"]["type"], "INTEGER");

        let value = artist_schema().to_value().clone();
        assert_eq!(
            value["properties"]["prompts"]["items"]["properties"]["page"]["type"],
            "INTEGER"
        );
    }
}
