use axum::Json;
use axum::extract::State;
use serde::Serialize;
use sibyl_core::types::{AskRequest, Section};

use crate::error::ApiError;
use crate::state::AppState;

/// Response body. `response` duplicates `answer` for older clients that
/// predate the structured fields.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
    pub session_id: String,
    pub module: String,
    pub title: String,
    pub answer: String,
    pub sections: Vec<Section>,
    pub tags: Vec<String>,
}

/// POST /ask
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let outcome = state.orchestrator.ask(req).await?;
    let output = outcome.output;
    Ok(Json(AskResponse {
        response: output.answer.clone(),
        session_id: outcome.session_id,
        module: output.module,
        title: output.title,
        answer: output.answer,
        sections: output.sections,
        tags: output.tags,
    }))
}
