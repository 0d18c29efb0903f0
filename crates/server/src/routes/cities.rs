use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use sibyl_core::journey;
use sibyl_core::types::{Lang, ModuleOutput};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JourneyQuery {
    pub lang: Option<String>,
}

/// GET /cities/{plate} — static journey, no model call.
pub async fn city_journey(
    State(state): State<AppState>,
    Path(plate): Path<String>,
    Query(query): Query<JourneyQuery>,
) -> Json<ModuleOutput> {
    let lang = query
        .lang
        .as_deref()
        .and_then(Lang::parse)
        .unwrap_or(state.cfg.default_lang);
    Json(journey::build_city_journey(&plate, lang))
}
