use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;
use sibyl_core::identity::Plan;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PremiumStatus {
    pub is_premium: bool,
    pub plan: &'static str,
}

/// GET /premium/status — plan stub resolved by the identity provider.
/// Anonymous callers are simply free-plan; never an error.
pub async fn premium_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<PremiumStatus> {
    let user_id = headers
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok());
    let token = headers
        .get("X-Sibyl-Token")
        .and_then(|v| v.to_str().ok());

    let identity = state.identity.identify(user_id, token);
    Json(PremiumStatus {
        is_premium: identity.plan == Plan::Premium,
        plan: identity.plan.as_str(),
    })
}
