use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

/// GET /health — liveness probe, no auth.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        module: "sibyl-server".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}
