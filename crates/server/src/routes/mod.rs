mod ask;
mod cities;
mod health;
mod matrix;
mod premium;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router. Origin allow-lists are deployment config,
/// so CORS stays permissive here.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(ask::ask))
        .route("/health", get(health::health_check))
        .route("/cities/:plate", get(cities::city_journey))
        .route("/matrix-role", post(matrix::matrix_role))
        .route("/premium/status", get(premium::premium_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
