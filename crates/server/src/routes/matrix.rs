use axum::Json;
use serde::Deserialize;
use sibyl_core::matrix::{self, MatrixAnalysis};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MatrixRoleRequest {
    pub name: String,
    pub birth_date: String,
}

/// POST /matrix-role — deterministic numerology, no model call.
pub async fn matrix_role(
    Json(req): Json<MatrixRoleRequest>,
) -> Result<Json<MatrixAnalysis>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if req.birth_date.trim().is_empty() {
        return Err(ApiError::bad_request("birth_date is required"));
    }
    Ok(Json(matrix::analyze(&req.name, &req.birth_date)))
}
