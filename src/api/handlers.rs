// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::http_server::AppState;
use crate::api::ApiError;
use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub dimension: usize,
    pub ready: bool,
}

/// GET / and GET /health
///
/// 200 once the model is loaded, 503 before that.
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let health = state.service.health()?;

    Ok(Json(HealthResponse {
        status: "AI Service is running".to_string(),
        model: health.model_id,
        dimension: health.dimension,
        ready: health.ready,
    }))
}
