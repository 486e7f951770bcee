// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vectorize HTTP handlers
//!
//! Thin translation between JSON bodies and [`EmbeddingService`] calls.
//! Status codes come from [`ApiError`]:
//! - 400: unparseable body, batch size out of bounds, empty text/item
//! - 503: model not loaded
//! - 500: encode failure
//!
//! [`EmbeddingService`]: crate::service::EmbeddingService

use crate::api::http_server::AppState;
use crate::api::vectorize::{
    BatchVectorResponse, BatchVectorizeRequest, VectorResponse, VectorizeRequest,
};
use crate::api::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use tracing::{info, warn};

/// POST /vectorize handler
///
/// # Request Body
/// ```json
/// { "text": "Kos nyaman dekat kampus" }
/// ```
///
/// # Response Body
/// ```json
/// { "status": "success", "vector": [0.1, ...], "dimension": 384 }
/// ```
pub async fn vectorize_handler(
    State(state): State<AppState>,
    payload: Result<Json<VectorizeRequest>, JsonRejection>,
) -> Result<Json<VectorResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let vector = state
        .service
        .vectorize(&request.text)
        .await
        .map_err(|e| {
            warn!("Vectorize request failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(VectorResponse::new(vector)))
}

/// POST /vectorize/batch handler
///
/// All items must be non-empty: a single empty item rejects the whole
/// request (reporting its index) so `vectors[i]` always matches `texts[i]`.
///
/// # Request Body
/// ```json
/// { "texts": ["text1", "text2"] }
/// ```
///
/// # Response Body
/// ```json
/// { "status": "success", "vectors": [[...], [...]], "count": 2, "dimension": 384 }
/// ```
pub async fn vectorize_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchVectorizeRequest>, JsonRejection>,
) -> Result<Json<BatchVectorResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    request.validate(state.service.max_batch_size())?;

    let vectors = state
        .service
        .vectorize_batch(&request.texts)
        .await
        .map_err(|e| {
            warn!("Batch vectorize request failed: {}", e);
            ApiError::from(e)
        })?;

    info!("Vectorized batch of {} texts", vectors.len());

    Ok(Json(BatchVectorResponse::new(
        vectors,
        state.service.dimension(),
    )))
}
