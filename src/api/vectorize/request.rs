// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request bodies for the vectorize endpoints
//!
//! Only structural checks live here. Content checks (empty or whitespace
//! text) belong to the Embedding Service so they run after the readiness
//! check.

use crate::api::ApiError;
use crate::service::validate_batch_size;
use serde::{Deserialize, Serialize};

/// Request body for POST /vectorize
///
/// # Example
/// ```json
/// { "text": "Kos nyaman dekat kampus" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizeRequest {
    /// Text to vectorize
    pub text: String,
}

/// Request body for POST /vectorize/batch
///
/// # Example
/// ```json
/// { "texts": ["Kos nyaman dekat kampus", "Rumah kost murah di Jakarta Selatan"] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchVectorizeRequest {
    /// Texts to vectorize (1..=max_batch_size items)
    pub texts: Vec<String>,
}

impl BatchVectorizeRequest {
    /// Rejects batches with zero items or more than `max_batch_size`
    pub fn validate(&self, max_batch_size: usize) -> Result<(), ApiError> {
        validate_batch_size(self.texts.len(), max_batch_size).map_err(|e| {
            ApiError::ValidationError {
                field: e.field(),
                message: e.to_string(),
            }
        })
    }
}
