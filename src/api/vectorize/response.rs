// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Response bodies for the vectorize endpoints

use serde::{Deserialize, Serialize};

const STATUS_SUCCESS: &str = "success";

/// Response body for POST /vectorize
///
/// # Example
/// ```json
/// { "status": "success", "vector": [0.1, 0.2, ...], "dimension": 384 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorResponse {
    pub status: String,
    pub vector: Vec<f32>,
    pub dimension: usize,
}

impl VectorResponse {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            dimension: vector.len(),
            vector,
        }
    }
}

/// Response body for POST /vectorize/batch
///
/// `vectors[i]` is the embedding of `texts[i]` from the request.
///
/// # Example
/// ```json
/// { "status": "success", "vectors": [[...], [...]], "count": 2, "dimension": 384 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchVectorResponse {
    pub status: String,
    pub vectors: Vec<Vec<f32>>,
    pub count: usize,
    pub dimension: usize,
}

impl BatchVectorResponse {
    pub fn new(vectors: Vec<Vec<f32>>, dimension: usize) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            count: vectors.len(),
            vectors,
            dimension,
        }
    }
}
