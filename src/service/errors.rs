// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use super::validator::ValidationError;
use thiserror::Error;

/// Typed outcome of a failed Embedding Service call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Model still loading, failed to load, or already unloaded
    #[error("{0}")]
    Unavailable(String),

    /// Malformed input; the caller must fix the request
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Encode failed; message is descriptive but carries no internal types
    #[error("{0}")]
    Internal(String),
}
