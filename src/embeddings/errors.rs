// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for embedding providers and the model lifecycle

use thiserror::Error;

/// Errors raised while loading or running an embedding provider
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// A required model artifact is missing from the cache directory
    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(String),

    /// Provider construction failed (ONNX session, tokenizer, ...)
    #[error("Failed to load model {model}: {reason}")]
    ModelLoadFailed { model: String, reason: String },

    #[error("Tokenization failed: {0}")]
    TokenizationFailed(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// Provider produced a vector whose length differs from the configured dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Provider returned a different number of vectors than inputs
    #[error("Batch size mismatch: sent {expected} texts, got {actual} vectors")]
    BatchMismatch { expected: usize, actual: usize },

    /// A lock guarding provider state was poisoned by a panicking thread
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<ort::Error> for EmbeddingError {
    fn from(err: ort::Error) -> Self {
        EmbeddingError::InferenceFailed(err.to_string())
    }
}
