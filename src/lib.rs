// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;
pub mod service;
pub mod version;

pub use api::{create_app, start_server, AppState};
pub use config::{EmbeddingBackend, ServiceConfig};
pub use embeddings::{
    build_provider, EmbeddingError, EmbeddingModelManager, EmbeddingProvider, ModelGuard,
    ServiceState,
};
pub use service::{EmbeddingService, HealthStatus, ServiceError, ValidationError};
