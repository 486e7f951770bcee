// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model lifecycle tests
//!
//! Verifies that EmbeddingModelManager:
//! - Starts uninitialized and reports not-ready
//! - Fails the load (Failed state, no provider) when artifacts are missing
//! - Serves concurrent requests once ready
//! - Unloads through ModelGuard on scope exit

use kosera_ai_service::{
    build_provider, EmbeddingBackend, EmbeddingError, EmbeddingModelManager, EmbeddingService,
    ModelGuard, ServiceConfig, ServiceError, ServiceState,
};
use std::sync::Arc;

fn config(backend: EmbeddingBackend) -> ServiceConfig {
    ServiceConfig {
        backend,
        ..ServiceConfig::default()
    }
}

#[test]
fn test_missing_onnx_artifacts_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        cache_dir: dir.path().to_path_buf(),
        ..config(EmbeddingBackend::Onnx)
    };
    let manager = EmbeddingModelManager::new(config.model_id.clone(), config.dimension);

    let result = manager.load(|| build_provider(&config));

    assert!(matches!(result, Err(EmbeddingError::ArtifactNotFound(_))));
    assert_eq!(manager.state(), ServiceState::Failed);
    assert!(manager.provider().is_none());
}

#[test]
fn test_configured_dimension_must_match_provider() {
    let provider_config = ServiceConfig {
        dimension: 768,
        ..config(EmbeddingBackend::Hash)
    };
    let manager = EmbeddingModelManager::new(provider_config.model_id.clone(), 384);

    let result = manager.load(|| build_provider(&provider_config));

    assert!(matches!(
        result,
        Err(EmbeddingError::DimensionMismatch {
            expected: 384,
            actual: 768
        })
    ));
    assert!(!manager.is_ready());
}

#[tokio::test]
async fn test_concurrent_requests_share_provider() {
    let config = config(EmbeddingBackend::Hash);
    let manager = Arc::new(EmbeddingModelManager::new(
        config.model_id.clone(),
        config.dimension,
    ));
    manager.load(|| build_provider(&config)).unwrap();
    let service = Arc::new(EmbeddingService::new(manager, config.max_batch_size));

    let mut handles = Vec::new();
    for i in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.vectorize(&format!("concurrent text {}", i)).await
        }));
    }

    for handle in handles {
        let vector = handle.await.unwrap().unwrap();
        assert_eq!(vector.len(), 384);
    }
}

#[tokio::test]
async fn test_guard_unloads_and_requests_become_unavailable() {
    let config = config(EmbeddingBackend::Hash);
    let manager = Arc::new(EmbeddingModelManager::new(
        config.model_id.clone(),
        config.dimension,
    ));
    let service = EmbeddingService::new(manager.clone(), config.max_batch_size);

    {
        let _guard = ModelGuard::new(manager.clone());
        manager.load(|| build_provider(&config)).unwrap();
        assert!(service.vectorize("halo").await.is_ok());
    }

    assert_eq!(manager.state(), ServiceState::Uninitialized);
    assert!(matches!(
        service.vectorize("halo").await,
        Err(ServiceError::Unavailable(_))
    ));
}
