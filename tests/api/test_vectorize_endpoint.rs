// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /vectorize tests
//!
//! Runs the router against the hash-seeded provider, plus a provider that
//! fails on request texts to exercise the 500 path.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kosera_ai_service::embeddings::VERIFICATION_TEXTS;
use kosera_ai_service::{
    build_provider, create_app, AppState, EmbeddingBackend, EmbeddingError,
    EmbeddingModelManager, EmbeddingProvider, EmbeddingService, ServiceConfig,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// Answers load-time verification, fails everything else
struct BrokenProvider;

impl EmbeddingProvider for BrokenProvider {
    fn dimension(&self) -> usize {
        384
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if VERIFICATION_TEXTS.contains(&text) {
            return Ok(vec![0.0; 384]);
        }
        Err(EmbeddingError::InferenceFailed("session crashed".to_string()))
    }

    fn encode_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::InferenceFailed("session crashed".to_string()))
    }
}

fn ready_app() -> Router {
    let config = ServiceConfig {
        backend: EmbeddingBackend::Hash,
        ..ServiceConfig::default()
    };
    let manager = Arc::new(EmbeddingModelManager::new(
        config.model_id.clone(),
        config.dimension,
    ));
    manager
        .load(|| build_provider(&config))
        .expect("hash provider should load");
    create_app(AppState::new(EmbeddingService::new(manager, 100)))
}

fn broken_app() -> Router {
    let manager = Arc::new(EmbeddingModelManager::new("broken-model", 384));
    manager
        .load(|| Ok(Arc::new(BrokenProvider) as Arc<dyn EmbeddingProvider>))
        .expect("broken provider passes verification");
    create_app(AppState::new(EmbeddingService::new(manager, 100)))
}

fn unloaded_app() -> Router {
    let manager = Arc::new(EmbeddingModelManager::new("test-model", 384));
    create_app(AppState::new(EmbeddingService::new(manager, 100)))
}

async fn post(app: Router, body: String) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/vectorize")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_vectorize_returns_384_dimensions() {
    let (status, body) = post(
        ready_app(),
        json!({"text": "Kos nyaman dekat kampus"}).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["dimension"], 384);
    assert_eq!(body["vector"].as_array().unwrap().len(), 384);
}

#[tokio::test]
async fn test_vectorize_empty_text_returns_400() {
    for text in ["", "   ", "\n\t"] {
        let (status, body) = post(ready_app(), json!({ "text": text }).to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "text {:?}", text);
        assert_eq!(body["error_type"], "validation_error");
        assert!(body["message"].as_str().unwrap().contains("empty"));
    }
}

#[tokio::test]
async fn test_vectorize_is_deterministic_and_trims() {
    let (_, first) = post(ready_app(), json!({"text": "Rumah kost murah"}).to_string()).await;
    let (_, second) = post(
        ready_app(),
        json!({"text": "  Rumah kost murah  "}).to_string(),
    )
    .await;

    assert_eq!(first["vector"], second["vector"]);
}

#[tokio::test]
async fn test_vectorize_before_load_returns_503() {
    let (status, body) = post(unloaded_app(), json!({"text": "halo"}).to_string()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Model not loaded");
}

#[tokio::test]
async fn test_readiness_wins_over_validation() {
    let (status, _) = post(unloaded_app(), json!({"text": ""}).to_string()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_provider_failure_returns_500() {
    let (status, body) = post(broken_app(), json!({"text": "halo"}).to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "internal_error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Embedding generation failed"));
}

#[tokio::test]
async fn test_malformed_body_returns_400() {
    let (status, body) = post(ready_app(), r#"{"txt": "typo"}"#.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");

    let (status, _) = post(ready_app(), "not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
