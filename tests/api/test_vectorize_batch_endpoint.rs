// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /vectorize/batch tests
//!
//! Covers the index-alignment contract: either every text gets a vector
//! at the same position, or the whole request fails.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kosera_ai_service::{
    build_provider, create_app, AppState, EmbeddingBackend, EmbeddingModelManager,
    EmbeddingService, ServiceConfig,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

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
    create_app(AppState::new(EmbeddingService::new(
        manager,
        config.max_batch_size,
    )))
}

async fn post(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_batch_success_count_and_dimension() {
    let (status, body) = post(
        ready_app(),
        "/vectorize/batch",
        json!({"texts": ["a", "b", "c"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 3);
    assert_eq!(body["dimension"], 384);

    let vectors = body["vectors"].as_array().unwrap();
    assert_eq!(vectors.len(), 3);
    for vector in vectors {
        assert_eq!(vector.as_array().unwrap().len(), 384);
    }
}

#[tokio::test]
async fn test_batch_vectors_align_with_single_vectorize() {
    let app = ready_app();
    let texts = ["Kos nyaman dekat kampus", "  Rumah kost murah ", "WiFi dan AC"];

    let (status, batch) = post(app.clone(), "/vectorize/batch", json!({ "texts": texts })).await;
    assert_eq!(status, StatusCode::OK);

    for (i, text) in texts.iter().enumerate() {
        let (status, single) = post(app.clone(), "/vectorize", json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            batch["vectors"][i], single["vector"],
            "vectors[{}] must be the embedding of texts[{}]",
            i, i
        );
    }
}

#[tokio::test]
async fn test_batch_empty_item_reports_index() {
    let (status, body) = post(
        ready_app(),
        "/vectorize/batch",
        json!({"texts": ["a", "", "b"]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("index 1"));
    assert_eq!(body["details"]["field"], "texts[1]");
    assert!(body.get("vectors").is_none(), "no partial result");
}

#[tokio::test]
async fn test_batch_reports_first_offending_index() {
    let (status, body) = post(
        ready_app(),
        "/vectorize/batch",
        json!({"texts": ["a", "b", "   ", ""]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("index 2"));
}

#[tokio::test]
async fn test_batch_cardinality_bounds() {
    let (status, body) = post(ready_app(), "/vectorize/batch", json!({"texts": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "texts");

    let too_many: Vec<String> = (0..101).map(|i| format!("text {}", i)).collect();
    let (status, _) = post(ready_app(), "/vectorize/batch", json!({ "texts": too_many })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let max: Vec<String> = (0..100).map(|i| format!("text {}", i)).collect();
    let (status, body) = post(ready_app(), "/vectorize/batch", json!({ "texts": max })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 100);
}

#[tokio::test]
async fn test_batch_before_load_returns_503() {
    let manager = Arc::new(EmbeddingModelManager::new("test-model", 384));
    let app = create_app(AppState::new(EmbeddingService::new(manager, 100)));

    let (status, _) = post(app, "/vectorize/batch", json!({"texts": ["a", ""]})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
