// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP tests for POST /embed
//!
//! Every request runs through the full router (timeout, tracing and CORS
//! layers included) against substitute encoders.

use crate::common::{app_with, app_with_timeout, FailingEncoder, FixedEncoder, SlowEncoder};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fabstir_embed_node::embeddings::EncodeMode;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

async fn post_raw(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/embed")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, &body.to_string()).await
}

#[tokio::test]
async fn test_embed_hello_query() {
    let encoder = Arc::new(FixedEncoder::new(vec![vec![3.0, 4.0]], vec![]));
    let app = app_with(encoder.clone());

    let (status, body) = post_json(
        app,
        json!({"texts": ["hello"], "normalize": true, "is_query": true}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dims"], 2);
    let vector = body["vectors"][0].as_array().unwrap();
    assert!((vector[0].as_f64().unwrap() - 0.6).abs() < 1e-6);
    assert!((vector[1].as_f64().unwrap() - 0.8).abs() < 1e-6);
    assert_eq!(encoder.calls()[0].1, EncodeMode::Query);
}

#[tokio::test]
async fn test_embed_corpus_without_normalize() {
    let encoder = Arc::new(FixedEncoder::new(vec![], vec![vec![1.0, 2.0], vec![3.0, 4.0]]));
    let app = app_with(encoder.clone());

    let (status, body) = post_json(
        app,
        json!({"texts": ["a", "b"], "normalize": false, "is_query": false}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"vectors": [[1.0, 2.0], [3.0, 4.0]], "dims": 2}));
    assert_eq!(encoder.calls()[0].1, EncodeMode::Corpus);
}

#[tokio::test]
async fn test_embed_defaults_to_normalized_query() {
    let encoder = Arc::new(FixedEncoder::new(vec![vec![0.0, 5.0]], vec![]));
    let app = app_with(encoder.clone());

    let (status, body) = post_json(app, json!({"texts": ["hello"]})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"vectors": [[0.0, 1.0]], "dims": 2}));
    assert_eq!(encoder.calls()[0].1, EncodeMode::Query);
}

#[tokio::test]
async fn test_embed_camel_case_is_query_alias() {
    let encoder = Arc::new(FixedEncoder::new(vec![], vec![vec![1.0]]));
    let app = app_with(encoder.clone());

    let (status, _) = post_json(app, json!({"texts": ["doc"], "isQuery": false})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(encoder.calls()[0].1, EncodeMode::Corpus);
}

#[tokio::test]
async fn test_embed_empty_texts() {
    let encoder = Arc::new(FixedEncoder::new(vec![vec![1.0]], vec![]));
    let app = app_with(encoder.clone());

    let (status, body) = post_json(app, json!({"texts": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"vectors": [], "dims": 0}));
    assert!(encoder.calls().is_empty());
}

#[tokio::test]
async fn test_embed_all_malformed_texts() {
    let encoder = Arc::new(FixedEncoder::new(vec![vec![1.0]], vec![]));
    let app = app_with(encoder.clone());

    let (status, body) = post_json(app, json!({"texts": ["   ", 123]})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"vectors": [], "dims": 0}));
    assert!(encoder.calls().is_empty());
}

#[tokio::test]
async fn test_embed_encoder_failure_is_500() {
    let app = app_with(Arc::new(FailingEncoder {
        message: "CUDA out of memory".to_string(),
    }));

    let (status, body) = post_json(app, json!({"texts": ["hello"]})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "CUDA out of memory"}));
    assert!(body.get("vectors").is_none());
}

#[tokio::test]
async fn test_embed_blank_encoder_error_still_has_message() {
    let app = app_with(Arc::new(FailingEncoder {
        message: String::new(),
    }));

    let (status, body) = post_json(app, json!({"texts": ["hello"], "is_query": true})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = body["error"].as_str().unwrap();
    assert!(!error.trim().is_empty());
    assert!(error.contains("query"));
}

#[tokio::test]
async fn test_embed_missing_texts_is_422() {
    let app = app_with(Arc::new(FixedEncoder::default()));

    let (status, body) = post_json(app, json!({"normalize": true})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_embed_invalid_json_is_422() {
    let app = app_with(Arc::new(FixedEncoder::default()));

    let (status, body) = post_raw(app, "{\"texts\": [").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_embed_wrong_flag_type_is_422() {
    let app = app_with(Arc::new(FixedEncoder::default()));

    let (status, body) = post_json(app, json!({"texts": ["a"], "normalize": "yes"})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_404_json() {
    let app = app_with(Arc::new(FixedEncoder::default()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/embeddings")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().contains("/v1/embeddings"));
}

#[tokio::test]
async fn test_slow_encoder_hits_request_timeout() {
    let app = app_with_timeout(
        Arc::new(SlowEncoder {
            delay: Duration::from_secs(5),
        }),
        Duration::from_millis(50),
    );

    let (status, _) = post_json(app, json!({"texts": ["hello"]})).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}
