// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedClient against a live server on an ephemeral port

use crate::common::{app_with, EchoEncoder, FailingEncoder};
use fabstir_embed_node::api::serve_with_shutdown;
use fabstir_embed_node::client::{dot, l2_norm, EmbedClient};
use fabstir_embed_node::embeddings::Encoder;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Starts the service and returns its embed URL plus a shutdown trigger
async fn spawn_server(encoder: Arc<dyn Encoder>) -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(serve_with_shutdown(listener, app_with(encoder), async move {
        let _ = rx.await;
    }));

    (format!("http://{}/embed", addr), tx)
}

#[tokio::test]
async fn test_client_query_and_corpus() {
    let (url, shutdown) = spawn_server(Arc::new(EchoEncoder { dims: 8 })).await;
    let client = EmbedClient::new(url, Duration::from_secs(5)).unwrap();

    let (q_dims, q_vectors) = client.embed(&["向量检索测试"], true).await.unwrap();
    let (c_dims, c_vectors) = client
        .embed(&["这是一个用于检索的文档内容示例"], false)
        .await
        .unwrap();

    assert_eq!(q_dims, 8);
    assert_eq!(c_dims, 8);
    assert!((l2_norm(&q_vectors[0]) - 1.0).abs() < 1e-6);
    assert!((l2_norm(&c_vectors[0]) - 1.0).abs() < 1e-6);

    let cosine = dot(&q_vectors[0], &c_vectors[0]);
    assert!(cosine > 0.0 && cosine <= 1.0 + 1e-9);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_client_empty_batch() {
    let (url, shutdown) = spawn_server(Arc::new(EchoEncoder { dims: 8 })).await;
    let client = EmbedClient::new(url, Duration::from_secs(5)).unwrap();

    let (dims, vectors) = client.embed(&[" ", ""], true).await.unwrap();
    assert_eq!(dims, 0);
    assert!(vectors.is_empty());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_client_surfaces_server_error() {
    let (url, shutdown) = spawn_server(Arc::new(FailingEncoder {
        message: "model crashed".to_string(),
    }))
    .await;
    let client = EmbedClient::new(url, Duration::from_secs(5)).unwrap();

    let err = client.embed(&["hello"], true).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("500"), "{}", message);
    assert!(message.contains("model crashed"), "{}", message);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_client_unreachable_server() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        EmbedClient::new(format!("http://{}/embed", addr), Duration::from_secs(2)).unwrap();
    assert!(client.embed(&["hello"], true).await.is_err());
}
