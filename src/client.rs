// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP client for a running embed node
//!
//! Used by the `embed-probe` binary to smoke-test a deployment.

use crate::api::{EmbedRequest, EmbedResponse, ErrorResponse};
use anyhow::{anyhow, Context, Result};
use std::time::Duration;

pub const DEFAULT_EMBED_URL: &str = "http://localhost:8088/embed";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct EmbedClient {
    http: reqwest::Client,
    url: String,
}

impl EmbedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts `texts` with normalization on and returns `(dims, vectors)`
    ///
    /// `dims` is taken from the first returned vector, 0 when none came back.
    pub async fn embed(&self, texts: &[&str], is_query: bool) -> Result<(usize, Vec<Vec<f64>>)> {
        let request = EmbedRequest::from_texts(texts.iter().copied())
            .with_normalize(true)
            .with_is_query(is_query);

        let response = self.send(&request).await?;

        let dims = response.vectors.first().map(Vec::len).unwrap_or(0);
        Ok((dims, response.vectors))
    }

    /// Posts a full request and decodes the success body
    pub async fn send(&self, request: &EmbedRequest) -> Result<EmbedResponse> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|body| body.error)
                .unwrap_or_else(|_| "no error body".to_string());
            return Err(anyhow!("{} returned {}: {}", self.url, status, message));
        }

        response
            .json::<EmbedResponse>()
            .await
            .context("Failed to decode embed response")
    }
}

/// Euclidean norm
pub fn l2_norm(vector: &[f64]) -> f64 {
    crate::embeddings::l2_norm(vector)
}

/// Dot product over the common prefix of two vectors
///
/// For unit vectors this is the cosine similarity.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Rounds to 6 decimal places for display
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
