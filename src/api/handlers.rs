// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::ApiError;
use axum::{http::Uri, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// GET /health
///
/// Liveness only: answers `{"status": "ok"}` whether or not the model is
/// usable.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Fallback for unknown routes
pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
