// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::warn;

/// POST /embed handler
///
/// Runs the request through the embedding pipeline.
///
/// # Responses
/// - 200 `{"vectors": [[...]], "dims": N}` (also for empty/filtered input)
/// - 422 `{"error": "..."}` when the body is not a valid embed request
/// - 500 `{"error": "..."}` when the encoder fails
pub async fn embed_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected embed request body: {}", rejection.body_text());
        ApiError::InvalidRequest(rejection.body_text())
    })?;

    let response = state.pipeline.embed(&request).await?;

    Ok(Json(response))
}
