// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::embeddings::PipelineError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error body returned by every failing endpoint: `{"error": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// Body could not be decoded into the expected request shape
    InvalidRequest(String),
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::InvalidRequest(msg) | ApiError::NotFound(msg) | ApiError::InternalError(msg) => {
                msg.clone()
            }
        };

        ErrorResponse { error }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 422,
            ApiError::NotFound(_) => 404,
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EncodeFailure(msg) => ApiError::InternalError(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.to_response())).into_response()
    }
}
