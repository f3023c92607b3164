// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding pipeline orchestrator
//!
//! Composes sanitize -> encode -> postprocess for one request. Empty input
//! and degenerate encoder output both produce an empty success response;
//! only an encoder failure is reported as an error.

use crate::embeddings::{postprocess, sanitize, EmbedRequest, EmbedResponse, EncodeMode, Encoder};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The encoder signalled a failure; carries its description
    #[error("{0}")]
    EncodeFailure(String),
}

/// Stateless request pipeline around a shared encoder
#[derive(Clone)]
pub struct EmbedPipeline {
    encoder: Arc<dyn Encoder>,
}

impl std::fmt::Debug for EmbedPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedPipeline").finish_non_exhaustive()
    }
}

impl EmbedPipeline {
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self { encoder }
    }

    /// Runs one embed request end to end
    ///
    /// # Returns
    /// - `Ok` with `{vectors: [], dims: 0}` when nothing usable was sent or
    ///   the encoder returned nothing
    /// - `Ok` with post-processed vectors otherwise
    /// - `Err(PipelineError::EncodeFailure)` when the encoder failed
    pub async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, PipelineError> {
        let batch = sanitize(&request.texts);
        if batch.is_empty() {
            return Ok(EmbedResponse::empty());
        }

        let mode = EncodeMode::from_is_query(request.is_query);
        debug!(
            "Encoding {} of {} texts in {} mode",
            batch.len(),
            request.texts.len(),
            mode
        );

        let vectors = match self.encoder.encode(&batch, mode).await {
            Ok(Some(vectors)) if !vectors.is_empty() => vectors,
            Ok(_) => {
                debug!("Encoder returned no vectors for {} texts", batch.len());
                return Ok(EmbedResponse::empty());
            }
            Err(e) => {
                error!("Encoding failed in {} mode: {:#}", mode, e);
                let mut message = format!("{:#}", e);
                if message.trim().is_empty() {
                    message = format!("Encoding failed in {} mode", mode);
                }
                return Err(PipelineError::EncodeFailure(message));
            }
        };

        Ok(postprocess(&vectors, request.normalize))
    }
}
