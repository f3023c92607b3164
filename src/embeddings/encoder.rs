// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Encoder capability boundary
//!
//! The pipeline only sees the model through the [`Encoder`] trait. The
//! production adapter lives in `onnx_model.rs`; tests substitute mocks.

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// One embedding as produced by an encoder, before post-processing
pub type RawVector = Vec<f32>;

/// Encoding strategy requested for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodeMode {
    /// Short search queries (may receive a retrieval instruction prefix)
    Query,
    /// Documents being indexed
    Corpus,
}

impl EncodeMode {
    /// Maps the wire-level `is_query` flag onto a mode
    pub fn from_is_query(is_query: bool) -> Self {
        if is_query {
            EncodeMode::Query
        } else {
            EncodeMode::Corpus
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeMode::Query => "query",
            EncodeMode::Corpus => "corpus",
        }
    }
}

impl fmt::Display for EncodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitized, order-preserving batch of non-empty texts
///
/// Only the sanitizer builds these from request input, so every entry is
/// guaranteed to contain at least one non-whitespace character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBatch {
    texts: Vec<String>,
}

impl TextBatch {
    pub(crate) fn from_sanitized(texts: Vec<String>) -> Self {
        Self { texts }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.texts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.texts.iter()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.texts
    }
}

impl<'a> IntoIterator for &'a TextBatch {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.texts.iter()
    }
}

/// Text embedding capability consumed by the pipeline
///
/// # Contract
/// - Never called with an empty batch
/// - On success returns one vector per input text, in input order, all of
///   the same length
/// - `Ok(None)` means the model produced no result at all; the pipeline
///   treats it like an empty result rather than an error
/// - Implementations own their thread-safety; the pipeline calls `encode`
///   concurrently from multiple requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Encoder: Send + Sync {
    async fn encode(&self, batch: &TextBatch, mode: EncodeMode) -> Result<Option<Vec<RawVector>>>;
}
