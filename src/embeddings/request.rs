// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed

use crate::embeddings::TextInput;
use serde::{Deserialize, Serialize};

/// Request body for POST /embed
///
/// # Fields
/// - `texts`: Items to embed; malformed entries are filtered, not rejected
/// - `normalize`: L2-normalize each output vector (default: true)
/// - `is_query`: Encode in query mode instead of corpus mode (default: true)
///
/// # Example
/// ```json
/// {
///   "texts": ["向量检索测试", "another text"],
///   "normalize": true,
///   "is_query": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub texts: Vec<TextInput>,

    #[serde(default = "default_true")]
    pub normalize: bool,

    #[serde(default = "default_true", alias = "isQuery")]
    pub is_query: bool,
}

fn default_true() -> bool {
    true
}

impl EmbedRequest {
    /// Builds a request from plain strings with default flags
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(|t| TextInput::Text(t.into())).collect(),
            normalize: true,
            is_query: true,
        }
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_is_query(mut self, is_query: bool) -> Self {
        self.is_query = is_query;
        self
    }
}
