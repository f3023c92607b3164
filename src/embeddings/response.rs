// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for POST /embed

use serde::{Deserialize, Serialize};

/// Response body for a successful POST /embed
///
/// # Fields
/// - `vectors`: One vector per accepted input text, in input order
/// - `dims`: Length of the first vector, or 0 when `vectors` is empty
///
/// # Example
/// ```json
/// {
///   "vectors": [[0.6, 0.8]],
///   "dims": 2
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub vectors: Vec<Vec<f64>>,
    pub dims: usize,
}

impl EmbedResponse {
    /// The valid-but-empty response: no vectors, `dims: 0`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Returns the number of vectors in the response
    pub fn vector_count(&self) -> usize {
        self.vectors.len()
    }
}
