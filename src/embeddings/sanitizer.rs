// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request sanitizer
//!
//! Request bodies may carry arbitrary JSON in `texts`. Each element is
//! decoded into a [`TextInput`] and only usable strings survive into the
//! [`TextBatch`] handed to the encoder.

use crate::embeddings::TextBatch;
use serde::{Deserialize, Serialize};

/// One element of the incoming `texts` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    Text(String),
    /// Any non-string JSON value (number, bool, null, array, object)
    Other(serde_json::Value),
}

impl TextInput {
    /// Returns the string when this item may be sent to the encoder
    pub fn as_usable_text(&self) -> Option<&str> {
        match self {
            TextInput::Text(text) if !is_blank(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        TextInput::Text(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        TextInput::Text(text)
    }
}

impl From<serde_json::Value> for TextInput {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => TextInput::Text(text),
            other => TextInput::Other(other),
        }
    }
}

/// True when `text` has nothing but whitespace or the ASCII separator
/// controls (U+001C..=U+001F)
pub fn is_blank(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c))
}

/// Keeps string items that are non-blank after trimming, in input order
///
/// Retained strings are passed through untrimmed. Everything else is dropped
/// without error.
pub fn sanitize(texts: &[TextInput]) -> TextBatch {
    let kept = texts
        .iter()
        .filter_map(TextInput::as_usable_text)
        .map(str::to_string)
        .collect();

    TextBatch::from_sanitized(kept)
}
