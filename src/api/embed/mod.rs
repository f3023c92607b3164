// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! This module provides the POST /embed endpoint: query/corpus encoding of
//! a text batch with optional L2 normalization.

pub mod handler;

pub use crate::embeddings::{EmbedRequest, EmbedResponse};
pub use handler::embed_handler;
