// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod client;
pub mod config;
pub mod embeddings;
pub mod version;

// Re-export main types
pub use api::{create_app, AppState, EmbedRequest, EmbedResponse};
pub use config::NodeConfig;
pub use embeddings::{EmbedPipeline, EncodeMode, Encoder, PipelineError, TextBatch, TextInput};
