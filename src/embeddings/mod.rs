// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding core: sanitize -> encode -> postprocess
//!
//! - `encoder`: the [`Encoder`] capability the pipeline depends on
//! - `sanitizer`: filters raw request items into a [`TextBatch`]
//! - `postprocess`: float coercion, L2 normalization and `dims`
//! - `request`/`response`: the embed call's input and output shapes
//! - `pipeline`: the [`EmbedPipeline`] orchestrator
//! - `onnx_model`: ONNX Runtime implementation of [`Encoder`]
//! - `model_files`: local/hub model file resolution

pub mod encoder;
pub mod model_files;
pub mod onnx_model;
pub mod pipeline;
pub mod postprocess;
pub mod request;
pub mod response;
pub mod sanitizer;

pub use encoder::{EncodeMode, Encoder, RawVector, TextBatch};
pub use model_files::{resolve_model_files, ModelFiles, ModelSource};
pub use onnx_model::{OnnxEmbeddingModel, OnnxModelOptions};
pub use pipeline::{EmbedPipeline, PipelineError};
pub use postprocess::{l2_norm, l2_normalize, postprocess};
pub use request::EmbedRequest;
pub use response::EmbedResponse;
pub use sanitizer::{sanitize, TextInput};
