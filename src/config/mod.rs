// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Node configuration
//!
//! Every setting can be given as a flag or through the environment (a `.env`
//! file is honoured by the binaries).

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL_ID: &str = "BAAI/bge-small-zh-v1.5";
pub const DEFAULT_PORT: u16 = 8088;

/// Execution device for the embedding model
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Device {
    Cpu,
    /// CUDA, falling back to CPU when unavailable
    #[value(alias = "cuda")]
    Gpu,
}

/// How token states are reduced to one sentence vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pooling {
    /// First ([CLS]) token, as used by the BGE family
    Cls,
    /// Attention-masked mean over all tokens
    Mean,
}

/// Fabstir embedding node configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-embed-node")]
#[command(version)]
#[command(about = "HTTP embedding service with query and corpus encoding modes", long_about = None)]
pub struct NodeConfig {
    /// Interface to bind
    #[arg(long, env = "EMBED_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// HTTP port
    #[arg(long, env = "API_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// HuggingFace Hub model id used when local files are not given
    #[arg(long, env = "EMBEDDING_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    /// Local ONNX model file
    #[arg(long, env = "EMBEDDING_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Local tokenizer.json
    #[arg(long, env = "EMBEDDING_TOKENIZER_PATH")]
    pub tokenizer_path: Option<PathBuf>,

    /// ONNX file name inside the hub repository
    #[arg(long, env = "EMBEDDING_ONNX_FILE", default_value = "onnx/model.onnx")]
    pub onnx_file: String,

    #[arg(long, env = "EMBEDDING_DEVICE", value_enum, default_value = "gpu")]
    pub device: Device,

    #[arg(long, env = "EMBEDDING_POOLING", value_enum, default_value = "cls")]
    pub pooling: Pooling,

    /// Tokenizer truncation length
    #[arg(long, env = "EMBEDDING_MAX_LENGTH", default_value_t = 512)]
    pub max_length: usize,

    /// Instruction prepended to texts encoded in query mode
    #[arg(long, env = "EMBEDDING_QUERY_INSTRUCTION")]
    pub query_instruction: Option<String>,

    /// Skip the model-side L2 normalization of raw embeddings
    #[arg(long, env = "EMBEDDING_NO_MODEL_NORMALIZE")]
    pub no_model_normalize: bool,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl NodeConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.port != 0, "port must be non-zero");
        ensure!(self.max_length > 0, "max_length must be greater than 0");
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be greater than 0"
        );
        ensure!(
            !self.model_id.trim().is_empty()
                || (self.model_path.is_some() && self.tokenizer_path.is_some()),
            "model_id is required unless both model_path and tokenizer_path are set"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether the adapter should L2-normalize its own output
    pub fn model_normalize(&self) -> bool {
        !self.no_model_normalize
    }

    /// Query instruction with blank values treated as unset
    pub fn query_instruction(&self) -> Option<&str> {
        self.query_instruction
            .as_deref()
            .filter(|instruction| !instruction.trim().is_empty())
    }
}
