// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running BGE-style
//! sentence embedding models (default: BAAI/bge-small-zh-v1.5).
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Tokenization with truncation to `max_length` and per-batch padding
//! - CLS or attention-masked mean pooling
//! - Query mode with optional instruction prefix, corpus mode verbatim
//! - Output dimension inferred at load time

use crate::config::{Device, Pooling};
use crate::embeddings::{EncodeMode, Encoder, RawVector, TextBatch};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayViewD, Axis};
use ort::execution_providers::{
    CPUExecutionProvider, CUDAExecutionProvider, ExecutionProviderDispatch,
};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Runtime options for [`OnnxEmbeddingModel`]
#[derive(Debug, Clone)]
pub struct OnnxModelOptions {
    pub device: Device,
    pub pooling: Pooling,
    /// Maximum tokens per text; longer inputs are truncated
    pub max_length: usize,
    /// Prefix added to every text in query mode
    pub query_instruction: Option<String>,
    /// L2-normalize raw model output before returning it
    pub normalize_embeddings: bool,
}

impl Default for OnnxModelOptions {
    fn default() -> Self {
        Self {
            device: Device::Gpu,
            pooling: Pooling::Cls,
            max_length: 512,
            query_instruction: None,
            normalize_embeddings: true,
        }
    }
}

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// The session sits behind `Arc<Mutex<_>>`; concurrent `encode` calls are
/// serialized on it. Inference runs on the blocking thread pool.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    options: OnnxModelOptions,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Creates a new ONNX embedding model from disk paths
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails
    /// - The validation inference does not produce a usable hidden size
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "BAAI/bge-small-zh-v1.5",
    ///     "./models/bge-small-zh-v1.5/onnx/model.onnx",
    ///     "./models/bge-small-zh-v1.5/tokenizer.json",
    ///     OnnxModelOptions::default(),
    /// ).await?;
    /// ```
    pub async fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        options: OnnxModelOptions,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref().to_path_buf();
        let tokenizer_path = tokenizer_path.as_ref().to_path_buf();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }
        if options.max_length == 0 {
            anyhow::bail!("max_length must be greater than 0");
        }

        let load_options = options.clone();
        let (session, tokenizer, dimension) = tokio::task::spawn_blocking(move || {
            Self::load_blocking(&model_path, &tokenizer_path, &load_options)
        })
        .await
        .context("Model loading task panicked")??;

        info!(
            "ONNX embedding model {} loaded ({} dimensions, {:?} pooling)",
            model_name, dimension, options.pooling
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension,
            options,
        })
    }

    fn load_blocking(
        model_path: &Path,
        tokenizer_path: &Path,
        options: &OnnxModelOptions,
    ) -> Result<(Session, Tokenizer, usize)> {
        let mut session = match options.device {
            Device::Gpu => {
                info!("Attempting CUDA execution provider...");
                let cuda = CUDAExecutionProvider::default().build().error_on_failure();
                match Self::build_session(model_path, cuda) {
                    Ok(s) => {
                        info!("CUDA execution provider initialized");
                        s
                    }
                    Err(e) => {
                        warn!("CUDA execution provider failed: {:#}", e);
                        warn!("Falling back to CPU execution provider");
                        Self::build_session(model_path, CPUExecutionProvider::default().build())?
                    }
                }
            }
            Device::Cpu => {
                Self::build_session(model_path, CPUExecutionProvider::default().build())?
            }
        };

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        // Probe the hidden size with one short input
        let probe = vec!["validation test".to_string()];
        let pooled = run_batch(&mut session, &tokenizer, &probe, options.pooling)
            .context("Validation inference failed")?;
        let dimension = pooled.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 {
            anyhow::bail!("Model produced an empty embedding during validation");
        }

        Ok((session, tokenizer, dimension))
    }

    fn build_session(model_path: &Path, provider: ExecutionProviderDispatch) -> Result<Session> {
        Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([provider])
            .context("Failed to set execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
    }

    /// Generates embeddings for a batch of texts in the given mode
    ///
    /// Texts are tokenized together, padded to the longest sequence and run
    /// through one inference call.
    pub async fn embed_batch(&self, texts: &[String], mode: EncodeMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs = self.prepare_inputs(texts, mode);
        let model = self.clone();

        tokio::task::spawn_blocking(move || model.embed_blocking(&inputs))
            .await
            .context("Inference task panicked")?
    }

    fn prepare_inputs(&self, texts: &[String], mode: EncodeMode) -> Vec<String> {
        match (mode, self.options.query_instruction.as_deref()) {
            (EncodeMode::Query, Some(instruction)) => texts
                .iter()
                .map(|text| format!("{}{}", instruction, text))
                .collect(),
            _ => texts.to_vec(),
        }
    }

    fn embed_blocking(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;

        let mut embeddings = run_batch(&mut session, &self.tokenizer, texts, self.options.pooling)?;
        drop(session);

        for (i, embedding) in embeddings.iter_mut().enumerate() {
            if embedding.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    embedding.len(),
                    self.dimension
                );
            }
            if self.options.normalize_embeddings {
                normalize_in_place(embedding);
            }
        }

        Ok(embeddings)
    }

    /// Counts tokens in a text string (after truncation)
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        Ok(encoding.get_attention_mask().iter().map(|&m| m as usize).sum())
    }

    /// Returns the output dimension of this model
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn options(&self) -> &OnnxModelOptions {
        &self.options
    }
}

#[async_trait]
impl Encoder for OnnxEmbeddingModel {
    async fn encode(&self, batch: &TextBatch, mode: EncodeMode) -> Result<Option<Vec<RawVector>>> {
        debug!("{}: encoding {} texts ({})", self.model_name, batch.len(), mode);
        let vectors = self.embed_batch(batch.as_slice(), mode).await?;
        Ok(Some(vectors))
    }
}

/// Tokenizes, pads and runs one inference, returning pooled vectors
fn run_batch(
    session: &mut Session,
    tokenizer: &Tokenizer,
    texts: &[String],
    pooling: Pooling,
) -> Result<Vec<Vec<f32>>> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

    let batch_size = encodings.len();
    let max_len = encodings
        .iter()
        .map(|enc| enc.get_ids().len())
        .max()
        .unwrap_or(0);
    if max_len == 0 {
        anyhow::bail!("Tokenizer produced no tokens");
    }

    let mut input_ids = Vec::with_capacity(batch_size * max_len);
    let mut attention_mask = Vec::with_capacity(batch_size * max_len);
    let mut token_type_ids = Vec::with_capacity(batch_size * max_len);

    for encoding in &encodings {
        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();
        let padding = max_len - ids.len();

        input_ids.extend(ids.iter().map(|&id| id as i64));
        input_ids.extend(std::iter::repeat(0i64).take(padding));
        attention_mask.extend(mask.iter().map(|&m| m as i64));
        attention_mask.extend(std::iter::repeat(0i64).take(padding));
        token_type_ids.extend(std::iter::repeat(0i64).take(max_len));
    }

    let mask_for_pooling = attention_mask.clone();

    let input_ids_array = Array2::from_shape_vec((batch_size, max_len), input_ids)
        .context("Failed to create batch input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((batch_size, max_len), attention_mask)
        .context("Failed to create batch attention_mask array")?;
    let token_type_ids_array = Array2::from_shape_vec((batch_size, max_len), token_type_ids)
        .context("Failed to create batch token_type_ids array")?;

    let outputs = session.run(ort::inputs![
        "input_ids" => Value::from_array(input_ids_array)?,
        "attention_mask" => Value::from_array(attention_mask_array)?,
        "token_type_ids" => Value::from_array(token_type_ids_array)?
    ])?;

    // Output names differ between exports; the first output is the hidden state
    let output = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    pool_output(output, &mask_for_pooling, batch_size, max_len, pooling)
}

/// Reduces `[batch, seq, hidden]` (or passes through `[batch, hidden]`)
fn pool_output(
    output: ArrayViewD<'_, f32>,
    mask: &[i64],
    batch_size: usize,
    seq_len: usize,
    pooling: Pooling,
) -> Result<Vec<Vec<f32>>> {
    let shape = output.shape().to_vec();
    if shape.first() != Some(&batch_size) {
        anyhow::bail!(
            "Model output batch {:?} does not match input batch {}",
            shape,
            batch_size
        );
    }

    let mut embeddings = Vec::with_capacity(batch_size);

    match shape.len() {
        2 => {
            for row in output.axis_iter(Axis(0)) {
                embeddings.push(row.iter().copied().collect());
            }
        }
        3 => {
            let hidden_dim = shape[2];
            for (batch_idx, item) in output.axis_iter(Axis(0)).enumerate() {
                let pooled = match pooling {
                    Pooling::Cls => item.index_axis(Axis(0), 0).iter().copied().collect(),
                    Pooling::Mean => {
                        let item_mask = &mask[batch_idx * seq_len..(batch_idx + 1) * seq_len];
                        let mut pooled = vec![0.0f32; hidden_dim];
                        let mut sum_mask = 0.0f32;

                        for (token, &m) in item.axis_iter(Axis(0)).zip(item_mask) {
                            let weight = m as f32;
                            sum_mask += weight;
                            for (acc, &value) in pooled.iter_mut().zip(token.iter()) {
                                *acc += value * weight;
                            }
                        }

                        for value in &mut pooled {
                            *value /= sum_mask.max(1e-9);
                        }
                        pooled
                    }
                };
                embeddings.push(pooled);
            }
        }
        _ => anyhow::bail!(
            "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden] or [batch, hidden])",
            shape
        ),
    }

    Ok(embeddings)
}

fn normalize_in_place(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
