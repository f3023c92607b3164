// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution
//!
//! Local paths win; whatever is missing is fetched from the HuggingFace Hub
//! (and cached by hf-hub under `~/.cache/huggingface`).

use crate::config::NodeConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

/// Which files still have to come from the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local(ModelFiles),
    Hub {
        model_id: String,
        model_path: Option<PathBuf>,
        tokenizer_path: Option<PathBuf>,
    },
}

impl ModelSource {
    pub fn from_config(config: &NodeConfig) -> Self {
        match (&config.model_path, &config.tokenizer_path) {
            (Some(model_path), Some(tokenizer_path)) => ModelSource::Local(ModelFiles {
                model_path: model_path.clone(),
                tokenizer_path: tokenizer_path.clone(),
            }),
            (model_path, tokenizer_path) => ModelSource::Hub {
                model_id: config.model_id.clone(),
                model_path: model_path.clone(),
                tokenizer_path: tokenizer_path.clone(),
            },
        }
    }
}

/// Resolves the ONNX and tokenizer files named by `config`
pub async fn resolve_model_files(config: &NodeConfig) -> Result<ModelFiles> {
    match ModelSource::from_config(config) {
        ModelSource::Local(files) => {
            info!(
                "Using local model files: {} / {}",
                files.model_path.display(),
                files.tokenizer_path.display()
            );
            Ok(files)
        }
        ModelSource::Hub {
            model_id,
            model_path,
            tokenizer_path,
        } => {
            info!("Resolving model files for {} from HuggingFace Hub", model_id);
            let api = hf_hub::api::tokio::Api::new().context("Failed to create hf-hub client")?;
            let repo = api.model(model_id.clone());

            let model_path = match model_path {
                Some(path) => path,
                None => repo
                    .get(&config.onnx_file)
                    .await
                    .with_context(|| format!("Failed to fetch {} from {}", config.onnx_file, model_id))?,
            };
            let tokenizer_path = match tokenizer_path {
                Some(path) => path,
                None => repo
                    .get(TOKENIZER_FILE)
                    .await
                    .with_context(|| format!("Failed to fetch {} from {}", TOKENIZER_FILE, model_id))?,
            };

            info!(
                "Model files ready: {} / {}",
                model_path.display(),
                tokenizer_path.display()
            );

            Ok(ModelFiles {
                model_path,
                tokenizer_path,
            })
        }
    }
}
