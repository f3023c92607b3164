// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use fabstir_embed_node::{
    api::{start_server, AppState},
    config::NodeConfig,
    embeddings::{resolve_model_files, EmbedPipeline, OnnxEmbeddingModel, OnnxModelOptions},
    version,
};
use std::{env, sync::Arc};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = NodeConfig::parse();
    config.validate().context("Invalid configuration")?;

    info!("Starting {}", version::get_version_string());
    debug!("Version info: {}", version::get_version_info());
    debug!("Configuration: {:?}", config);

    let files = resolve_model_files(&config).await?;

    let options = OnnxModelOptions {
        device: config.device,
        pooling: config.pooling,
        max_length: config.max_length,
        query_instruction: config.query_instruction().map(str::to_string),
        normalize_embeddings: config.model_normalize(),
    };

    info!(
        "Loading embedding model {} on {:?}",
        config.model_id, config.device
    );
    let model = OnnxEmbeddingModel::new(
        config.model_id.clone(),
        &files.model_path,
        &files.tokenizer_path,
        options,
    )
    .await
    .context("Failed to load embedding model")?;
    info!(
        "Embedding model ready: {} ({} dimensions)",
        model.model_name(),
        model.dimension()
    );

    let pipeline = EmbedPipeline::new(Arc::new(model));
    let state = AppState::new(pipeline);

    info!("Endpoints:");
    info!("  Embed:  POST http://{}:{}/embed", config.host, config.port);
    info!("  Health: GET  http://{}:{}/health", config.host, config.port);

    start_server(&config, state).await
}
