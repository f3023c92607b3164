// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{ensure, Result};
use clap::Parser;
use fabstir_embed_node::client::{dot, l2_norm, round6, EmbedClient, DEFAULT_EMBED_URL};
use std::time::Duration;

const DEFAULT_QUERY: &str = "向量检索测试";
const SAMPLE_DOCUMENT: &str = "这是一个用于检索的文档内容示例";

/// Smoke test for a running embed node
///
/// Embeds a query in query mode and a sample document in corpus mode, then
/// prints dimensions, norms and the approximate cosine between them.
#[derive(Parser, Debug)]
#[command(name = "embed-probe")]
#[command(version)]
struct ProbeArgs {
    /// Query text
    #[arg(default_value = DEFAULT_QUERY)]
    query: String,

    /// Document text encoded in corpus mode
    #[arg(long, default_value = SAMPLE_DOCUMENT)]
    document: String,

    #[arg(long, env = "EMBED_URL", default_value = DEFAULT_EMBED_URL)]
    url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    tracing_subscriber::fmt::init();

    let args = ProbeArgs::parse();
    let client = EmbedClient::new(&args.url, Duration::from_secs(args.timeout_secs))?;

    let (dims, query_vectors) = client.embed(&[args.query.as_str()], true).await?;
    ensure!(!query_vectors.is_empty(), "query returned no vectors");
    println!("query dims: {}", dims);
    println!("query norm: {}", round6(l2_norm(&query_vectors[0])));

    let (dims, corpus_vectors) = client.embed(&[args.document.as_str()], false).await?;
    ensure!(!corpus_vectors.is_empty(), "document returned no vectors");
    println!("corpus dims: {}", dims);
    println!("corpus norm: {}", round6(l2_norm(&corpus_vectors[0])));

    println!(
        "cosine approx: {}",
        round6(dot(&query_vectors[0], &corpus_vectors[0]))
    );

    Ok(())
}
