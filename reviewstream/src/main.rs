//! Reviewstream server binary.
//!
//! Usage: `reviewstream [CONFIG_PATH]`. Without a path, `reviewstream.toml`
//! in the working directory is used when present.

use anyhow::{Context, Result};
use reviewstream::config::ReviewConfig;
use reviewstream::observability::init_tracing;
use reviewstream::server;
use reviewstream::service::ReviewService;
use reviewstream::stages::{LlmClient, LlmStage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

const DEFAULT_CONFIG: &str = "reviewstream.toml";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = ReviewConfig::load(Some(&path))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    init_tracing(&config.logging)?;
    info!(
        name = %config.app.name,
        version = %config.app.version,
        environment = %config.app.environment,
        provider = ?config.llm.provider,
        "Starting"
    );

    let client = Arc::new(LlmClient::new(config.llm.clone()).context("Invalid LLM configuration")?);
    let stages = LlmStage::all(&client, &config);
    let service = ReviewService::from_stages(stages, &config).context("Failed to build review pipeline")?;

    server::serve(service, Arc::new(config)).await
}
