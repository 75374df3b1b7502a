mod analysis;
mod clustering;
mod config;
mod corpus;
mod errors;
mod llm_client;
mod metrics;
mod pipeline;
mod rate_limit;
mod vector_store;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::vector_store::ChromaStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting market analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Connect the vector-store collaborator
    info!("Setting up vector database...");
    let store = ChromaStore::connect(&config.chroma_url, &config.collection_name).await?;
    info!("Vector store ready (collection: {})", config.collection_name);

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Run the analysis pipeline
    info!("Performing global analysis...");
    let report = pipeline::run(&config, &store, &llm).await?;

    let rendered = serde_json::to_string_pretty(&report.into_json()?)?;
    std::fs::write(&config.report_path, rendered)?;

    info!(
        "Analysis complete! Check '{}' for results and the log files for request-response records.",
        config.report_path.display()
    );

    Ok(())
}
