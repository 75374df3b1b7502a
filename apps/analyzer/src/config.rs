use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::clustering::DEFAULT_CLUSTER_COUNT;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub chroma_url: String,
    pub collection_name: String,
    pub corpus_path: PathBuf,
    pub report_path: PathBuf,
    pub initial_log_path: PathBuf,
    pub validation_log_path: PathBuf,
    pub synthesis_prompt_path: PathBuf,
    pub synthesis_response_path: PathBuf,
    pub cluster_count: usize,
    /// Minimum interval between consecutive LLM requests, in milliseconds.
    pub pacing_delay_ms: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            chroma_url: env_or("CHROMA_URL", "http://localhost:8000"),
            collection_name: env_or("COLLECTION_NAME", "job_postings"),
            corpus_path: env_or("CORPUS_PATH", "output/job_descriptions.txt").into(),
            report_path: env_or("REPORT_PATH", "vector_analysis_results.json").into(),
            initial_log_path: env_or("INITIAL_LOG_PATH", "openai_initial_analysis.log").into(),
            validation_log_path: env_or("VALIDATION_LOG_PATH", "openai_validation.log").into(),
            synthesis_prompt_path: env_or(
                "SYNTHESIS_PROMPT_PATH",
                "openai_global_synthesis_prompt.json",
            )
            .into(),
            synthesis_response_path: env_or(
                "SYNTHESIS_RESPONSE_PATH",
                "openai_global_synthesis_response.json",
            )
            .into(),
            cluster_count: match std::env::var("CLUSTER_COUNT") {
                Ok(value) => value
                    .parse::<usize>()
                    .context("CLUSTER_COUNT must be a positive integer")?,
                Err(_) => DEFAULT_CLUSTER_COUNT,
            },
            pacing_delay_ms: env_or("PACING_DELAY_MS", "5000")
                .parse::<u64>()
                .context("PACING_DELAY_MS must be an integer number of milliseconds")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
