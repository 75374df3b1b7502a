use thiserror::Error;

use crate::llm_client::LlmError;
use crate::vector_store::StoreError;

/// Pipeline-level error type.
///
/// Fatal kinds abort the run from `main`: `EmptyCorpus`, `Clustering`,
/// `Store`, `Io`, `Internal`, and `Llm` when raised by the synthesis stage.
/// `Metrics` and per-cluster `Llm` failures are caught by the pipeline and
/// degraded to empty statistics / fallback analyses.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),

    #[error("Metrics computation error: {0}")]
    Metrics(String),

    #[error("Clustering error: {0}")]
    Clustering(String),

    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("Text generation error: {0}")]
    Llm(#[from] LlmError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
