//! Pipeline orchestration.
//!
//! Flow: load corpus → embed/store (idempotent) → retrieve → cluster →
//!       per-cluster metrics + two-stage analysis → cross-cluster stats →
//!       global synthesis.
//!
//! Clusters are processed strictly one at a time in increasing id order; the
//! shared rate limiter paces every LLM exchange. A failing cluster degrades
//! to a fallback result, a failing cross-cluster aggregation degrades to
//! empty statistics, and only corpus emptiness or a synthesis failure aborts
//! the run.

use std::time::Duration;

use tracing::{info, warn};

use crate::analysis::cluster::{analyze_cluster, AnalysisLogs, ClusterAnalysis};
use crate::analysis::synthesis::{synthesize, GlobalAnalysisReport, SynthesisArtifacts};
use crate::clustering::cluster_embeddings;
use crate::config::Config;
use crate::corpus::split_postings;
use crate::errors::AnalyzerError;
use crate::llm_client::log::InteractionLog;
use crate::llm_client::ChatCompletion;
use crate::metrics::cross_cluster::{aggregate, CrossClusterStats};
use crate::metrics::summary::ClusterMetricsSummary;
use crate::rate_limit::RateLimiter;
use crate::vector_store::{embed_and_store, fetch_corpus, VectorStore};

/// Runs the full analysis pipeline and returns the global report.
pub async fn run(
    config: &Config,
    store: &dyn VectorStore,
    llm: &dyn ChatCompletion,
) -> Result<GlobalAnalysisReport, AnalyzerError> {
    let content = std::fs::read_to_string(&config.corpus_path)?;
    let jobs = split_postings(&content);
    if jobs.is_empty() {
        return Err(AnalyzerError::EmptyCorpus(format!(
            "no postings found in {}",
            config.corpus_path.display()
        )));
    }
    info!("Found {} unique job postings", jobs.len());

    embed_and_store(store, &jobs).await?;
    let stored = fetch_corpus(store).await?;

    let assignments = cluster_embeddings(&stored.embeddings, config.cluster_count)?;
    let groups = group_by_cluster(&assignments, &stored.documents);

    let mut limiter = RateLimiter::new(Duration::from_millis(config.pacing_delay_ms));
    let logs = AnalysisLogs {
        initial: InteractionLog::new(&config.initial_log_path),
        validation: InteractionLog::new(&config.validation_log_path),
    };
    info!(
        "Logging exchanges to {} and {}",
        logs.initial.path().display(),
        logs.validation.path().display()
    );

    let analyses =
        analyze_all(llm, &mut limiter, &logs, &groups, stored.documents.len()).await;

    let stats = cross_cluster_stats(&analyses);

    let artifacts = SynthesisArtifacts {
        prompt_path: config.synthesis_prompt_path.clone(),
        response_path: config.synthesis_response_path.clone(),
    };
    synthesize(llm, &mut limiter, &artifacts, &stats, analyses).await
}

/// Partitions documents by their cluster assignment. The outer index is the
/// cluster id; empty clusters stay as empty groups so ids keep their meaning.
pub fn group_by_cluster(assignments: &[usize], documents: &[String]) -> Vec<Vec<String>> {
    let cluster_count = assignments.iter().copied().max().map_or(0, |max| max + 1);
    let mut groups = vec![Vec::new(); cluster_count];
    for (document, &cluster_id) in documents.iter().zip(assignments) {
        groups[cluster_id].push(document.clone());
    }
    groups
}

/// Analyzes every non-empty cluster sequentially, in increasing id order.
/// Per-cluster failures are absorbed inside `analyze_cluster`.
pub async fn analyze_all(
    llm: &dyn ChatCompletion,
    limiter: &mut RateLimiter,
    logs: &AnalysisLogs,
    groups: &[Vec<String>],
    total_jobs: usize,
) -> Vec<ClusterAnalysis> {
    let mut analyses = Vec::new();
    for (cluster_id, jobs) in groups.iter().enumerate() {
        if jobs.is_empty() {
            continue;
        }
        info!("Analyzing cluster {cluster_id} ({} postings)", jobs.len());
        analyses.push(analyze_cluster(llm, limiter, logs, cluster_id, jobs, total_jobs).await);
    }
    analyses
}

/// Aggregates cross-cluster statistics, degrading to the empty structure on
/// inconsistent input rather than aborting the run.
fn cross_cluster_stats(analyses: &[ClusterAnalysis]) -> CrossClusterStats {
    let tagged: Vec<(usize, &ClusterMetricsSummary)> = analyses
        .iter()
        .map(|analysis| (analysis.cluster_id, &analysis.metrics))
        .collect();
    match aggregate(&tagged) {
        Ok(stats) => stats,
        Err(e) => {
            warn!("Cross-cluster aggregation failed, continuing with empty statistics: {e}");
            CrossClusterStats::default()
        }
    }
}
