//! Per-cluster analysis: the two-stage (generate, then validate) prompting
//! protocol with interaction logging and exchange-failure fallback.
//!
//! The accepted analysis is always the validation stage's output; the initial
//! stage only produces a draft for the validator to refine. A failed exchange
//! never aborts the run: the result degrades to an error-marker fallback with
//! the metrics preserved.

use serde::Serialize;
use tracing::{error, info};

use crate::analysis::prompts::{
    INITIAL_PROMPT_TEMPLATE, INITIAL_SYSTEM, INITIAL_TEMPERATURE, VALIDATION_PROMPT_TEMPLATE,
    VALIDATION_SYSTEM, VALIDATION_TEMPERATURE,
};
use crate::errors::AnalyzerError;
use crate::llm_client::contract::{ensure_valid_json, ContractFallback, ValidatedJson};
use crate::llm_client::log::InteractionLog;
use crate::llm_client::{ChatCompletion, ChatMessage};
use crate::metrics::extractor::DocumentMetrics;
use crate::metrics::summary::{summarize, ClusterMetricsSummary};
use crate::rate_limit::RateLimiter;

/// The append-only logs for the two protocol stages.
pub struct AnalysisLogs {
    pub initial: InteractionLog,
    pub validation: InteractionLog,
}

/// One cluster's complete analysis: metrics summary, validated (or fallback)
/// model output, and the raw counters behind the summary. Immutable once
/// built; serialized into the final report.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAnalysis {
    pub cluster_id: usize,
    pub job_count: usize,
    pub metrics: ClusterMetricsSummary,
    pub analysis: ValidatedJson,
    pub raw_metrics: DocumentMetrics,
}

/// Runs the two-stage protocol for one cluster.
pub async fn analyze_cluster(
    llm: &dyn ChatCompletion,
    limiter: &mut RateLimiter,
    logs: &AnalysisLogs,
    cluster_id: usize,
    jobs: &[String],
    total_jobs: usize,
) -> ClusterAnalysis {
    let (metrics, raw_metrics) = summarize(jobs, total_jobs);

    let analysis = match run_exchanges(llm, limiter, logs, &metrics).await {
        Ok(validated) => validated,
        Err(e) => {
            error!("Error in cluster {cluster_id} analysis: {e}");
            ValidatedJson::Fallback(ContractFallback::exchange_failure(&e.to_string()))
        }
    };

    ClusterAnalysis {
        cluster_id,
        job_count: jobs.len(),
        metrics,
        analysis,
        raw_metrics,
    }
}

async fn run_exchanges(
    llm: &dyn ChatCompletion,
    limiter: &mut RateLimiter,
    logs: &AnalysisLogs,
    metrics: &ClusterMetricsSummary,
) -> Result<ValidatedJson, AnalyzerError> {
    let metrics_json = serde_json::to_string_pretty(metrics)
        .map_err(|e| AnalyzerError::Internal(anyhow::anyhow!("Failed to serialize metrics: {e}")))?;

    // Stage 1: draft analysis.
    let initial_messages = vec![
        ChatMessage::system(INITIAL_SYSTEM),
        ChatMessage::user(build_initial_prompt(metrics, &metrics_json)),
    ];
    limiter.acquire().await;
    let initial_response = llm.complete(&initial_messages, INITIAL_TEMPERATURE).await?;
    logs.initial.append(&initial_messages, &initial_response)?;
    info!("Initial analysis drafted ({} chars)", initial_response.len());

    // Stage 2: critique and refine the draft against the same metrics.
    let validation_messages = vec![
        ChatMessage::system(VALIDATION_SYSTEM),
        ChatMessage::user(build_validation_prompt(&initial_response, &metrics_json)),
    ];
    limiter.acquire().await;
    let validation_response = llm
        .complete(&validation_messages, VALIDATION_TEMPERATURE)
        .await?;
    logs.validation.append(&validation_messages, &validation_response)?;

    Ok(ensure_valid_json(&validation_response))
}

fn build_initial_prompt(metrics: &ClusterMetricsSummary, metrics_json: &str) -> String {
    let (top_industry, top_share) = metrics.dominant_industry();
    INITIAL_PROMPT_TEMPLATE
        .replace("{job_count}", &metrics.total_jobs.to_string())
        .replace(
            "{cluster_pct}",
            &format!("{:.1}", metrics.percentages.cluster_size),
        )
        .replace("{metrics_json}", metrics_json)
        .replace("{top_industry}", &top_industry)
        .replace("{top_share}", &format!("{top_share:.1}"))
}

fn build_validation_prompt(initial_analysis: &str, metrics_json: &str) -> String {
    VALIDATION_PROMPT_TEMPLATE
        .replace("{initial_analysis}", initial_analysis)
        .replace("{metrics_json}", metrics_json)
}
