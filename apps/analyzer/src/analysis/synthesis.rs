//! Global synthesis: one final exchange over all cluster analyses plus the
//! cross-cluster statistics.
//!
//! Unlike per-cluster analysis, a failed exchange here is fatal: there is no
//! meaningful fallback for the global report. The exact outgoing prompt and
//! the exact raw response are persisted to disk before any parsing, so a
//! malformed response can still be diagnosed after the run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::analysis::cluster::ClusterAnalysis;
use crate::analysis::prompts::{SYNTHESIS_PROMPT_TEMPLATE, SYNTHESIS_SYSTEM, SYNTHESIS_TEMPERATURE};
use crate::errors::AnalyzerError;
use crate::llm_client::contract::{ensure_valid_json, ValidatedJson};
use crate::llm_client::{ChatCompletion, ChatMessage, MODEL};
use crate::metrics::cross_cluster::CrossClusterStats;
use crate::rate_limit::RateLimiter;

/// Where the synthesis prompt and raw response get persisted.
pub struct SynthesisArtifacts {
    pub prompt_path: PathBuf,
    pub response_path: PathBuf,
}

/// The terminal artifact of a run: the parsed (or fallback) global insights
/// plus the full ordered list of cluster analyses.
#[derive(Debug)]
pub struct GlobalAnalysisReport {
    pub global_insights: ValidatedJson,
    pub cluster_analyses: Vec<ClusterAnalysis>,
    pub generated_at: DateTime<Utc>,
}

impl GlobalAnalysisReport {
    /// Renders the report for the output file: the cluster analyses and the
    /// generation timestamp are appended onto the parsed global object. A
    /// non-object synthesis result is nested under `global_insights` instead.
    pub fn into_json(self) -> Result<Value, serde_json::Error> {
        let mut root = match serde_json::to_value(&self.global_insights)? {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("global_insights".to_string(), other);
                map
            }
        };
        root.insert(
            "cluster_analyses".to_string(),
            serde_json::to_value(&self.cluster_analyses)?,
        );
        root.insert(
            "generated_at".to_string(),
            serde_json::to_value(self.generated_at)?,
        );
        Ok(Value::Object(root))
    }
}

/// Runs the synthesis exchange and assembles the global report.
pub async fn synthesize(
    llm: &dyn ChatCompletion,
    limiter: &mut RateLimiter,
    artifacts: &SynthesisArtifacts,
    stats: &CrossClusterStats,
    cluster_analyses: Vec<ClusterAnalysis>,
) -> Result<GlobalAnalysisReport, AnalyzerError> {
    let stats_json = serde_json::to_string_pretty(stats).map_err(|e| {
        AnalyzerError::Internal(anyhow::anyhow!("Failed to serialize statistics: {e}"))
    })?;
    let analyses_json = serde_json::to_string_pretty(&cluster_analyses).map_err(|e| {
        AnalyzerError::Internal(anyhow::anyhow!("Failed to serialize analyses: {e}"))
    })?;

    let prompt = SYNTHESIS_PROMPT_TEMPLATE
        .replace("{stats_json}", &stats_json)
        .replace("{analyses_json}", &analyses_json);
    let messages = vec![
        ChatMessage::system(SYNTHESIS_SYSTEM),
        ChatMessage::user(prompt),
    ];

    // Persist the exact outgoing prompt before the call.
    std::fs::write(
        &artifacts.prompt_path,
        serde_json::to_string_pretty(&messages)
            .map_err(|e| AnalyzerError::Internal(anyhow::anyhow!("{e}")))?,
    )?;

    limiter.acquire().await;
    let response = llm.complete(&messages, SYNTHESIS_TEMPERATURE).await?;

    // Persist the raw response before parsing it.
    std::fs::write(
        &artifacts.response_path,
        serde_json::to_string_pretty(&serde_json::json!({
            "model": MODEL,
            "response": response,
        }))
        .map_err(|e| AnalyzerError::Internal(anyhow::anyhow!("{e}")))?,
    )?;

    let global_insights = ensure_valid_json(&response);
    if global_insights.is_fallback() {
        warn!("Synthesis response was not valid JSON; report carries the raw text");
    }
    info!(
        "Synthesis complete over {} cluster analyses",
        cluster_analyses.len()
    );

    Ok(GlobalAnalysisReport {
        global_insights,
        cluster_analyses,
        generated_at: Utc::now(),
    })
}
