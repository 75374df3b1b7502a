//! Cross-cluster aggregation: size shares, industry distribution, and
//! industry dominance over all cluster summaries.

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::AnalyzerError;
use crate::metrics::summary::{percentage, ClusterMetricsSummary};

#[derive(Debug, Clone, Serialize)]
pub struct ClusterSizeEntry {
    pub cluster_id: usize,
    pub size: usize,
    /// Share of the summed cluster sizes, in [0, 100].
    pub percentage: f64,
}

/// For one industry: the cluster holding its highest count, and that count
/// as a share of the dominant cluster's size.
#[derive(Debug, Clone, Serialize)]
pub struct IndustryDominance {
    pub industry: String,
    pub dominant_cluster: usize,
    pub count: u32,
    pub percentage: f64,
}

/// Global distributions over all cluster summaries. Empty input produces the
/// empty structure; downstream consumers must tolerate it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrossClusterStats {
    pub cluster_sizes: Vec<ClusterSizeEntry>,
    pub industry_distribution: IndexMap<String, IndexMap<usize, u32>>,
    pub industry_dominance: Vec<IndustryDominance>,
}

/// Aggregates tagged cluster summaries into global statistics.
///
/// Dominance ties break to the lowest cluster id: the scan keeps the first
/// maximum over entries inserted in increasing cluster-id order. A dominant
/// cluster with no recorded size indicates inconsistent input and surfaces
/// as a `Metrics` error; callers degrade to empty statistics.
pub fn aggregate(
    summaries: &[(usize, &ClusterMetricsSummary)],
) -> Result<CrossClusterStats, AnalyzerError> {
    let mut stats = CrossClusterStats::default();
    if summaries.is_empty() {
        return Ok(stats);
    }

    let total_jobs: usize = summaries.iter().map(|(_, s)| s.total_jobs).sum();

    for (cluster_id, summary) in summaries {
        stats.cluster_sizes.push(ClusterSizeEntry {
            cluster_id: *cluster_id,
            size: summary.total_jobs,
            percentage: percentage(summary.total_jobs, total_jobs),
        });

        for (industry, count) in &summary.top_industries {
            *stats
                .industry_distribution
                .entry(industry.clone())
                .or_default()
                .entry(*cluster_id)
                .or_insert(0) += count;
        }
    }

    for (industry, cluster_counts) in &stats.industry_distribution {
        let mut best: Option<(usize, u32)> = None;
        for (cluster_id, count) in cluster_counts {
            if best.map_or(true, |(_, best_count)| *count > best_count) {
                best = Some((*cluster_id, *count));
            }
        }
        let Some((dominant_cluster, count)) = best else {
            continue;
        };

        let size = stats
            .cluster_sizes
            .iter()
            .find(|entry| entry.cluster_id == dominant_cluster)
            .map(|entry| entry.size)
            .ok_or_else(|| {
                AnalyzerError::Metrics(format!(
                    "dominant cluster {dominant_cluster} for industry '{industry}' has no recorded size"
                ))
            })?;

        stats.industry_dominance.push(IndustryDominance {
            industry: industry.clone(),
            dominant_cluster,
            count,
            percentage: percentage(count as usize, size),
        });
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::summary::summarize;

    fn summary_with(industry_counts: &[(&str, u32)], size: usize) -> ClusterMetricsSummary {
        // Build through summarize to keep the struct shape honest, then
        // overwrite the counters for precise control.
        let (mut summary, _) = summarize(&[], 0);
        summary.total_jobs = size;
        summary.top_industries = industry_counts
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect();
        summary
    }

    #[test]
    fn test_empty_input_returns_empty_stats() {
        let stats = aggregate(&[]).unwrap();
        assert!(stats.cluster_sizes.is_empty());
        assert!(stats.industry_distribution.is_empty());
        assert!(stats.industry_dominance.is_empty());
    }

    #[test]
    fn test_cluster_size_percentages_sum_over_all_clusters() {
        let a = summary_with(&[], 6);
        let b = summary_with(&[], 4);
        let stats = aggregate(&[(0, &a), (1, &b)]).unwrap();

        assert_eq!(stats.cluster_sizes.len(), 2);
        assert!((stats.cluster_sizes[0].percentage - 60.0).abs() < 1e-9);
        assert!((stats.cluster_sizes[1].percentage - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_industry_dominance_reports_max_cluster_and_share() {
        // health: 5 of 10 in cluster 0, 2 of 8 in cluster 1 -> cluster 0, 50%.
        let a = summary_with(&[("health", 5)], 10);
        let b = summary_with(&[("health", 2)], 8);
        let stats = aggregate(&[(0, &a), (1, &b)]).unwrap();

        let dominance = &stats.industry_dominance[0];
        assert_eq!(dominance.industry, "health");
        assert_eq!(dominance.dominant_cluster, 0);
        assert_eq!(dominance.count, 5);
        assert!((dominance.percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_dominance_tie_breaks_to_lowest_cluster_id() {
        let a = summary_with(&[("finance", 3)], 5);
        let b = summary_with(&[("finance", 3)], 5);
        let stats = aggregate(&[(0, &a), (1, &b)]).unwrap();

        assert_eq!(stats.industry_dominance[0].dominant_cluster, 0);
    }

    #[test]
    fn test_distribution_tracks_counts_per_cluster() {
        let a = summary_with(&[("retail", 4), ("finance", 1)], 5);
        let b = summary_with(&[("retail", 2)], 3);
        let stats = aggregate(&[(0, &a), (1, &b)]).unwrap();

        assert_eq!(stats.industry_distribution["retail"][&0], 4);
        assert_eq!(stats.industry_distribution["retail"][&1], 2);
        assert_eq!(stats.industry_distribution["finance"][&0], 1);
    }

    #[test]
    fn test_zero_size_dominant_cluster_gives_zero_percentage() {
        let a = summary_with(&[("education", 2)], 0);
        let stats = aggregate(&[(0, &a)]).unwrap();
        assert_eq!(stats.industry_dominance[0].percentage, 0.0);
    }

    #[test]
    fn test_dominance_covers_every_industry_seen() {
        let a = summary_with(&[("health", 1), ("finance", 2)], 4);
        let b = summary_with(&[("retail", 3)], 4);
        let stats = aggregate(&[(0, &a), (1, &b)]).unwrap();

        let industries: Vec<&str> = stats
            .industry_dominance
            .iter()
            .map(|d| d.industry.as_str())
            .collect();
        assert_eq!(industries, ["health", "finance", "retail"]);
    }
}
