//! Per-cluster metric aggregation: counter sums, top-N selection, and
//! percentage shares.

use indexmap::IndexMap;
use serde::Serialize;

use crate::metrics::extractor::{extract, DocumentMetrics};

const TOP_INDUSTRIES: usize = 3;
const TOP_USE_CASES: usize = 5;

/// Summary statistics for one cluster of postings. Serialized verbatim into
/// the analysis prompts and the final report.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterMetricsSummary {
    pub total_jobs: usize,
    pub top_industries: IndexMap<String, u32>,
    pub top_use_cases: IndexMap<String, u32>,
    pub percentages: PercentageBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct PercentageBreakdown {
    /// Cluster size as a share of the whole corpus, in [0, 100].
    pub cluster_size: f64,
    /// Share of cluster documents hitting each retained top industry.
    pub industry_share: IndexMap<String, f64>,
}

impl ClusterMetricsSummary {
    /// The highest-counted industry and its in-cluster share, or the
    /// placeholder pair when the cluster produced no industry hits.
    pub fn dominant_industry(&self) -> (String, f64) {
        match self.top_industries.first() {
            Some((name, _)) => {
                let share = self
                    .percentages
                    .industry_share
                    .get(name)
                    .copied()
                    .unwrap_or(0.0);
                (name.clone(), share)
            }
            None => ("No dominant industry".to_string(), 0.0),
        }
    }
}

/// Aggregates per-document metrics over one cluster.
///
/// Returns the summary plus the full merged counters (the summary keeps only
/// the top entries; the raw counters are carried into the report unchanged).
pub fn summarize(jobs: &[String], total_jobs: usize) -> (ClusterMetricsSummary, DocumentMetrics) {
    let mut totals = DocumentMetrics::default();
    for job in jobs {
        totals.merge(&extract(job));
    }

    let top_industries = top_n(&totals.industries, TOP_INDUSTRIES);
    let top_use_cases = top_n(&totals.use_cases, TOP_USE_CASES);

    let industry_share = top_industries
        .iter()
        .map(|(name, count)| (name.clone(), percentage(*count as usize, jobs.len())))
        .collect();

    let summary = ClusterMetricsSummary {
        total_jobs: jobs.len(),
        top_industries,
        top_use_cases,
        percentages: PercentageBreakdown {
            cluster_size: percentage(jobs.len(), total_jobs),
            industry_share,
        },
    };

    (summary, totals)
}

/// Selects the `n` highest-counted entries. The sort is stable, so ties keep
/// the counter's first-encountered insertion order.
fn top_n(counter: &IndexMap<String, u32>, n: usize) -> IndexMap<String, u32> {
    let mut entries: Vec<(String, u32)> = counter
        .iter()
        .map(|(name, count)| (name.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.into_iter().take(n).collect()
}

/// `100 * part / whole`, defined as 0 when the denominator is 0.
pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jobs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_summarize_counts_and_percentages() {
        let cluster = jobs(&[
            "Healthcare data engineer to automate claims processing",
            "Medical records platform engineer",
            "Fintech analyst",
        ]);
        let (summary, raw) = summarize(&cluster, 6);

        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.top_industries.get("healthcare"), Some(&2));
        assert_eq!(summary.top_industries.get("finance"), Some(&1));
        assert!((summary.percentages.cluster_size - 50.0).abs() < 1e-9);

        let healthcare_share = summary.percentages.industry_share["healthcare"];
        assert!((healthcare_share - 2.0 / 3.0 * 100.0).abs() < 1e-9);

        // Raw counters keep everything the summary may have truncated.
        assert_eq!(raw.industries.get("healthcare"), Some(&2));
        assert_eq!(
            raw.use_cases.get("to automate claims processing"),
            Some(&1)
        );
    }

    #[test]
    fn test_top_industries_capped_at_three() {
        let cluster = jobs(&[
            "healthcare healthcare",
            "finance role",
            "retail role",
            "education role",
        ]);
        let (summary, _) = summarize(&cluster, 4);
        assert_eq!(summary.top_industries.len(), 3);
    }

    #[test]
    fn test_ties_break_by_first_encounter_order() {
        // finance is seen before retail; both end up with count 1.
        let cluster = jobs(&["banking role", "retail role", "education role", "farming role"]);
        let (summary, _) = summarize(&cluster, 4);
        let names: Vec<&String> = summary.top_industries.keys().collect();
        assert_eq!(names, ["finance", "retail", "education"]);
    }

    #[test]
    fn test_zero_total_corpus_gives_zero_cluster_share() {
        let (summary, _) = summarize(&[], 0);
        assert_eq!(summary.percentages.cluster_size, 0.0);
        assert_eq!(summary.total_jobs, 0);
    }

    #[test]
    fn test_empty_cluster_gives_zero_industry_share() {
        let (summary, _) = summarize(&[], 10);
        assert!(summary.percentages.industry_share.is_empty());
        assert_eq!(summary.percentages.cluster_size, 0.0);
    }

    #[test]
    fn test_percentages_bounded() {
        let cluster = jobs(&["healthcare", "healthcare"]);
        let (summary, _) = summarize(&cluster, 2);
        assert!(summary.percentages.cluster_size >= 0.0);
        assert!(summary.percentages.cluster_size <= 100.0);
        for share in summary.percentages.industry_share.values() {
            assert!(*share >= 0.0 && *share <= 100.0);
        }
    }

    #[test]
    fn test_dominant_industry_placeholder_when_no_hits() {
        let cluster = jobs(&["nothing matching here"]);
        let (summary, _) = summarize(&cluster, 1);
        let (name, share) = summary.dominant_industry();
        assert_eq!(name, "No dominant industry");
        assert_eq!(share, 0.0);
    }

    #[test]
    fn test_dominant_industry_is_highest_counted() {
        let cluster = jobs(&["hospital job", "clinical job", "banking job"]);
        let (summary, _) = summarize(&cluster, 3);
        let (name, share) = summary.dominant_industry();
        assert_eq!(name, "healthcare");
        assert!((share - 2.0 / 3.0 * 100.0).abs() < 1e-9);
    }
}
