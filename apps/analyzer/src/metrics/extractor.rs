//! Metric extraction: scans a single posting for industry keywords and
//! use-case phrase patterns.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Fixed registry of industry names and the keywords that signal them.
pub const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "healthcare",
        &["healthcare", "medical", "hospital", "clinical", "health"],
    ),
    (
        "finance",
        &["finance", "banking", "insurance", "fintech", "trading"],
    ),
    ("retail", &["retail", "e-commerce", "shopping", "marketplace"]),
    (
        "real_estate",
        &["real estate", "property", "housing", "rental"],
    ),
    (
        "education",
        &["education", "learning", "teaching", "academic"],
    ),
    (
        "manufacturing",
        &["manufacturing", "industrial", "factory", "production"],
    ),
    (
        "agriculture",
        &["agriculture", "farming", "crop", "agricultural"],
    ),
];

/// Phrase patterns that capture what employers want built or improved.
static USE_CASE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(?:to|for) (?:automate|improve|enhance|optimize|streamline) [\w\s]+",
        r"(?i)(?:building|developing|creating) (?:an?|the) [\w\s]+ (?:system|solution|platform|tool)",
        r"(?i)(?:help|assist|enable) (?:us|clients|customers) (?:to|with) [\w\s]+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("use-case pattern must compile"))
    .collect()
});

/// Per-document metric counters. Insertion order of keys is preserved so
/// top-N selection downstream can break ties by first encounter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentMetrics {
    pub industries: IndexMap<String, u32>,
    pub use_cases: IndexMap<String, u32>,
}

impl DocumentMetrics {
    /// Adds another document's counters into this one.
    pub fn merge(&mut self, other: &DocumentMetrics) {
        for (industry, count) in &other.industries {
            *self.industries.entry(industry.clone()).or_insert(0) += count;
        }
        for (phrase, count) in &other.use_cases {
            *self.use_cases.entry(phrase.clone()).or_insert(0) += count;
        }
    }
}

/// Extracts industry and use-case counters from one posting.
///
/// An industry is counted at most once per document, no matter how many of
/// its keywords appear. Use-case phrases are normalized (trimmed, lowercased)
/// and every occurrence counts, including repeats of the same phrase.
/// Empty input yields zero counts.
pub fn extract(text: &str) -> DocumentMetrics {
    let mut metrics = DocumentMetrics::default();
    let lowered = text.to_lowercase();

    for (industry, keywords) in INDUSTRY_KEYWORDS {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            *metrics.industries.entry((*industry).to_string()).or_insert(0) += 1;
        }
    }

    for pattern in USE_CASE_PATTERNS.iter() {
        for found in pattern.find_iter(text) {
            let phrase = found.as_str().trim().to_lowercase();
            *metrics.use_cases.entry(phrase).or_insert(0) += 1;
        }
    }

    metrics
}
