//! Source corpus intake: splits the scraped job-description blob into
//! individual postings and deduplicates them.

use indexmap::IndexSet;

/// Literal line that separates individual postings in the scraped blob.
pub const POSTING_DELIMITER: &str = "_____________\n";

/// Splits the raw corpus into trimmed, deduplicated postings.
///
/// Duplicate postings (exact string equality after trimming) collapse to a
/// single entry. First-encounter order is preserved so downstream clustering
/// sees a stable document ordering across runs.
pub fn split_postings(content: &str) -> Vec<String> {
    let mut unique: IndexSet<String> = IndexSet::new();
    for segment in content.split(POSTING_DELIMITER) {
        let trimmed = segment.trim();
        if !trimmed.is_empty() {
            unique.insert(trimmed.to_string());
        }
    }
    unique.into_iter().collect()
}
