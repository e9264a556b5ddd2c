//! Weighted keyword search over canon text fields.
//!
//! A crude relevance model: no stemming, no IDF, no stopwords. Each distinct
//! lowercase query word scores once per field it appears in as a substring.

use crate::models::{Domain, ErrorCanon, ScoredSummary};
use crate::storage::Corpus;
use std::collections::HashSet;

/// Weight of a query word found in the signature.
pub const SIGNATURE_WEIGHT: u32 = 10;
/// Weight of a query word found in the verdict summary.
pub const SUMMARY_WEIGHT: u32 = 5;
/// Weight per dead end whose action or explanation contains the word.
pub const DEAD_END_WEIGHT: u32 = 3;
/// Weight per workaround whose action contains the word.
pub const WORKAROUND_WEIGHT: u32 = 3;

/// Default number of results.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Hard cap on results regardless of the requested limit.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Lowercased, de-duplicated, whitespace-delimited query words.
fn query_words(query: &str) -> HashSet<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Score of one canon against a set of query words.
#[must_use]
pub fn score_canon(canon: &ErrorCanon, words: &HashSet<String>) -> u32 {
    let signature = canon.error.signature.to_lowercase();
    let summary = canon.verdict.summary.to_lowercase();
    let dead_ends: Vec<(String, String)> = canon
        .dead_ends
        .iter()
        .map(|d| (d.action.to_lowercase(), d.why_fails.to_lowercase()))
        .collect();
    let workarounds: Vec<String> = canon
        .workarounds
        .iter()
        .map(|w| w.action.to_lowercase())
        .collect();

    let mut score = 0;
    for word in words {
        let word = word.as_str();
        if signature.contains(word) {
            score += SIGNATURE_WEIGHT;
        }
        if summary.contains(word) {
            score += SUMMARY_WEIGHT;
        }
        for (action, why) in &dead_ends {
            if action.contains(word) || why.contains(word) {
                score += DEAD_END_WEIGHT;
            }
        }
        for action in &workarounds {
            if action.contains(word) {
                score += WORKAROUND_WEIGHT;
            }
        }
    }
    score
}

/// Scores canons (optionally in one domain) against `query`.
///
/// Zero-score canons are dropped; the rest are ordered by score, highest
/// first, and truncated to `limit` capped at `max_limit`. Ties keep load
/// order, which callers should treat as unspecified.
#[must_use]
pub fn search(
    corpus: &Corpus,
    query: &str,
    domain: Option<Domain>,
    limit: usize,
    max_limit: usize,
) -> Vec<ScoredSummary> {
    metrics::counter!("canon_search_queries_total").increment(1);
    let words = query_words(query);
    if words.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredSummary> = corpus
        .canons()
        .filter(|c| domain.is_none_or(|d| c.error.domain == d))
        .filter_map(|c| {
            let score = score_canon(c, &words);
            (score > 0).then(|| ScoredSummary::new(c, score))
        })
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit.min(max_limit));
    tracing::debug!(results = scored.len(), ?domain, "Keyword search");
    scored
}
