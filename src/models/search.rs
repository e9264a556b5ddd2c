//! Result types returned by matching and search.

use super::{CanonId, DeadEnd, Domain, ErrorCanon, Resolvable, Workaround};
use serde::{Deserialize, Serialize};

/// A rate in `[0, 1]` as a whole percentage, truncated (0.289 is 28).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn whole_percent(rate: f64) -> i64 {
    (rate * 100.0) as i64
}

/// A dead end condensed to what a caller needs to avoid it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadEndBrief {
    /// The action people try.
    pub action: String,
    /// Why it fails.
    pub why_fails: String,
    /// Observed failure rate.
    pub fail_rate: f64,
}

impl From<&DeadEnd> for DeadEndBrief {
    fn from(d: &DeadEnd) -> Self {
        Self {
            action: d.action.clone(),
            why_fails: d.why_fails.clone(),
            fail_rate: d.fail_rate,
        }
    }
}

/// A workaround condensed to what a caller needs to apply it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkaroundBrief {
    /// The action.
    pub action: String,
    /// Observed success rate.
    pub success_rate: f64,
    /// Concrete instructions, empty when the canon records none.
    pub how: String,
}

impl From<&Workaround> for WorkaroundBrief {
    fn from(w: &Workaround) -> Self {
        Self {
            action: w.action.clone(),
            success_rate: w.success_rate,
            how: w.how.clone().unwrap_or_default(),
        }
    }
}

/// A canon whose regex matched the input text.
///
/// Carries enough of the canon to answer the query without a second lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Canon id.
    pub id: CanonId,
    /// Display signature.
    pub signature: String,
    /// Technology area.
    pub domain: Domain,
    /// Fixability verdict.
    pub resolvable: Resolvable,
    /// Observed fix success rate.
    pub fix_success_rate: f64,
    /// Verdict summary.
    pub summary: String,
    /// Condensed dead ends, in record order.
    pub dead_ends: Vec<DeadEndBrief>,
    /// Condensed workarounds, in record order.
    pub workarounds: Vec<WorkaroundBrief>,
    /// Ids of errors that tend to follow this one.
    pub leads_to: Vec<CanonId>,
    /// Canonical url.
    pub url: String,
}

impl From<&ErrorCanon> for MatchResult {
    fn from(canon: &ErrorCanon) -> Self {
        Self {
            id: canon.id.clone(),
            signature: canon.error.signature.clone(),
            domain: canon.error.domain,
            resolvable: canon.verdict.resolvable,
            fix_success_rate: canon.verdict.fix_success_rate,
            summary: canon.verdict.summary.clone(),
            dead_ends: canon.dead_ends.iter().map(DeadEndBrief::from).collect(),
            workarounds: canon.workarounds.iter().map(WorkaroundBrief::from).collect(),
            leads_to: canon
                .transition_graph
                .leads_to
                .iter()
                .map(|e| e.error_id.clone())
                .collect(),
            url: canon.url.clone(),
        }
    }
}

/// A keyword search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSummary {
    /// Total keyword score (always greater than zero).
    pub score: u32,
    /// Canon id.
    pub id: CanonId,
    /// Display signature.
    pub signature: String,
    /// Technology area.
    pub domain: Domain,
    /// Fixability verdict.
    pub resolvable: Resolvable,
    /// Observed fix success rate.
    pub fix_success_rate: f64,
    /// Verdict summary.
    pub summary: String,
}

impl ScoredSummary {
    /// Builds a summary of `canon` with the given score.
    #[must_use]
    pub fn new(canon: &ErrorCanon, score: u32) -> Self {
        Self {
            score,
            id: canon.id.clone(),
            signature: canon.error.signature.clone(),
            domain: canon.error.domain,
            resolvable: canon.verdict.resolvable,
            fix_success_rate: canon.verdict.fix_success_rate,
            summary: canon.verdict.summary.clone(),
        }
    }
}
