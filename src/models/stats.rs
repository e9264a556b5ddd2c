//! Read-only rollups over the corpus.

use super::{CanonId, Domain};
use serde::{Deserialize, Serialize};

/// Count of canons per resolvability verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvableBreakdown {
    /// `resolvable = "true"`.
    #[serde(rename = "true")]
    pub yes: usize,
    /// `resolvable = "partial"`.
    pub partial: usize,
    /// `resolvable = "false"`.
    #[serde(rename = "false")]
    pub no: usize,
}

/// Count of canons per confidence bucket.
///
/// Buckets are `low` (≤ 0.3), `medium` (0.3 to 0.6) and `high` (≥ 0.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    /// Confidence at most 0.3.
    pub low: usize,
    /// Confidence strictly between 0.3 and 0.6.
    pub medium: usize,
    /// Confidence at least 0.6.
    pub high: usize,
}

/// One category and the number of canons in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Category name.
    pub category: String,
    /// Number of canons.
    pub count: usize,
}

/// Statistics for a single domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainStats {
    /// The domain.
    pub domain: Domain,
    /// Number of canons.
    pub total: usize,
    /// Mean fix success rate, rounded to two decimals (0 when empty).
    pub avg_fix_rate: f64,
    /// Resolvability breakdown.
    pub resolvable: ResolvableBreakdown,
    /// Confidence breakdown.
    pub confidence: ConfidenceBreakdown,
    /// Most common categories, most frequent first.
    pub top_categories: Vec<CategoryCount>,
}

/// A domain with its canon count, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSummary {
    /// The domain.
    pub domain: Domain,
    /// Number of canons.
    pub count: usize,
    /// Signatures in the domain, sorted by id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SignatureEntry>,
}

/// An id paired with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// Canon id.
    pub id: CanonId,
    /// Display signature.
    pub signature: String,
}
