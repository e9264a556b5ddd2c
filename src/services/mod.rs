//! Query services.
//!
//! Matching, search and aggregation over a loaded corpus, plus the
//! [`KnowledgeBase`] facade that ties them to a shared [`CanonStore`].
//!
//! [`CanonStore`]: crate::storage::CanonStore

mod knowledge_base;
mod matcher;
mod search;
mod stats;

pub use crate::models::{MatchResult, ScoredSummary};
pub use knowledge_base::{CanonLookup, KnowledgeBase};
pub use matcher::{MatchOutcome, UNKNOWN_DOMAIN, match_all, match_text, suggest_domains};
pub use search::{
    DEAD_END_WEIGHT, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT, SIGNATURE_WEIGHT, SUMMARY_WEIGHT,
    WORKAROUND_WEIGHT, score_canon, search,
};
pub use stats::{TOP_CATEGORIES, domain_stats};
