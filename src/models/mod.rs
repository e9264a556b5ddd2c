//! Data models for deadends.
//!
//! This module contains the canon record and the result types produced by
//! matching, search and aggregation.

mod canon;
mod domain;
mod search;
mod stats;

pub use canon::{
    CanonId, ConfusionEdge, DeadEnd, Environment, ErrorCanon, ErrorInfo, Metadata, Runtime,
    TransitionEdge, TransitionGraph, Verdict, Workaround,
};
pub use domain::{Domain, Resolvable, ReviewStatus};
pub use search::{DeadEndBrief, MatchResult, ScoredSummary, WorkaroundBrief, whole_percent};
pub use stats::{
    CategoryCount, ConfidenceBreakdown, DomainStats, DomainSummary, ResolvableBreakdown,
    SignatureEntry,
};

#[cfg(test)]
pub(crate) mod testing;
