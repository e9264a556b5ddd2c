//! The `ErrorCanon` record and its parts.
//!
//! One canon describes one error signature in one runtime environment. The
//! JSON field names here are the on-disk record format; optional fields are
//! omitted on write so a record survives a write/read cycle unchanged.

use super::{Domain, Resolvable, ReviewStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable identifier of a canon: `domain/slug/environment-tag`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonId(String);

impl CanonId {
    /// Creates a new canon ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the leading `domain` segment, if the id has one.
    #[must_use]
    pub fn domain_segment(&self) -> Option<&str> {
        self.0.split('/').next().filter(|s| !s.is_empty())
    }
}

impl fmt::Display for CanonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CanonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CanonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for CanonId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A knowledge-base record for one error signature in one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCanon {
    /// Record format version (`MAJOR.MINOR.PATCH`).
    pub schema_version: String,
    /// Globally unique id; the join key for every cross-reference.
    pub id: CanonId,
    /// Canonical url, always `base_url + "/" + id`.
    pub url: String,
    /// The error signature and its recognizer.
    pub error: ErrorInfo,
    /// Execution context this canon applies to.
    pub environment: Environment,
    /// Fixability verdict.
    pub verdict: Verdict,
    /// Actions that do not fix the error.
    pub dead_ends: Vec<DeadEnd>,
    /// Actions that fix or mitigate the error.
    pub workarounds: Vec<Workaround>,
    /// Edges to related canons.
    pub transition_graph: TransitionGraph,
    /// Provenance and review status.
    pub metadata: Metadata,
}

impl ErrorCanon {
    /// Derives the canonical url for this canon under `base_url`.
    #[must_use]
    pub fn expected_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.id)
    }

    /// Total number of sources recorded across dead ends and workarounds.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.dead_ends.iter().map(|d| d.sources.len()).sum::<usize>()
            + self
                .workarounds
                .iter()
                .map(|w| w.sources.len())
                .sum::<usize>()
    }

    /// Unique, sorted source urls across dead ends and workarounds.
    #[must_use]
    pub fn all_sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self
            .dead_ends
            .iter()
            .flat_map(|d| d.sources.iter())
            .chain(self.workarounds.iter().flat_map(|w| w.sources.iter()))
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect();
        sources.sort_unstable();
        sources.dedup();
        sources
    }
}

/// The error signature block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Human-readable canonical form of the message.
    pub signature: String,
    /// Pattern recognizing occurrences of this error in raw text.
    pub regex: String,
    /// Technology area.
    pub domain: Domain,
    /// Free-form category.
    pub category: String,
    /// First sighting (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<String>,
    /// Most recent confirmation (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_confirmed: Option<String>,
}

/// Runtime name and version range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runtime {
    /// Runtime name, e.g. `python`.
    pub name: String,
    /// Version constraint, e.g. `>=3.10`.
    pub version_range: String,
}

/// Execution context a canon applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// The runtime.
    pub runtime: Runtime,
    /// Operating system.
    pub os: String,
    /// Hardware details (GPU, VRAM, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<Map<String, Value>>,
    /// Python version, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    /// Language version, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Any further context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<Map<String, Value>>,
}

impl Environment {
    /// Short human-readable summary, e.g. `python >=3.10 · A100 · 80GB · linux`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} {}", self.runtime.name, self.runtime.version_range)];

        if let Some(hw) = &self.hardware {
            if let Some(gpu) = hw.get("gpu").and_then(Value::as_str) {
                parts.push(gpu.to_string());
                if let Some(vram) = hw.get("vram_gb").filter(|v| !v.is_null()) {
                    parts.push(format!("{vram}GB"));
                }
            }
        }
        if !self.os.is_empty() {
            parts.push(self.os.clone());
        }
        if let Some(python) = &self.python {
            parts.push(format!("Python {python}"));
        }
        if let Some(arch) = self
            .additional
            .as_ref()
            .and_then(|a| a.get("architecture"))
            .and_then(Value::as_str)
        {
            parts.push(arch.to_string());
        }

        parts.join(" · ")
    }
}

/// Fixability verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Coarse verdict.
    pub resolvable: Resolvable,
    /// Observed fix success rate in `[0, 1]`.
    pub fix_success_rate: f64,
    /// Confidence in the verdict in `[0, 1]`.
    pub confidence: f64,
    /// One-paragraph summary.
    pub summary: String,
    /// Date of the last verdict update (`YYYY-MM-DD`).
    pub last_updated: String,
}

/// An action that does not fix the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadEnd {
    /// The action people try.
    pub action: String,
    /// Why it fails.
    pub why_fails: String,
    /// Observed failure rate in `[0, 1]`.
    pub fail_rate: f64,
    /// When this dead end applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// The belief that leads people here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_misconception: Option<String>,
    /// Evidence urls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// An action that fixes or mitigates the error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workaround {
    /// The action.
    pub action: String,
    /// Observed success rate in `[0, 1]`.
    pub success_rate: f64,
    /// Concrete instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how: Option<String>,
    /// What the workaround costs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradeoff: Option<String>,
    /// When this workaround applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Evidence urls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// A probabilistic edge to a following or preceding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionEdge {
    /// Target canon id.
    pub error_id: CanonId,
    /// Edge probability in `[0, 1]`.
    pub probability: f64,
    /// When the transition happens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Typical delay before the next error (only on `leads_to`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typical_delay: Option<String>,
}

/// An edge to an error that is often mistaken for this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionEdge {
    /// Target canon id.
    pub error_id: CanonId,
    /// How to tell the two apart.
    pub distinction: String,
}

/// Per-canon directed edges to related canons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionGraph {
    /// Errors that tend to follow this one.
    pub leads_to: Vec<TransitionEdge>,
    /// Errors that tend to precede this one.
    pub preceded_by: Vec<TransitionEdge>,
    /// Errors commonly confused with this one.
    pub frequently_confused_with: Vec<ConfusionEdge>,
}

impl TransitionGraph {
    /// Returns true if the canon has no edges at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leads_to.is_empty()
            && self.preceded_by.is_empty()
            && self.frequently_confused_with.is_empty()
    }
}

/// Provenance and review status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Tool or person that produced the record.
    pub generated_by: String,
    /// When it was produced.
    pub generation_date: String,
    /// Review state.
    pub review_status: ReviewStatus,
    /// Number of independent evidence items behind the verdict.
    pub evidence_count: u64,
    /// Page view counter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_views: Option<u64>,
    /// Hits from AI agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_agent_hits: Option<u64>,
    /// Hits from humans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_hits: Option<u64>,
    /// Date of the last manual verification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_verification: Option<String>,
}
