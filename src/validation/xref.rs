//! Corpus-wide integrity: duplicate ids and transition-graph edges.
//!
//! The corpus is treated as a graph (nodes are canon ids, edges are
//! transition-graph entries) only here. Query paths need point lookups only.

use super::{IssueKind, ValidationIssue};
use crate::models::{CanonId, ErrorCanon};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which transition-graph list an edge lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `leads_to`.
    LeadsTo,
    /// `preceded_by`.
    PrecededBy,
    /// `frequently_confused_with`.
    FrequentlyConfusedWith,
}

impl EdgeKind {
    /// The field name of the edge list.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LeadsTo => "leads_to",
            Self::PrecededBy => "preceded_by",
            Self::FrequentlyConfusedWith => "frequently_confused_with",
        }
    }

    /// Every edge list, in checking order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::LeadsTo, Self::PrecededBy, Self::FrequentlyConfusedWith]
    }
}

/// The id and outgoing edges of one record, which is all the corpus-wide
/// checks look at.
///
/// Built from a typed canon or from raw JSON, so a record that fails the
/// schema still counts as present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// The record's id.
    pub id: CanonId,
    /// Outgoing edges in checking order.
    pub edges: Vec<(EdgeKind, CanonId)>,
}

impl GraphNode {
    /// Node of a typed canon.
    #[must_use]
    pub fn from_canon(canon: &ErrorCanon) -> Self {
        let graph = &canon.transition_graph;
        let edges = graph
            .leads_to
            .iter()
            .map(|e| (EdgeKind::LeadsTo, e.error_id.clone()))
            .chain(
                graph
                    .preceded_by
                    .iter()
                    .map(|e| (EdgeKind::PrecededBy, e.error_id.clone())),
            )
            .chain(
                graph
                    .frequently_confused_with
                    .iter()
                    .map(|e| (EdgeKind::FrequentlyConfusedWith, e.error_id.clone())),
            )
            .collect();
        Self {
            id: canon.id.clone(),
            edges,
        }
    }

    /// Node of a raw JSON record. `None` when there is no string `id`.
    ///
    /// Edge entries without a string `error_id` are skipped; the schema check
    /// reports them.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let graph = value.get("transition_graph");
        let mut edges = Vec::new();
        for &kind in EdgeKind::all() {
            let Some(list) = graph.and_then(|g| g.get(kind.as_str())).and_then(Value::as_array)
            else {
                continue;
            };
            edges.extend(
                list.iter()
                    .filter_map(|e| e.get("error_id").and_then(Value::as_str))
                    .map(|target| (kind, CanonId::from(target))),
            );
        }
        Some(Self {
            id: CanonId::from(id),
            edges,
        })
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transition-graph edge whose target id is not in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossReferenceError {
    /// Position of the source canon in the validated sequence.
    pub source_index: usize,
    /// Id of the canon holding the edge.
    pub source_id: CanonId,
    /// The missing target id.
    pub target_id: CanonId,
    /// The list the edge lives in.
    pub edge: EdgeKind,
}

impl CrossReferenceError {
    /// Converts to a validation issue.
    #[must_use]
    pub fn to_issue(&self) -> ValidationIssue {
        ValidationIssue::error(IssueKind::CrossReference, self.to_string())
            .at(format!("transition_graph.{}", self.edge))
    }
}

impl fmt::Display for CrossReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: transition_graph.{} references non-existent error '{}'",
            self.source_id, self.edge, self.target_id
        )
    }
}

/// An id that appears more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateIdError {
    /// The repeated id.
    pub id: CanonId,
    /// Position of the first occurrence.
    pub first_index: usize,
    /// Position of this (extra) occurrence.
    pub index: usize,
}

impl DuplicateIdError {
    /// Converts to a validation issue.
    #[must_use]
    pub fn to_issue(&self) -> ValidationIssue {
        ValidationIssue::error(IssueKind::DuplicateId, self.to_string()).at("id")
    }
}

impl fmt::Display for DuplicateIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicate canon ID '{}'; remove the duplicate record",
            self.id
        )
    }
}

/// Reports one error per extra occurrence of an id.
#[must_use]
pub fn validate_unique_ids(nodes: &[GraphNode]) -> Vec<DuplicateIdError> {
    let mut first_seen: HashMap<&CanonId, usize> = HashMap::with_capacity(nodes.len());
    let mut errors = Vec::new();
    for (index, node) in nodes.iter().enumerate() {
        match first_seen.get(&node.id) {
            Some(&first_index) => errors.push(DuplicateIdError {
                id: node.id.clone(),
                first_index,
                index,
            }),
            None => {
                first_seen.insert(&node.id, index);
            },
        }
    }
    errors
}

/// Reports every edge whose target id is not the id of some node.
///
/// Edges are checked in node order, then `leads_to`, `preceded_by`,
/// `frequently_confused_with`, then edge order.
#[must_use]
pub fn validate_cross_references(nodes: &[GraphNode]) -> Vec<CrossReferenceError> {
    let known: HashSet<&CanonId> = nodes.iter().map(|n| &n.id).collect();
    let mut errors = Vec::new();

    for (source_index, node) in nodes.iter().enumerate() {
        for (edge, target) in &node.edges {
            if !known.contains(target) {
                errors.push(CrossReferenceError {
                    source_index,
                    source_id: node.id.clone(),
                    target_id: target.clone(),
                    edge: *edge,
                });
            }
        }
    }

    if !errors.is_empty() {
        tracing::debug!(dangling = errors.len(), "Dangling transition-graph edges");
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{canon, with_leads_to};
    use crate::models::{ConfusionEdge, TransitionEdge};
    use serde_json::json;

    fn nodes(canons: &[&ErrorCanon]) -> Vec<GraphNode> {
        canons.iter().map(|c| GraphNode::from_canon(c)).collect()
    }

    #[test]
    fn test_missing_leads_to_target() {
        let a = with_leads_to(canon("python/a/env", "a", 0.5), "python/b/env");
        let errors = validate_cross_references(&nodes(&[&a]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source_id, "python/a/env");
        assert_eq!(errors[0].target_id, "python/b/env");
        assert_eq!(errors[0].edge, EdgeKind::LeadsTo);
        assert_eq!(
            errors[0].to_string(),
            "python/a/env: transition_graph.leads_to references non-existent error 'python/b/env'"
        );
    }

    #[test]
    fn test_present_target_is_clean() {
        let a = with_leads_to(canon("python/a/env", "a", 0.5), "python/b/env");
        let b = canon("python/b/env", "b", 0.5);
        assert!(validate_cross_references(&nodes(&[&a, &b])).is_empty());
    }

    #[test]
    fn test_all_edge_kinds_checked() {
        let mut a = canon("python/a/env", "a", 0.5);
        a.transition_graph.preceded_by.push(TransitionEdge {
            error_id: CanonId::from("python/x/env"),
            probability: 0.2,
            condition: None,
            typical_delay: None,
        });
        a.transition_graph
            .frequently_confused_with
            .push(ConfusionEdge {
                error_id: CanonId::from("python/y/env"),
                distinction: "different module".to_string(),
            });
        let errors = validate_cross_references(&nodes(&[&a]));
        let kinds: Vec<_> = errors.iter().map(|e| e.edge).collect();
        assert_eq!(kinds, vec![EdgeKind::PrecededBy, EdgeKind::FrequentlyConfusedWith]);
    }

    #[test]
    fn test_self_reference_is_valid() {
        let a = with_leads_to(canon("python/a/env", "a", 0.5), "python/a/env");
        assert!(validate_cross_references(&nodes(&[&a])).is_empty());
    }

    #[test]
    fn test_duplicates_one_error_per_extra() {
        let a = canon("python/a/env", "a", 0.5);
        let b = canon("python/b/env", "b", 0.5);
        let errors = validate_unique_ids(&nodes(&[&a, &b, &a, &a]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].first_index, 0);
        assert_eq!(errors[0].index, 2);
        assert_eq!(errors[1].index, 3);
    }

    #[test]
    fn test_node_from_raw_value_ignores_other_fields() {
        let value = json!({
            "id": "python/a/env",
            "metadata": {"review_status": "pending"},
            "transition_graph": {
                "leads_to": [{"error_id": "python/b/env"}, {"probability": 0.1}],
                "frequently_confused_with": [{"error_id": "python/c/env"}]
            }
        });
        let node = GraphNode::from_value(&value).unwrap();
        assert_eq!(node.id, "python/a/env");
        assert_eq!(
            node.edges,
            vec![
                (EdgeKind::LeadsTo, CanonId::from("python/b/env")),
                (EdgeKind::FrequentlyConfusedWith, CanonId::from("python/c/env")),
            ]
        );
        assert!(GraphNode::from_value(&json!({"id": 7})).is_none());
    }

    #[test]
    fn test_raw_and_typed_nodes_agree() {
        let a = with_leads_to(canon("python/a/env", "a", 0.5), "python/b/env");
        let value = serde_json::to_value(&a).unwrap();
        assert_eq!(GraphNode::from_value(&value), Some(GraphNode::from_canon(&a)));
    }
}
