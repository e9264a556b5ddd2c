//! Canon builders shared by unit tests.

use super::{
    CanonId, DeadEnd, Domain, Environment, ErrorCanon, ErrorInfo, Metadata, Resolvable,
    ReviewStatus, Runtime, TransitionEdge, TransitionGraph, Verdict, Workaround,
};

pub const BASE_URL: &str = "https://deadends.dev";

/// A valid `partial` canon under `id`, matching `regex`.
pub fn canon(id: &str, regex: &str, fix_success_rate: f64) -> ErrorCanon {
    let domain = id
        .split('/')
        .next()
        .and_then(Domain::parse)
        .unwrap_or(Domain::Python);
    ErrorCanon {
        schema_version: "1.0.0".to_string(),
        id: CanonId::from(id),
        url: format!("{BASE_URL}/{id}"),
        error: ErrorInfo {
            signature: regex.replace('\\', ""),
            regex: regex.to_string(),
            domain,
            category: "runtime".to_string(),
            first_seen: Some("2024-01-01".to_string()),
            last_confirmed: Some("2025-06-01".to_string()),
        },
        environment: Environment {
            runtime: Runtime {
                name: domain.as_str().to_string(),
                version_range: ">=1.0".to_string(),
            },
            os: "linux".to_string(),
            hardware: None,
            python: None,
            language: None,
            additional: None,
        },
        verdict: Verdict {
            resolvable: Resolvable::Partial,
            fix_success_rate,
            confidence: 0.7,
            summary: "Test summary".to_string(),
            last_updated: "2025-06-01".to_string(),
        },
        dead_ends: vec![DeadEnd {
            action: "Reinstall everything".to_string(),
            why_fails: "Does not address the root cause".to_string(),
            fail_rate: 0.8,
            condition: None,
            common_misconception: None,
            sources: vec!["https://example.com/issue".to_string()],
        }],
        workarounds: vec![Workaround {
            action: "Try this instead".to_string(),
            success_rate: 0.6,
            how: Some("Run the fix command".to_string()),
            tradeoff: None,
            condition: None,
            sources: vec!["https://example.com/fix".to_string()],
        }],
        transition_graph: TransitionGraph::default(),
        metadata: Metadata {
            generated_by: "test".to_string(),
            generation_date: "2025-06-01".to_string(),
            review_status: ReviewStatus::AutoGenerated,
            evidence_count: 10,
            page_views: None,
            ai_agent_hits: None,
            human_hits: None,
            last_verification: None,
        },
    }
}

/// Adds a `leads_to` edge from `canon` to `target`.
pub fn with_leads_to(mut canon: ErrorCanon, target: &str) -> ErrorCanon {
    canon.transition_graph.leads_to.push(TransitionEdge {
        error_id: CanonId::from(target),
        probability: 0.3,
        condition: None,
        typical_delay: None,
    });
    canon
}
