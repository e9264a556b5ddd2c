//! Property-based tests.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Domain and resolvability parsing roundtrips
//! - Verdict consistency rules hold for every accepted canon
//! - Match ranking is ordered by fix rate
//! - Search never exceeds its limit and never returns zero scores

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::canon_json;
use deadends::models::{Domain, Resolvable};
use deadends::services::{MAX_SEARCH_LIMIT, match_all, search};
use deadends::storage::parse_canon;
use deadends::validation::IssueKind;
use deadends::{Corpus, ErrorCanon, Validator};
use proptest::prelude::*;
use serde_json::json;
use std::path::Path;

fn canon(id: &str, regex: &str, rate: f64) -> ErrorCanon {
    parse_canon(Path::new("mem.json"), &canon_json(id, regex, rate).to_string()).unwrap()
}

proptest! {
    /// Property: `Domain::parse` is case-insensitive and roundtrips through `as_str`.
    #[test]
    fn prop_domain_parse_roundtrips(idx in 0usize..Domain::all().len(), upper in any::<bool>()) {
        let domain = Domain::all()[idx];
        let name = if upper { domain.as_str().to_uppercase() } else { domain.as_str().to_string() };
        prop_assert_eq!(Domain::parse(&name), Some(domain));
    }

    /// Property: unknown domain names never parse.
    #[test]
    fn prop_unknown_domain_rejected(name in "[a-z]{1,12}") {
        let known = Domain::all().iter().any(|d| d.as_str() == name);
        prop_assert_eq!(Domain::parse(&name).is_some(), known);
    }

    /// Property: every canon that validates satisfies the verdict rules.
    #[test]
    fn prop_accepted_verdicts_are_consistent(
        resolvable in prop::sample::select(vec!["true", "partial", "false"]),
        rate in 0.0f64..=1.0,
        confidence in 0.0f64..=1.0,
    ) {
        let mut value = canon_json("python/prop/py311", "Prop", rate);
        value["verdict"]["resolvable"] = json!(resolvable);
        value["verdict"]["confidence"] = json!(confidence);
        value["metadata"]["evidence_count"] = json!(50);
        value["dead_ends"][0]["sources"] = json!(["https://example.com/a"]);

        let report = Validator::new().with_freshness(None).validate_value(&value);
        let consistent = match resolvable {
            "true" => rate >= 0.7 && confidence >= 0.6,
            "false" => rate < 0.2 && confidence >= 0.6,
            _ => true,
        };
        prop_assert_eq!(!report.has_error(IssueKind::VerdictConsistency), consistent);
        if consistent {
            prop_assert!(report.is_valid(), "unexpected: {:?}", report.errors);
        }
    }

    /// Property: out-of-range rates are always rejected.
    #[test]
    fn prop_rates_outside_unit_interval_rejected(fail_rate in 1.0001f64..100.0) {
        let mut value = canon_json("python/prop/py311", "Prop", 0.5);
        value["dead_ends"][0]["fail_rate"] = json!(fail_rate);
        let report = Validator::new().with_freshness(None).validate_value(&value);
        prop_assert!(!report.is_valid());
    }

    /// Property: matches come back ordered by fix rate, highest first.
    #[test]
    fn prop_matches_sorted_by_fix_rate(rates in prop::collection::vec(0.0f64..=1.0, 1..12)) {
        let canons: Vec<_> = rates
            .iter()
            .enumerate()
            .map(|(i, rate)| canon(&format!("python/e{i}/py311"), "ValueError", *rate))
            .collect();
        let corpus = Corpus::from_canons(canons);
        let matches = match_all(&corpus, "ValueError: bad input");
        prop_assert_eq!(matches.len(), rates.len());
        for pair in matches.windows(2) {
            prop_assert!(pair[0].fix_success_rate >= pair[1].fix_success_rate);
        }
    }

    /// Property: search respects limit and cap, and drops zero scores.
    #[test]
    fn prop_search_bounded(limit in 0usize..100, query in "[a-z ]{0,20}") {
        let corpus = Corpus::from_canons(
            (0..60).map(|i| canon(&format!("python/e{i}/py311"), "KeyError", 0.5)),
        );
        let results = search(&corpus, &query, None, limit, MAX_SEARCH_LIMIT);
        prop_assert!(results.len() <= limit.min(MAX_SEARCH_LIMIT));
        prop_assert!(results.iter().all(|r| r.score > 0));
    }

    /// Property: resolvability strings roundtrip through serde.
    #[test]
    fn prop_resolvable_serde(idx in 0usize..3) {
        let value = [Resolvable::True, Resolvable::Partial, Resolvable::False][idx];
        let json = serde_json::to_string(&value).unwrap();
        prop_assert_eq!(serde_json::from_str::<Resolvable>(&json).unwrap(), value);
    }
}
