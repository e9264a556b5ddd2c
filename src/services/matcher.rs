//! Regex matching of raw error text against every canon's own pattern.

use crate::models::{Domain, MatchResult};
use crate::storage::Corpus;
use serde::Serialize;

/// Characteristic substrings per domain, checked against lowercased text.
const DOMAIN_KEYWORDS: &[(Domain, &[&str])] = &[
    (Domain::Python, &["python", "pip", "import", "module", "traceback", "def "]),
    (Domain::Node, &["node", "npm", "require", "module.exports", "package.json"]),
    (Domain::Docker, &["docker", "container", "image", "dockerfile", "daemon"]),
    (Domain::Git, &["git", "commit", "push", "merge", "branch", "repository"]),
    (Domain::Cuda, &["cuda", "gpu", "nvidia", "torch", "tensor", "nccl"]),
    (Domain::Typescript, &["typescript", "ts2", "ts7", "tsconfig", ".ts "]),
    (Domain::Rust, &["rust", "cargo", "borrow", "lifetime", "e0"]),
    (Domain::Go, &["go ", "golang", "goroutine", "go.mod", "go build"]),
    (Domain::Kubernetes, &["kubernetes", "k8s", "kubectl", "pod", "deploy"]),
    (Domain::Terraform, &["terraform", "tf ", "state", "provider", "hcl"]),
    (Domain::Aws, &["aws", "s3", "ec2", "iam", "lambda", "cloudformation"]),
    (Domain::Nextjs, &["next.js", "nextjs", "next/", "getserverside", "getstaticprops"]),
    (Domain::React, &["react", "usestate", "useeffect", "jsx", "component"]),
    (Domain::Pip, &["pip install", "pip3", "pypi", "wheel", "sdist"]),
];

/// Placeholder suggestion when no keyword hits.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Result of matching one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Matching canons, highest fix rate first.
    pub matches: Vec<MatchResult>,
    /// Comma-joined likely domains; only computed when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_domains: Option<String>,
}

impl MatchOutcome {
    /// The best match, if any.
    #[must_use]
    pub fn best(&self) -> Option<&MatchResult> {
        self.matches.first()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Domains whose keywords appear in `text`, comma-joined, or `"unknown"`.
#[must_use]
pub fn suggest_domains(text: &str) -> String {
    let text = text.to_lowercase();
    let hits: Vec<&str> = DOMAIN_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(domain, _)| domain.as_str())
        .collect();
    if hits.is_empty() {
        UNKNOWN_DOMAIN.to_string()
    } else {
        hits.join(", ")
    }
}

/// Every canon whose pattern matches `text`, highest fix rate first.
///
/// Canons whose pattern does not compile are skipped. Ties keep load order,
/// which callers should treat as unspecified.
#[must_use]
pub fn match_all(corpus: &Corpus, text: &str) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = corpus
        .entries()
        .iter()
        .filter(|entry| entry.matcher().is_some_and(|re| re.is_match(text)))
        .map(|entry| MatchResult::from(entry.canon()))
        .collect();
    matches.sort_by(|a, b| b.fix_success_rate.total_cmp(&a.fix_success_rate));
    matches
}

/// Matches `text` and, when nothing matches, suggests likely domains.
///
/// Blank input matches nothing and is not scanned.
#[must_use]
pub fn match_text(corpus: &Corpus, text: &str) -> MatchOutcome {
    metrics::counter!("canon_match_queries_total").increment(1);
    if text.trim().is_empty() {
        return MatchOutcome::default();
    }

    let matches = match_all(corpus, text);
    tracing::debug!(matches = matches.len(), "Matched error text");
    let suggested_domains = matches.is_empty().then(|| suggest_domains(text));
    MatchOutcome {
        matches,
        suggested_domains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::canon;
    use test_case::test_case;

    #[test]
    fn test_higher_fix_rate_ranks_first() {
        let corpus = Corpus::from_canons(vec![
            canon("python/low/env", "TypeError", 0.4),
            canon("python/high/env", "TypeError: .+", 0.9),
        ]);
        let matches = match_all(&corpus, "TypeError: bad operand");
        let ids: Vec<_> = matches.iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["python/high/env", "python/low/env"]);
    }

    #[test]
    fn test_nonetype_scenario() {
        let corpus = Corpus::from_canons(vec![
            canon(
                "python/typeerror-nonetype-not-subscriptable/py311",
                r"TypeError: 'NoneType' object is not subscriptable",
                0.85,
            ),
            canon("docker/no-space/docker24", "no space left on device", 0.5),
        ]);
        let outcome = match_text(
            &corpus,
            "TypeError: 'NoneType' object is not subscriptable: line 12",
        );
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(
            outcome.best().unwrap().id,
            "python/typeerror-nonetype-not-subscriptable/py311"
        );
        assert!(outcome.suggested_domains.is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let corpus = Corpus::from_canons(vec![canon("docker/x/env", "No space left", 0.5)]);
        assert_eq!(match_all(&corpus, "write /tmp: NO SPACE LEFT on device").len(), 1);
    }

    #[test]
    fn test_bad_regex_skipped_not_fatal() {
        let corpus = Corpus::from_canons(vec![
            canon("python/bad/env", "([unclosed", 0.99),
            canon("python/good/env", "unclosed", 0.5),
        ]);
        let matches = match_all(&corpus, "([unclosed");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "python/good/env");
    }

    #[test]
    fn test_no_match_suggests_domains() {
        let corpus = Corpus::from_canons(vec![canon("python/x/env", "KeyError", 0.5)]);
        let outcome = match_text(&corpus, "kubectl apply failed: pod stuck");
        assert!(outcome.is_empty());
        assert_eq!(outcome.suggested_domains.as_deref(), Some("kubernetes"));
    }

    #[test]
    fn test_blank_input_is_empty() {
        let corpus = Corpus::from_canons(vec![canon("python/x/env", ".*", 0.5)]);
        let outcome = match_text(&corpus, "   ");
        assert!(outcome.is_empty());
        assert!(outcome.suggested_domains.is_none());
    }

    #[test_case("ModuleNotFoundError: No module named 'torch'", "python, cuda")]
    #[test_case("npm ERR! code ERESOLVE", "node")]
    #[test_case("error[E0382]: borrow of moved value", "rust")]
    #[test_case("something odd happened", "unknown")]
    fn test_suggest_domains(text: &str, expected: &str) {
        assert_eq!(suggest_domains(text), expected);
    }

    #[test]
    fn test_match_result_carries_leads_to() {
        let c = crate::models::testing::with_leads_to(
            canon("python/a/env", "KeyError", 0.5),
            "python/b/env",
        );
        let corpus = Corpus::from_canons(vec![c]);
        let m = &match_all(&corpus, "KeyError: 'x'")[0];
        assert_eq!(m.leads_to, vec![crate::models::CanonId::from("python/b/env")]);
        assert_eq!(m.url, "https://deadends.dev/python/a/env");
        assert_eq!(m.workarounds[0].how, "Run the fix command");
    }
}
