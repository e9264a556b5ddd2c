//! The query facade every front-end talks to.

use super::matcher::{MatchOutcome, match_text};
use super::search::{MAX_SEARCH_LIMIT, search};
use super::stats::domain_stats;
use crate::models::{
    CanonId, Domain, DomainStats, DomainSummary, ErrorCanon, MatchResult, ScoredSummary,
    SignatureEntry,
};
use crate::storage::{CanonStore, Corpus, DEFAULT_SUGGESTION_LIMIT};
use crate::Result;
use std::sync::Arc;

/// Outcome of an id lookup. Not finding an id is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonLookup<'a> {
    /// The canon with that id.
    Found(&'a ErrorCanon),
    /// No such id; near ids that contain it or are contained in it.
    NotFound {
        /// Up to five suggested ids, in load order.
        suggestions: Vec<CanonId>,
    },
}

impl<'a> CanonLookup<'a> {
    /// The canon, if found.
    #[must_use]
    pub const fn found(&self) -> Option<&'a ErrorCanon> {
        match self {
            Self::Found(canon) => Some(canon),
            Self::NotFound { .. } => None,
        }
    }
}

/// Lookup, search and aggregation over a shared [`CanonStore`].
///
/// Cheap to clone; clones share the store and therefore the loaded corpus.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    store: Arc<CanonStore>,
    max_search_limit: usize,
}

impl KnowledgeBase {
    /// Creates a knowledge base over `store`.
    #[must_use]
    pub const fn new(store: Arc<CanonStore>) -> Self {
        Self {
            store,
            max_search_limit: MAX_SEARCH_LIMIT,
        }
    }

    /// Overrides the hard cap on search results.
    #[must_use]
    pub const fn with_max_search_limit(mut self, max: usize) -> Self {
        self.max_search_limit = max;
        self
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &CanonStore {
        &self.store
    }

    /// The loaded corpus, loading it on first use.
    pub fn corpus(&self) -> Result<&Corpus> {
        self.store.load()
    }

    /// Best match for `text`, if any.
    pub fn lookup(&self, text: &str) -> Result<Option<MatchResult>> {
        Ok(self.lookup_all(text)?.matches.into_iter().next())
    }

    /// All matches for `text`, highest fix rate first.
    ///
    /// Blank input returns an empty outcome without touching the corpus.
    pub fn lookup_all(&self, text: &str) -> Result<MatchOutcome> {
        if text.trim().is_empty() {
            return Ok(MatchOutcome::default());
        }
        Ok(match_text(self.corpus()?, text))
    }

    /// Best match per text, in input order. The corpus is loaded once.
    pub fn batch_lookup<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Option<MatchResult>>> {
        let corpus = self.corpus()?;
        Ok(texts
            .iter()
            .map(|t| match_text(corpus, t.as_ref()).matches.into_iter().next())
            .collect())
    }

    /// Keyword search, optionally within one domain.
    pub fn search(
        &self,
        query: &str,
        domain: Option<Domain>,
        limit: usize,
    ) -> Result<Vec<ScoredSummary>> {
        Ok(search(
            self.corpus()?,
            query,
            domain,
            limit,
            self.max_search_limit,
        ))
    }

    /// Looks up a canon by id, with suggestions when absent.
    pub fn get(&self, id: &str) -> Result<CanonLookup<'_>> {
        let corpus = self.corpus()?;
        Ok(match corpus.get(id.trim()) {
            Some(canon) => CanonLookup::Found(canon),
            None => CanonLookup::NotFound {
                suggestions: corpus.suggest_ids(id, DEFAULT_SUGGESTION_LIMIT),
            },
        })
    }

    /// Domains present in the corpus with counts, sorted by domain name.
    ///
    /// With `with_signatures`, each entry lists its canons sorted by id.
    pub fn list_domains(&self, with_signatures: bool) -> Result<Vec<DomainSummary>> {
        let corpus = self.corpus()?;
        let mut summaries: Vec<DomainSummary> = corpus
            .domain_counts()
            .into_iter()
            .map(|(domain, count)| DomainSummary {
                domain,
                count,
                signatures: Vec::new(),
            })
            .collect();
        summaries.sort_by(|a, b| a.domain.as_str().cmp(b.domain.as_str()));

        if with_signatures {
            for summary in &mut summaries {
                summary.signatures = sorted_by_id(corpus.by_domain(summary.domain))
                    .into_iter()
                    .map(|c| SignatureEntry {
                        id: c.id.clone(),
                        signature: c.error.signature.clone(),
                    })
                    .collect();
            }
        }
        Ok(summaries)
    }

    /// Canons in `domain`, sorted by id.
    pub fn list_by_domain(&self, domain: Domain) -> Result<Vec<&ErrorCanon>> {
        Ok(sorted_by_id(self.corpus()?.by_domain(domain)))
    }

    /// Statistics for `domain`.
    pub fn domain_stats(&self, domain: Domain) -> Result<DomainStats> {
        let canons = self.corpus()?.by_domain(domain);
        Ok(domain_stats(domain, &canons))
    }
}

fn sorted_by_id(mut canons: Vec<&ErrorCanon>) -> Vec<&ErrorCanon> {
    canons.sort_by(|a, b| a.id.cmp(&b.id));
    canons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::canon;

    fn kb() -> KnowledgeBase {
        let corpus = Corpus::from_canons(vec![
            canon("python/typeerror/py311", "TypeError", 0.4),
            canon("docker/no-space/docker24", "no space left", 0.6),
            canon("python/keyerror/py311", "KeyError", 0.9),
        ]);
        KnowledgeBase::new(Arc::new(CanonStore::from_corpus(corpus)))
    }

    #[test]
    fn test_lookup_and_lookup_all() {
        let kb = kb();
        let best = kb.lookup("KeyError: 'x'").unwrap().unwrap();
        assert_eq!(best.id, "python/keyerror/py311");
        assert!(kb.lookup("all good").unwrap().is_none());
        assert!(kb.lookup_all("").unwrap().is_empty());
    }

    #[test]
    fn test_batch_lookup_preserves_order() {
        let results = kb()
            .batch_lookup(&["no space left on device", "nothing", "TypeError: x"])
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().id, "docker/no-space/docker24");
        assert!(results[1].is_none());
        assert_eq!(results[2].as_ref().unwrap().id, "python/typeerror/py311");
    }

    #[test]
    fn test_get_found_and_suggestions() {
        let kb = kb();
        assert!(kb.get("python/keyerror/py311").unwrap().found().is_some());
        match kb.get("keyerror").unwrap() {
            CanonLookup::NotFound { suggestions } => {
                assert_eq!(suggestions, vec![CanonId::from("python/keyerror/py311")]);
            },
            CanonLookup::Found(_) => unreachable!("partial id must not resolve"),
        }
    }

    #[test]
    fn test_list_domains_and_by_domain() {
        let kb = kb();
        let domains = kb.list_domains(true).unwrap();
        let names: Vec<_> = domains.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(names, vec!["docker", "python"]);
        assert_eq!(domains[1].count, 2);
        assert_eq!(domains[1].signatures[0].id, "python/keyerror/py311");

        let ids: Vec<_> = kb
            .list_by_domain(Domain::Python)
            .unwrap()
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert_eq!(ids, vec!["python/keyerror/py311", "python/typeerror/py311"]);
    }

    #[test]
    fn test_domain_stats() {
        let stats = kb().domain_stats(Domain::Python).unwrap();
        assert_eq!(stats.total, 2);
        assert!((stats.avg_fix_rate - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_search_respects_max_limit() {
        let kb = kb().with_max_search_limit(1);
        assert_eq!(kb.search("error", None, 10).unwrap().len(), 1);
    }
}
