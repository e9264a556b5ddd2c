//! The in-memory, read-only corpus.

use crate::models::{CanonId, Domain, ErrorCanon};
use regex::{Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Upper bound on the compiled size of one canon pattern.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Default number of near-id suggestions.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Builds a canon pattern the way matching uses it: case-insensitive, with a
/// bounded compiled size. Validation uses the same builder.
///
/// # Errors
///
/// Returns the [`regex::Error`] when the pattern does not compile or exceeds
/// the size limit.
pub fn build_matcher(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
}

/// Compiles a canon pattern for matching.
///
/// Returns `None` when the pattern does not compile.
#[must_use]
pub fn compile_matcher(pattern: &str) -> Option<Regex> {
    build_matcher(pattern).ok()
}

/// A canon together with the file it came from and its compiled matcher.
#[derive(Debug)]
pub struct LoadedCanon {
    path: PathBuf,
    canon: ErrorCanon,
    matcher: Option<Regex>,
}

impl LoadedCanon {
    /// Wraps a parsed canon, compiling its pattern once.
    #[must_use]
    pub fn new(path: PathBuf, canon: ErrorCanon) -> Self {
        let matcher = compile_matcher(&canon.error.regex);
        if matcher.is_none() {
            tracing::debug!(
                id = %canon.id,
                path = %path.display(),
                "Canon regex does not compile; excluded from matching"
            );
        }
        Self {
            path,
            canon,
            matcher,
        }
    }

    /// The source file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The canon record.
    #[must_use]
    pub const fn canon(&self) -> &ErrorCanon {
        &self.canon
    }

    /// The compiled pattern, if it compiled.
    #[must_use]
    pub const fn matcher(&self) -> Option<&Regex> {
        self.matcher.as_ref()
    }
}

/// A file that could not be loaded under [`LoadPolicy::SkipInvalid`].
///
/// [`LoadPolicy::SkipInvalid`]: super::LoadPolicy::SkipInvalid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    /// The offending file.
    pub path: PathBuf,
    /// What went wrong.
    pub message: String,
}

/// Every loaded canon in load order, plus secondary indices.
///
/// Immutable once built; readers need no locking.
#[derive(Debug, Default)]
pub struct Corpus {
    entries: Vec<LoadedCanon>,
    by_id: HashMap<CanonId, usize>,
    by_domain: OnceLock<BTreeMap<Domain, Vec<usize>>>,
    diagnostics: Vec<LoadDiagnostic>,
}

impl Corpus {
    /// Builds a corpus from loaded entries, in the given order.
    ///
    /// On duplicate ids the first entry wins the id index; the validator
    /// reports the duplicates.
    #[must_use]
    pub fn new(entries: Vec<LoadedCanon>, diagnostics: Vec<LoadDiagnostic>) -> Self {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_id.entry(entry.canon.id.clone()).or_insert(idx);
        }
        Self {
            entries,
            by_id,
            by_domain: OnceLock::new(),
            diagnostics,
        }
    }

    /// Builds a corpus from in-memory canons. Each path is `<id>.json`.
    #[must_use]
    pub fn from_canons(canons: impl IntoIterator<Item = ErrorCanon>) -> Self {
        let entries = canons
            .into_iter()
            .map(|c| LoadedCanon::new(PathBuf::from(format!("{}.json", c.id)), c))
            .collect();
        Self::new(entries, Vec::new())
    }

    /// Number of canons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the corpus has no canons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loaded entries in load order.
    #[must_use]
    pub fn entries(&self) -> &[LoadedCanon] {
        &self.entries
    }

    /// Canons in load order.
    pub fn canons(&self) -> impl Iterator<Item = &ErrorCanon> {
        self.entries.iter().map(LoadedCanon::canon)
    }

    /// Files skipped during loading.
    #[must_use]
    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    /// Looks up a canon by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ErrorCanon> {
        self.by_id
            .get(&CanonId::from(id))
            .map(|&idx| &self.entries[idx].canon)
    }

    /// Whether `id` is a known canon id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(&CanonId::from(id))
    }

    /// Canons in `domain`, in load order.
    #[must_use]
    pub fn by_domain(&self, domain: Domain) -> Vec<&ErrorCanon> {
        self.domain_index()
            .get(&domain)
            .map(|idxs| idxs.iter().map(|&i| &self.entries[i].canon).collect())
            .unwrap_or_default()
    }

    /// Domains present in the corpus with their canon counts, sorted by domain.
    #[must_use]
    pub fn domain_counts(&self) -> BTreeMap<Domain, usize> {
        self.domain_index()
            .iter()
            .map(|(d, idxs)| (*d, idxs.len()))
            .collect()
    }

    /// Up to `limit` ids containing `query` or contained in it, in load order.
    #[must_use]
    pub fn suggest_ids(&self, query: &str, limit: usize) -> Vec<CanonId> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .map(|e| &e.canon.id)
            .filter(|id| id.as_str().contains(query) || query.contains(id.as_str()))
            .take(limit)
            .cloned()
            .collect()
    }

    fn domain_index(&self) -> &BTreeMap<Domain, Vec<usize>> {
        self.by_domain.get_or_init(|| {
            let mut index: BTreeMap<Domain, Vec<usize>> = BTreeMap::new();
            for (idx, entry) in self.entries.iter().enumerate() {
                index.entry(entry.canon.error.domain).or_default().push(idx);
            }
            index
        })
    }
}
