//! Load-once canon store.

use super::corpus::{Corpus, LoadDiagnostic, LoadedCanon};
use super::discovery::{discover_canon_files, read_canon};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Instant;
use tracing::instrument;

/// What to do with a file that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Abort loading with the parse error.
    #[default]
    FailFast,
    /// Skip the file, recording a diagnostic on the corpus.
    SkipInvalid,
}

/// Helper to acquire mutex lock with poison recovery.
fn acquire_lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Canon store init mutex was poisoned, recovering");
            poisoned.into_inner()
        },
    }
}

/// Reads every canon under a root directory exactly once per store.
///
/// # Concurrency Model
///
/// The corpus lives in a `OnceLock`. The first caller takes the init mutex,
/// reads the directory and publishes the corpus; concurrent first callers
/// block on the mutex and then see the published corpus. A failed load
/// publishes nothing, so the next call retries. After publication every call
/// returns the same `&Corpus` without touching storage.
#[derive(Debug)]
pub struct CanonStore {
    root: PathBuf,
    policy: LoadPolicy,
    corpus: OnceLock<Corpus>,
    init_lock: Mutex<()>,
    loads: AtomicUsize,
}

impl CanonStore {
    /// Creates a store over `root` with the default [`LoadPolicy::FailFast`].
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            policy: LoadPolicy::default(),
            corpus: OnceLock::new(),
            init_lock: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Creates a store whose corpus is already in memory.
    #[must_use]
    pub fn from_corpus(corpus: Corpus) -> Self {
        let store = Self::new(PathBuf::new());
        // Freshly created lock; cannot already be set.
        let _ = store.corpus.set(corpus);
        store
    }

    /// Sets the load policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The load policy.
    #[must_use]
    pub const fn policy(&self) -> LoadPolicy {
        self.policy
    }

    /// Whether the corpus has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.corpus.get().is_some()
    }

    /// How many times this store has read its directory.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }

    /// Returns the corpus, reading the directory on first use.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OperationFailed`] if the directory cannot be
    /// walked, or [`crate::Error::Parse`] for the first malformed file under
    /// [`LoadPolicy::FailFast`].
    pub fn load(&self) -> Result<&Corpus> {
        if let Some(corpus) = self.corpus.get() {
            return Ok(corpus);
        }

        let _guard = acquire_lock(&self.init_lock);
        if let Some(corpus) = self.corpus.get() {
            return Ok(corpus);
        }

        let corpus = self.read_corpus()?;
        Ok(self.corpus.get_or_init(|| corpus))
    }

    #[instrument(name = "corpus.load", skip(self), fields(root = %self.root.display(), policy = ?self.policy))]
    fn read_corpus(&self) -> Result<Corpus> {
        let start = Instant::now();
        self.loads.fetch_add(1, Ordering::AcqRel);

        let files = discover_canon_files(&self.root).inspect_err(|_| {
            metrics::counter!("corpus_load_total", "status" => "error").increment(1);
        })?;

        let mut entries = Vec::with_capacity(files.len());
        let mut diagnostics = Vec::new();
        for path in files {
            match read_canon(&path) {
                Ok(canon) => entries.push(LoadedCanon::new(path, canon)),
                Err(e) if self.policy == LoadPolicy::SkipInvalid => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping invalid canon file");
                    diagnostics.push(LoadDiagnostic {
                        path,
                        message: e.to_string(),
                    });
                },
                Err(e) => {
                    metrics::counter!("corpus_load_total", "status" => "error").increment(1);
                    return Err(e);
                },
            }
        }

        let corpus = Corpus::new(entries, diagnostics);
        let elapsed_ms = start.elapsed().as_millis();
        metrics::counter!("corpus_load_total", "status" => "success").increment(1);
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("corpus_canons").set(corpus.len() as f64);
        tracing::info!(
            canons = corpus.len(),
            skipped = corpus.diagnostics().len(),
            elapsed_ms,
            "Loaded canon corpus"
        );
        Ok(corpus)
    }
}
