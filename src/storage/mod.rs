//! Canon storage.
//!
//! Canons are JSON files under a data directory, grouped by domain and slug.
//! The id inside each file is authoritative, not its path. The whole corpus
//! is read once into memory and never mutated afterwards.

mod canon_store;
mod corpus;
mod discovery;

pub use canon_store::{CanonStore, LoadPolicy};
pub use corpus::{
    Corpus, DEFAULT_SUGGESTION_LIMIT, LoadDiagnostic, LoadedCanon, build_matcher, compile_matcher,
};
pub use discovery::{
    CANON_EXTENSION, canon_path, discover_canon_files, parse_canon, read_canon, write_canon,
};
