//! # Deadends
//!
//! A knowledge base of known software error signatures.
//!
//! Every entry (an [`ErrorCanon`]) records, for one error signature in one
//! runtime environment, the actions that do **not** fix it (dead ends), the
//! actions that do (workarounds), and a directed graph of related errors.
//!
//! ## Features
//!
//! - In-memory corpus loaded once from a directory of JSON records
//! - Schema, business-rule and cross-reference validation
//! - Regex matching of raw error text against every canon's own pattern
//! - Weighted keyword search over signatures, summaries and actions
//! - MCP server integration for AI agent interoperability
//!
//! ## Example
//!
//! ```rust,ignore
//! use deadends::{CanonStore, KnowledgeBase};
//! use std::sync::Arc;
//!
//! let store = Arc::new(CanonStore::new("data/canons"));
//! let kb = KnowledgeBase::new(store);
//! if let Some(hit) = kb.lookup("ModuleNotFoundError: No module named 'torch'")? {
//!     println!("{} ({:.0}% fixable)", hit.signature, hit.fix_success_rate * 100.0);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod mcp;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
pub mod validation;

// Re-exports for convenience
pub use config::DeadendsConfig;
pub use models::{
    CanonId, DeadEnd, Domain, ErrorCanon, ErrorInfo, Resolvable, TransitionGraph, Verdict,
    Workaround,
};
pub use services::{KnowledgeBase, MatchOutcome, MatchResult, ScoredSummary};
pub use storage::{CanonStore, Corpus, LoadPolicy};
pub use validation::{ValidationIssue, ValidationReport, Validator};

/// Error type for deadends operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unknown domain or tool, malformed tool arguments, oversize queries |
/// | `Parse` | A canon file is not valid JSON or not a well-formed canon record |
/// | `OperationFailed` | I/O errors, config parsing, logging or metrics initialization |
/// | `FeatureNotEnabled` | Using features requiring compile-time flags |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A canon file could not be parsed.
    ///
    /// Always names the offending file so the caller can report it and decide
    /// whether to keep going.
    #[error("failed to parse {}: {cause}", path.display())]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying parser message.
        cause: String,
    },

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Feature not enabled (requires feature flag).
    #[error("feature not enabled: {0} (compile with --features {0})")]
    FeatureNotEnabled(String),
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation label and any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for deadends operations.
pub type Result<T> = std::result::Result<T, Error>;
