//! CLI command implementations.
//!
//! Each submodule renders one command's output to any [`std::io::Write`], so
//! the binary stays a thin dispatcher and the rendering is testable.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lookup` | Match an error message, print the top matches |
//! | `search` | Keyword search, optionally within a domain |
//! | `show` | Print one canon as JSON |
//! | `domains` | List domains with counts |
//! | `stats` | Per-domain statistics |
//! | `validate` | Validate a data directory |
//! | `serve` | Run as MCP server (stdio or HTTP) |
//! | `config` | Show the effective configuration |
//!
//! # Example Usage
//!
//! ```bash
//! deadends lookup "ModuleNotFoundError: No module named 'torch'"
//! deadends search "memory limit" --domain docker
//! deadends validate --data-dir data/canons
//! ```

mod config;
mod domains;
mod lookup;
mod search;
mod serve;
mod show;
mod stats;
mod validate;

pub use config::cmd_config;
pub use domains::cmd_domains;
pub use lookup::{LOOKUP_TOP_MATCHES, cmd_lookup, write_lookup};
pub use search::cmd_search;
pub use serve::{ServeOptions, ServeTransport, cmd_serve};
pub use show::cmd_show;
pub use stats::cmd_stats;
pub use validate::{cmd_validate, write_report};

use serde::Serialize;
use std::io::Write;

/// Result type for CLI commands.
pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format (default).
    #[default]
    Table,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

/// Writes `value` as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> CliResult {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Writes `value` as YAML.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_yaml<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> CliResult {
    let yaml = serde_yaml_ng::to_string(value)?;
    write!(writer, "{yaml}")?;
    Ok(())
}
