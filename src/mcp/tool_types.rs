//! Tool names and argument types.
//!
//! All argument types use `#[serde(deny_unknown_fields)]`; a misspelled
//! argument is reported to the caller instead of being ignored.

use crate::models::Domain;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Tools exposed over MCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpTool {
    /// Match raw error text.
    LookupError,
    /// Full record by id.
    GetErrorDetail,
    /// Domains with counts.
    ListErrorDomains,
    /// Keyword search.
    SearchErrors,
    /// Per-domain rollup.
    DomainStats,
}

impl McpTool {
    /// Tool name on the wire.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LookupError => "lookup_error",
            Self::GetErrorDetail => "get_error_detail",
            Self::ListErrorDomains => "list_error_domains",
            Self::SearchErrors => "search_errors",
            Self::DomainStats => "domain_stats",
        }
    }

    /// All tools, in listing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::LookupError,
            Self::GetErrorDetail,
            Self::ListErrorDomains,
            Self::SearchErrors,
            Self::DomainStats,
        ]
    }

    /// Parses a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for McpTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments for `lookup_error`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupErrorArgs {
    /// The full error message to look up.
    pub error_message: String,
}

/// Arguments for `get_error_detail`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetErrorDetailArgs {
    /// The error id (`domain/slug/env`).
    pub error_id: String,
}

/// Arguments for `list_error_domains`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListErrorDomainsArgs {}

/// Arguments for `search_errors`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchErrorsArgs {
    /// Free-text query.
    pub query: String,
    /// Restrict to one domain.
    pub domain: Option<Domain>,
    /// Maximum results (default 10, capped at 50).
    pub limit: Option<usize>,
}

/// Arguments for `domain_stats`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainStatsArgs {
    /// The domain to summarize.
    pub domain: Domain,
}

/// A tool invocation with typed arguments.
#[derive(Debug, Clone)]
pub enum ToolCall {
    /// `lookup_error`.
    LookupError(LookupErrorArgs),
    /// `get_error_detail`.
    GetErrorDetail(GetErrorDetailArgs),
    /// `list_error_domains`.
    ListErrorDomains(ListErrorDomainsArgs),
    /// `search_errors`.
    SearchErrors(SearchErrorsArgs),
    /// `domain_stats`.
    DomainStats(DomainStatsArgs),
}

impl ToolCall {
    /// Parses a tool name and its JSON arguments.
    ///
    /// A missing or `null` argument object is treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an unknown tool or arguments that
    /// do not match the tool's shape.
    pub fn parse(name: &str, arguments: Value) -> Result<Self> {
        let tool =
            McpTool::parse(name).ok_or_else(|| Error::InvalidInput(format!("Unknown tool: {name}")))?;
        let arguments = if arguments.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            arguments
        };

        Ok(match tool {
            McpTool::LookupError => Self::LookupError(parse_args(tool, arguments)?),
            McpTool::GetErrorDetail => Self::GetErrorDetail(parse_args(tool, arguments)?),
            McpTool::ListErrorDomains => Self::ListErrorDomains(parse_args(tool, arguments)?),
            McpTool::SearchErrors => Self::SearchErrors(parse_args(tool, arguments)?),
            McpTool::DomainStats => Self::DomainStats(parse_args(tool, arguments)?),
        })
    }

    /// The tool this call targets.
    #[must_use]
    pub const fn tool(&self) -> McpTool {
        match self {
            Self::LookupError(_) => McpTool::LookupError,
            Self::GetErrorDetail(_) => McpTool::GetErrorDetail,
            Self::ListErrorDomains(_) => McpTool::ListErrorDomains,
            Self::SearchErrors(_) => McpTool::SearchErrors,
            Self::DomainStats(_) => McpTool::DomainStats,
        }
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: McpTool, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::InvalidInput(format!("Invalid arguments for {tool}: {e}")))
}
