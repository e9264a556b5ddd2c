//! `deadends serve`: run the MCP server.

use super::CliResult;
use crate::config::DeadendsConfig;
use crate::mcp::{McpServer, Transport};
use crate::services::KnowledgeBase;
use crate::validation::ValidationReport;

/// Transport selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ServeTransport {
    /// Line-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC over `POST /mcp`.
    Http,
}

impl From<ServeTransport> for Transport {
    fn from(value: ServeTransport) -> Self {
        match value {
            ServeTransport::Stdio => Self::Stdio,
            ServeTransport::Http => Self::Http,
        }
    }
}

/// Options for [`cmd_serve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ServeOptions {
    /// Transport to serve on.
    pub transport: ServeTransport,
    /// HTTP port; the server default when unset.
    pub port: Option<u16>,
    /// Serve even when the corpus has validation errors.
    pub skip_validation: bool,
}

/// Executes the serve command.
///
/// The corpus is loaded and validated before the server starts, so a broken
/// data directory fails here instead of on the first tool call.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded, fails validation, or the
/// server fails.
pub fn cmd_serve(kb: KnowledgeBase, config: &DeadendsConfig, options: ServeOptions) -> CliResult {
    let corpus = kb.corpus()?;
    tracing::info!(
        canons = corpus.len(),
        domains = corpus.domain_counts().len(),
        "Loaded corpus"
    );

    if !options.skip_validation {
        let report = config.validator().validate_loaded(corpus);
        check_report(&report)?;
    }

    let mut server = McpServer::from_config(kb, config).with_transport(options.transport.into());
    if let Some(port) = options.port {
        server = server.with_port(port);
    }
    tracing::info!(transport = Transport::from(options.transport).as_str(), "Starting MCP server");
    server.start()?;
    Ok(())
}

fn check_report(report: &ValidationReport) -> CliResult {
    for issue in &report.warnings {
        tracing::debug!(message = %issue.message, "Corpus validation warning");
    }
    if report.is_valid() {
        return Ok(());
    }
    for issue in &report.errors {
        tracing::error!(message = %issue.message, field = ?issue.field, "Corpus validation error");
    }
    Err(format!(
        "corpus has {} validation errors; run `deadends validate` or pass --skip-validation",
        report.errors.len()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{IssueKind, ValidationIssue};

    #[test]
    fn test_transport_conversion() {
        assert_eq!(Transport::from(ServeTransport::Stdio), Transport::Stdio);
        assert_eq!(Transport::from(ServeTransport::Http), Transport::Http);
    }

    #[test]
    fn test_check_report() {
        let mut report = ValidationReport::new();
        report.push(ValidationIssue::warning(IssueKind::Aging, "aging"));
        assert!(check_report(&report).is_ok());

        report.push(ValidationIssue::error(IssueKind::DuplicateId, "dup"));
        let err = check_report(&report).unwrap_err();
        assert!(err.to_string().starts_with("corpus has 1 validation errors"));
    }
}
