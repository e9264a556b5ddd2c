//! MCP tool implementations.
//!
//! - [`definitions`]: tool schema definitions (JSON Schema for input validation)
//! - [`handlers`]: tool execution and markdown rendering

mod definitions;
mod handlers;

pub use handlers::{render_lookup, render_match};

use super::tool_types::{McpTool, ToolCall};
use crate::Result;
use crate::services::{DEFAULT_SEARCH_LIMIT, KnowledgeBase};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info_span;

/// Default number of matches `lookup_error` renders.
pub const DEFAULT_MAX_RENDERED_MATCHES: usize = 5;

/// Registry of MCP tools bound to a knowledge base.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    kb: KnowledgeBase,
    definitions: Vec<ToolDefinition>,
    max_rendered_matches: usize,
    default_search_limit: usize,
}

impl ToolRegistry {
    /// Creates a registry with every [`McpTool`].
    #[must_use]
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            kb,
            definitions: McpTool::all().iter().map(|t| definitions::definition(*t)).collect(),
            max_rendered_matches: DEFAULT_MAX_RENDERED_MATCHES,
            default_search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Sets how many matches `lookup_error` renders.
    #[must_use]
    pub const fn with_max_rendered_matches(mut self, max: usize) -> Self {
        self.max_rendered_matches = max;
        self
    }

    /// Sets the result count `search_errors` uses without a `limit`.
    #[must_use]
    pub const fn with_default_search_limit(mut self, limit: usize) -> Self {
        self.default_search_limit = limit;
        self
    }

    /// The knowledge base the tools query.
    #[must_use]
    pub const fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Returns all tool definitions, in listing order.
    #[must_use]
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Gets a tool definition by name.
    #[must_use]
    pub fn get_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Executes a tool by name.
    ///
    /// Unknown tools, bad arguments and corpus failures all come back as an
    /// error result rather than a protocol error.
    #[must_use]
    pub fn call(&self, name: &str, arguments: Value) -> ToolResult {
        let span = info_span!("mcp.tool.call", tool.name = name, status = tracing::field::Empty);
        let _guard = span.enter();
        let start = Instant::now();

        let result = ToolCall::parse(name, arguments)
            .and_then(|call| self.execute(&call))
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Tool call failed");
                ToolResult::error(e.to_string())
            });

        let status = if result.is_error { "error" } else { "success" };
        span.record("status", status);
        let tool_label = McpTool::parse(name).map_or("unknown", McpTool::name);
        metrics::counter!("mcp_tool_calls_total", "tool" => tool_label, "status" => status)
            .increment(1);
        metrics::histogram!("mcp_tool_duration_ms", "tool" => tool_label)
            .record(start.elapsed().as_secs_f64() * 1000.0);
        result
    }

    /// Executes a parsed tool call.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be loaded.
    pub fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        match call {
            ToolCall::LookupError(args) => {
                handlers::lookup_error(&self.kb, args, self.max_rendered_matches)
            },
            ToolCall::GetErrorDetail(args) => handlers::get_error_detail(&self.kb, args),
            ToolCall::ListErrorDomains(_) => handlers::list_error_domains(&self.kb),
            ToolCall::SearchErrors(args) => {
                handlers::search_errors(&self.kb, args, self.default_search_limit)
            },
            ToolCall::DomainStats(args) => handlers::domain_stats(&self.kb, args),
        }
    }
}

/// Definition of an MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON Schema for input validation.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the result represents an error.
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    /// A single text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// A single text block flagged as an error.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// The text of the first block, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Text { text } => Some(text.as_str()),
        })
    }
}

/// Content types that can be returned by tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{canon, with_leads_to};
    use crate::storage::{CanonStore, Corpus};
    use serde_json::json;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        let chained = with_leads_to(
            canon("python/typeerror/py311", "TypeError: 'NoneType'", 0.85),
            "python/attributeerror/py311",
        );
        let corpus = Corpus::from_canons(vec![
            chained,
            canon("python/attributeerror/py311", "AttributeError", 0.6),
            canon("docker/no-space/docker24", "no space left on device", 0.7),
        ]);
        ToolRegistry::new(KnowledgeBase::new(Arc::new(CanonStore::from_corpus(corpus))))
    }

    #[test]
    fn test_registry_lists_all_tools_in_order() {
        let names: Vec<_> = registry().list_tools().iter().map(|t| t.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "lookup_error",
                "get_error_detail",
                "list_error_domains",
                "search_errors",
                "domain_stats"
            ]
        );
    }

    #[test]
    fn test_definitions_require_arguments() {
        let registry = registry();
        let lookup = registry.get_tool("lookup_error").unwrap();
        assert!(
            lookup.input_schema["required"]
                .as_array()
                .unwrap()
                .contains(&json!("error_message"))
        );
        let stats = registry.get_tool("domain_stats").unwrap();
        assert!(
            stats.input_schema["properties"]["domain"]["enum"]
                .as_array()
                .unwrap()
                .contains(&json!("docker"))
        );
    }

    #[test]
    fn test_call_unknown_tool_is_error_result() {
        let result = registry().call("capture_memory", json!({}));
        assert!(result.is_error);
        assert!(result.first_text().unwrap().contains("Unknown tool: capture_memory"));
    }

    #[test]
    fn test_call_lookup() {
        let result = registry().call(
            "lookup_error",
            json!({"error_message": "TypeError: 'NoneType' object is not subscriptable"}),
        );
        assert!(!result.is_error);
        let text = result.first_text().unwrap();
        assert!(text.starts_with("## TypeError: 'NoneType'"));
        assert!(text.contains("### Next Errors (after fixing this):"));
        assert!(text.contains("- python/attributeerror/py311"));
    }

    #[test]
    fn test_call_bad_arguments_is_error_result() {
        let result = registry().call("search_errors", json!({"q": "memory"}));
        assert!(result.is_error);
    }

    #[test]
    fn test_tool_result_serializes_mcp_shape() {
        let value = serde_json::to_value(ToolResult::error("nope")).unwrap();
        assert_eq!(
            value,
            json!({"content": [{"type": "text", "text": "nope"}], "isError": true})
        );
    }
}
