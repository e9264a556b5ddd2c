//! Tool definitions for MCP tools.
//!
//! Contains the JSON Schema definitions for every [`McpTool`].

use super::ToolDefinition;
use crate::mcp::tool_types::McpTool;
use crate::models::Domain;
use crate::services::{DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use serde_json::{Value, json};

/// Builds the definition for `tool`.
pub fn definition(tool: McpTool) -> ToolDefinition {
    let (description, input_schema) = match tool {
        McpTool::LookupError => (lookup_error_description(), lookup_error_schema()),
        McpTool::GetErrorDetail => (
            "Get full details for a specific error by its ID \
             (e.g., 'python/modulenotfounderror/py311-linux'). \
             Includes all dead ends, workarounds, error chain info, and source evidence."
                .to_string(),
            json!({
                "type": "object",
                "properties": {
                    "error_id": {
                        "type": "string",
                        "description": "The error ID (domain/slug/env)"
                    }
                },
                "required": ["error_id"],
                "additionalProperties": false
            }),
        ),
        McpTool::ListErrorDomains => (
            format!(
                "List all error domains and counts in the deadends database. Domains include: {}.",
                domain_names().join(", ")
            ),
            json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }),
        ),
        McpTool::SearchErrors => (
            "Keyword search over error signatures, summaries, dead ends and workarounds. \
             Use this when you have a description of the problem rather than the exact \
             error text."
                .to_string(),
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Words to search for"
                    },
                    "domain": {
                        "type": "string",
                        "description": "Optional: restrict results to one domain",
                        "enum": domain_names()
                    },
                    "limit": {
                        "type": "integer",
                        "description": format!("Maximum number of results (default: {DEFAULT_SEARCH_LIMIT})"),
                        "minimum": 1,
                        "maximum": MAX_SEARCH_LIMIT
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        ),
        McpTool::DomainStats => (
            "Summary statistics for one domain: error count, average fix rate, \
             resolvability and confidence breakdowns, and the most common categories."
                .to_string(),
            json!({
                "type": "object",
                "properties": {
                    "domain": {
                        "type": "string",
                        "description": "The domain to summarize",
                        "enum": domain_names()
                    }
                },
                "required": ["domain"],
                "additionalProperties": false
            }),
        ),
    };

    ToolDefinition {
        name: tool.name().to_string(),
        description,
        input_schema,
    }
}

fn domain_names() -> Vec<&'static str> {
    Domain::all().iter().map(|d| d.as_str()).collect()
}

fn lookup_error_description() -> String {
    format!(
        "Match an error message against the deadends database of known errors. \
         Returns dead ends (what NOT to try), workarounds (what works), and error \
         chains (what comes next). Use this BEFORE attempting to fix any error to \
         avoid wasting time on approaches that are known to fail. Covers {} domains.",
        Domain::all().len()
    )
}

fn lookup_error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error_message": {
                "type": "string",
                "description": "The full error message to look up"
            }
        },
        "required": ["error_message"],
        "additionalProperties": false
    })
}
