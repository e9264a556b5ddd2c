//! MCP server implementation.
//!
//! Exposes the knowledge base to AI agents over the Model Context Protocol.
//!
//! ## Tools
//!
//! `lookup_error`, `get_error_detail`, `list_error_domains`, `search_errors`,
//! `domain_stats`.
//!
//! ## Usage
//!
//! ```bash
//! deadends serve                              # stdio
//! deadends serve --transport http --port 8080 # requires the http feature
//! ```
//!
//! ### Client configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "deadends": {
//!       "command": "deadends",
//!       "args": ["serve", "--data-dir", "/path/to/data/canons"]
//!     }
//!   }
//! }
//! ```

mod dispatch;
mod server;
mod tool_types;
mod tools;

pub use dispatch::{METHOD_NOT_FOUND, McpMethod, UnknownMethod};
pub use server::{
    DEFAULT_HTTP_PORT, MAX_REQUEST_BODY_SIZE, McpServer, PROTOCOL_VERSION, RateLimitConfig,
    SERVER_NAME, Transport,
};
pub use tool_types::{
    DomainStatsArgs, GetErrorDetailArgs, ListErrorDomainsArgs, LookupErrorArgs, McpTool,
    SearchErrorsArgs, ToolCall,
};
pub use tools::{
    DEFAULT_MAX_RENDERED_MATCHES, ToolContent, ToolDefinition, ToolRegistry, ToolResult,
    render_lookup, render_match,
};
