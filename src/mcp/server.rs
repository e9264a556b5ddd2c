//! MCP server setup and lifecycle.
//!
//! Implements a JSON-RPC 2.0 MCP server over stdio or HTTP transport.
//!
//! ## Transports
//!
//! - **Stdio**: one request per line, one response per line. Notifications
//!   get no line back. A fixed request-rate window applies.
//! - **HTTP** (`http` feature): `POST /mcp` for JSON-RPC, `GET /mcp` for a
//!   server summary, permissive CORS, `204` for notifications.

use super::dispatch::{METHOD_NOT_FOUND, McpMethod};
use super::tools::ToolRegistry;
use crate::config::DeadendsConfig;
use crate::services::KnowledgeBase;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tracing::info_span;

/// Default maximum requests per rate limit window.
const DEFAULT_RATE_LIMIT_MAX_REQUESTS: usize = 1000;

/// Default rate limit window duration (1 minute).
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Maximum request size in bytes.
pub const MAX_REQUEST_BODY_SIZE: usize = 1024 * 1024;

/// MCP protocol version.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server name.
pub const SERVER_NAME: &str = "deadends";

/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

const INVALID_REQUEST: i32 = -32600;
const PARSE_ERROR: i32 = -32700;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
const RATE_LIMITED: i32 = -32000;

/// MCP rate limit configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: usize,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

impl RateLimitConfig {
    /// Creates config from environment variables.
    ///
    /// Reads `DEADENDS_MCP_RATE_LIMIT_MAX_REQUESTS` and
    /// `DEADENDS_MCP_RATE_LIMIT_WINDOW_SECS` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let max_requests = std::env::var("DEADENDS_MCP_RATE_LIMIT_MAX_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_MAX_REQUESTS);

        let window_secs = std::env::var("DEADENDS_MCP_RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);

        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Sets maximum requests per window.
    #[must_use]
    pub const fn with_max_requests(mut self, max: usize) -> Self {
        self.max_requests = max;
        self
    }

    /// Sets window duration in seconds.
    #[must_use]
    pub const fn with_window_secs(mut self, secs: u64) -> Self {
        self.window = Duration::from_secs(secs);
        self
    }
}

/// Transport type for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Standard input/output.
    #[default]
    Stdio,
    /// HTTP transport.
    Http,
}

impl Transport {
    /// Metric and log label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

/// MCP server for deadends.
#[derive(Debug, Clone)]
pub struct McpServer {
    tools: ToolRegistry,
    transport: Transport,
    port: u16,
    rate_limit: RateLimitConfig,
}

impl McpServer {
    /// Creates a server over `kb` with default limits.
    #[must_use]
    pub fn new(kb: KnowledgeBase) -> Self {
        Self {
            tools: ToolRegistry::new(kb),
            transport: Transport::Stdio,
            port: DEFAULT_HTTP_PORT,
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// Creates a server using the lookup and search settings in `config`.
    #[must_use]
    pub fn from_config(kb: KnowledgeBase, config: &DeadendsConfig) -> Self {
        let mut server = Self::new(kb);
        server.tools = server
            .tools
            .with_max_rendered_matches(config.lookup.max_rendered_matches)
            .with_default_search_limit(config.search.default_limit);
        server.with_rate_limit(RateLimitConfig::from_env())
    }

    /// Sets the rate limit configuration.
    #[must_use]
    pub const fn with_rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = config;
        self
    }

    /// Sets the transport type.
    #[must_use]
    pub const fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Sets the HTTP port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// The tool registry.
    #[must_use]
    pub const fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Starts the MCP server on the configured transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to start or its I/O fails.
    pub fn start(self) -> Result<()> {
        match self.transport {
            Transport::Stdio => {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                self.serve_lines(stdin.lock(), stdout.lock())
            },
            Transport::Http => self.run_http(),
        }
    }

    /// Serves line-delimited JSON-RPC from `reader` to `writer` until EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails.
    pub fn serve_lines<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        let mut request_count: usize = 0;
        let mut window_start = Instant::now();

        for line in reader.lines() {
            let line = line.map_err(|e| Error::operation("read_stdin", e))?;
            if line.trim().is_empty() {
                continue;
            }

            if window_start.elapsed() > self.rate_limit.window {
                request_count = 0;
                window_start = Instant::now();
            }

            let response = if request_count >= self.rate_limit.max_requests {
                let max_requests = self.rate_limit.max_requests;
                let window = self.rate_limit.window;
                tracing::warn!(request_count, ?window, "Rate limit exceeded");
                metrics::counter!("mcp_rate_limit_exceeded_total").increment(1);
                Some(format_error(
                    None,
                    RATE_LIMITED,
                    &format!("Rate limit exceeded: max {max_requests} requests per {window:?}"),
                ))
            } else {
                request_count += 1;
                self.handle_request(&line)
            };

            if let Some(response) = response {
                writeln!(writer, "{response}").map_err(|e| Error::operation("write_stdout", e))?;
                writer
                    .flush()
                    .map_err(|e| Error::operation("flush_stdout", e))?;
            }
        }

        Ok(())
    }

    /// Handles one JSON-RPC request; `None` for notifications.
    #[must_use]
    pub fn handle_request(&self, request: &str) -> Option<String> {
        if request.len() > MAX_REQUEST_BODY_SIZE {
            tracing::warn!(
                request_size = request.len(),
                max_size = MAX_REQUEST_BODY_SIZE,
                "Request exceeds maximum size limit"
            );
            return Some(format_error(
                None,
                INVALID_REQUEST,
                &format!(
                    "Request too large: {} bytes (max: {MAX_REQUEST_BODY_SIZE} bytes)",
                    request.len()
                ),
            ));
        }

        let start = Instant::now();
        let transport_label = self.transport.as_str();
        let span = info_span!(
            "mcp.request",
            transport = transport_label,
            rpc.method = tracing::field::Empty,
            rpc.id = tracing::field::Empty,
            status = tracing::field::Empty
        );
        let _guard = span.enter();

        let req: JsonRpcRequest = match serde_json::from_str(request) {
            Ok(req) => req,
            Err(e) => {
                span.record("status", "parse_error");
                record_request("parse_error", transport_label, "error", start);
                return Some(format_error(None, PARSE_ERROR, &format!("Parse error: {e}")));
            },
        };
        span.record("rpc.method", req.method.as_str());
        if let Some(id) = &req.id {
            span.record("rpc.id", id.to_string().as_str());
        }

        let method = match req.method.parse::<McpMethod>() {
            Ok(method) => method,
            Err(unknown) => {
                span.record("status", "unknown_method");
                record_request("unknown", transport_label, "error", start);
                if req.method.starts_with("notifications/") {
                    tracing::debug!(method = %req.method, "Ignoring unknown notification");
                    return None;
                }
                return Some(format_error(req.id, METHOD_NOT_FOUND, &unknown.to_string()));
            },
        };

        tracing::info!(method = %method, transport = transport_label, "Processing MCP request");
        if method.is_notification() {
            span.record("status", "notification");
            record_request(method.as_str(), transport_label, "success", start);
            return None;
        }

        let result = self.dispatch(method, req.params);
        let status = if result.is_ok() { "success" } else { "error" };
        span.record("status", status);
        record_request(method.as_str(), transport_label, status, start);
        Some(format_response(req.id, result))
    }

    /// Dispatches a parsed method. Exhaustive over [`McpMethod`].
    fn dispatch(&self, method: McpMethod, params: Option<Value>) -> DispatchResult {
        match method {
            McpMethod::Initialize => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            McpMethod::Initialized | McpMethod::Ping => Ok(json!({})),
            McpMethod::ListTools => Ok(json!({ "tools": self.tools.list_tools() })),
            McpMethod::CallTool => self.handle_call_tool(params),
        }
    }

    fn handle_call_tool(&self, params: Option<Value>) -> DispatchResult {
        let params = params.ok_or((INVALID_PARAMS, "Missing params".to_string()))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or((INVALID_PARAMS, "Missing tool name".to_string()))?;
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = self.tools.call(name, arguments);
        serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, e.to_string()))
    }

    /// Server summary served on `GET /mcp`.
    ///
    /// # Errors
    ///
    /// Returns an error if the corpus cannot be loaded.
    pub fn server_info(&self) -> Result<Value> {
        let corpus = self.tools.knowledge_base().corpus()?;
        let tools: Vec<&str> = self
            .tools
            .list_tools()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        Ok(json!({
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Structured failure knowledge for AI agents: dead ends, workarounds, error chains",
            "total_errors": corpus.len(),
            "domains": corpus.domain_counts().len(),
            "homepage": crate::validation::DEFAULT_BASE_URL,
            "protocol": "MCP (Model Context Protocol)",
            "tools": tools
        }))
    }

    /// Runs the server over HTTP.
    #[cfg(feature = "http")]
    fn run_http(self) -> Result<()> {
        let port = self.port;
        let app = http_transport::router(std::sync::Arc::new(self));

        let rt = tokio::runtime::Runtime::new().map_err(|e| Error::operation("create_runtime", e))?;
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        tracing::info!(port, "Starting MCP HTTP server");

        rt.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|e| Error::operation("bind", e))?;
            axum::serve(listener, app)
                .await
                .map_err(|e| Error::operation("serve", e))
        })
    }

    /// Runs the server over HTTP (feature not enabled).
    #[cfg(not(feature = "http"))]
    fn run_http(self) -> Result<()> {
        tracing::debug!(port = self.port, "HTTP transport requested without the http feature");
        Err(Error::FeatureNotEnabled("http".to_string()))
    }
}

fn record_request(method: &str, transport: &'static str, status: &'static str, start: Instant) {
    metrics::counter!(
        "mcp_requests_total",
        "method" => method.to_string(),
        "transport" => transport,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(
        "mcp_request_duration_ms",
        "method" => method.to_string(),
        "transport" => transport
    )
    .record(start.elapsed().as_secs_f64() * 1000.0);
}

/// Result type for method dispatch.
type DispatchResult = std::result::Result<Value, (i32, String)>;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// Protocol version; accepted but not checked.
    #[serde(rename = "jsonrpc", default)]
    _jsonrpc: Option<String>,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

fn format_response(id: Option<Value>, result: DispatchResult) -> String {
    match result {
        Ok(value) => {
            let response = JsonRpcResponse {
                jsonrpc: "2.0",
                id,
                result: Some(value),
                error: None,
            };
            serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
        },
        Err((code, message)) => format_error(id, code, &message),
    }
}

fn format_error(id: Option<Value>, code: i32, message: &str) -> String {
    let response = JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    };
    serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(feature = "http")]
mod http_transport {
    use super::{MAX_REQUEST_BODY_SIZE, McpServer};
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderValue, Method, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use std::sync::Arc;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    pub fn router(server: Arc<McpServer>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        Router::new()
            .route("/mcp", post(handle_post).get(handle_get))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(server)
    }

    fn json_response(status: StatusCode, body: String) -> Response {
        let mut response = (status, body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }

    async fn handle_post(State(server): State<Arc<McpServer>>, body: String) -> Response {
        if body.len() > MAX_REQUEST_BODY_SIZE {
            tracing::warn!(body_size = body.len(), "Request body exceeds maximum size limit");
            let error = serde_json::json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {
                    "code": -32600,
                    "message": format!(
                        "Request body too large: {} bytes (max: {MAX_REQUEST_BODY_SIZE} bytes)",
                        body.len()
                    )
                }
            });
            return json_response(StatusCode::PAYLOAD_TOO_LARGE, error.to_string());
        }
        if serde_json::from_str::<serde_json::Value>(&body).is_err() {
            return json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid JSON" }).to_string(),
            );
        }

        match server.handle_request(&body) {
            Some(response) => json_response(StatusCode::OK, response),
            None => StatusCode::NO_CONTENT.into_response(),
        }
    }

    async fn handle_get(State(server): State<Arc<McpServer>>) -> Response {
        match server.server_info() {
            Ok(info) => json_response(
                StatusCode::OK,
                serde_json::to_string_pretty(&info).unwrap_or_default(),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build server info");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": e.to_string() }).to_string(),
                )
            },
        }
    }
}
