//! MCP method dispatch.
//!
//! Method names are parsed into [`McpMethod`] once, at the request boundary.
//! A name outside the enum is rejected there with `-32601`, so the server's
//! dispatch is an exhaustive match with no fallback arm.
//!
//! ```text
//! McpMethod
//!   ├── Initialize        initialize
//!   ├── Initialized       notifications/initialized (no response)
//!   ├── ListTools         tools/list
//!   ├── CallTool          tools/call
//!   └── Ping              ping
//! ```

use std::fmt;
use std::str::FromStr;

/// JSON-RPC code for an unknown method.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// MCP method identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpMethod {
    /// Initialize the MCP session.
    Initialize,
    /// Client acknowledgement after initialize.
    Initialized,
    /// List available tools.
    ListTools,
    /// Call a specific tool.
    CallTool,
    /// Health check.
    Ping,
}

/// A method name that is not part of [`McpMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl McpMethod {
    /// Returns the MCP protocol method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Initialized => "notifications/initialized",
            Self::ListTools => "tools/list",
            Self::CallTool => "tools/call",
            Self::Ping => "ping",
        }
    }

    /// Whether the method is a notification that never gets a response.
    #[must_use]
    pub const fn is_notification(self) -> bool {
        matches!(self, Self::Initialized)
    }

    /// Returns all methods.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Initialize,
            Self::Initialized,
            Self::ListTools,
            Self::CallTool,
            Self::Ping,
        ]
    }
}

impl FromStr for McpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

impl fmt::Display for McpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("initialize", McpMethod::Initialize)]
    #[test_case("notifications/initialized", McpMethod::Initialized)]
    #[test_case("tools/list", McpMethod::ListTools)]
    #[test_case("tools/call", McpMethod::CallTool)]
    #[test_case("ping", McpMethod::Ping)]
    fn test_method_from_str(name: &str, expected: McpMethod) {
        assert_eq!(name.parse::<McpMethod>(), Ok(expected));
        assert_eq!(expected.as_str(), name);
    }

    #[test_case("resources/list")]
    #[test_case("prompts/get")]
    #[test_case("Initialize")]
    #[test_case("")]
    fn test_unknown_method(name: &str) {
        let err = name.parse::<McpMethod>().unwrap_err();
        assert_eq!(err.to_string(), format!("Unknown method: {name}"));
    }

    #[test]
    fn test_only_initialized_is_notification() {
        let notifications: Vec<_> = McpMethod::all()
            .iter()
            .filter(|m| m.is_notification())
            .collect();
        assert_eq!(notifications, vec![&McpMethod::Initialized]);
    }
}
