//! Domain, resolvability and review-status enums.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Technology area an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Python runtime and interpreter errors.
    Python,
    /// CUDA / GPU runtime errors.
    Cuda,
    /// Node.js runtime errors.
    Node,
    /// pip packaging errors.
    Pip,
    /// Docker engine and build errors.
    Docker,
    /// Git client errors.
    Git,
    /// Rust compiler and cargo errors.
    Rust,
    /// TypeScript compiler errors.
    Typescript,
    /// Go toolchain errors.
    Go,
    /// Kubernetes cluster and kubectl errors.
    Kubernetes,
    /// Terraform errors.
    Terraform,
    /// AWS service errors.
    Aws,
    /// Next.js framework errors.
    Nextjs,
    /// React errors.
    React,
    /// JVM and Java errors.
    Java,
    /// Database engine errors.
    Database,
    /// CI/CD pipeline errors.
    Cicd,
    /// PHP errors.
    Php,
    /// .NET errors.
    Dotnet,
    /// Network and DNS errors.
    Networking,
    /// Model Context Protocol errors.
    Mcp,
    /// HTTP client/server errors.
    Http,
    /// Authentication errors.
    Auth,
    /// LLM API errors.
    Llm,
}

impl Domain {
    /// Returns all domain variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Python,
            Self::Cuda,
            Self::Node,
            Self::Pip,
            Self::Docker,
            Self::Git,
            Self::Rust,
            Self::Typescript,
            Self::Go,
            Self::Kubernetes,
            Self::Terraform,
            Self::Aws,
            Self::Nextjs,
            Self::React,
            Self::Java,
            Self::Database,
            Self::Cicd,
            Self::Php,
            Self::Dotnet,
            Self::Networking,
            Self::Mcp,
            Self::Http,
            Self::Auth,
            Self::Llm,
        ]
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Cuda => "cuda",
            Self::Node => "node",
            Self::Pip => "pip",
            Self::Docker => "docker",
            Self::Git => "git",
            Self::Rust => "rust",
            Self::Typescript => "typescript",
            Self::Go => "go",
            Self::Kubernetes => "kubernetes",
            Self::Terraform => "terraform",
            Self::Aws => "aws",
            Self::Nextjs => "nextjs",
            Self::React => "react",
            Self::Java => "java",
            Self::Database => "database",
            Self::Cicd => "cicd",
            Self::Php => "php",
            Self::Dotnet => "dotnet",
            Self::Networking => "networking",
            Self::Mcp => "mcp",
            Self::Http => "http",
            Self::Auth => "auth",
            Self::Llm => "llm",
        }
    }

    /// Parses a domain from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let needle = s.trim().to_lowercase();
        Self::all().iter().copied().find(|d| d.as_str() == needle)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Domain {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::Error::InvalidInput(format!("unknown domain: {s}")))
    }
}

/// Coarse verdict on whether an error is generally fixable.
///
/// Serialized as the strings `"true"`, `"partial"` and `"false"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolvable {
    /// Generally fixable.
    #[serde(rename = "true")]
    True,
    /// Fixable under some conditions.
    #[serde(rename = "partial")]
    Partial,
    /// Generally not fixable.
    #[serde(rename = "false")]
    False,
}

impl Resolvable {
    /// Returns the verdict as its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::True => "true",
            Self::Partial => "partial",
            Self::False => "false",
        }
    }

    /// Parses the wire string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "true" => Some(Self::True),
            "partial" => Some(Self::Partial),
            "false" => Some(Self::False),
            _ => None,
        }
    }
}

impl fmt::Display for Resolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review status of a canon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Produced by a generation pipeline, not yet reviewed.
    #[default]
    AutoGenerated,
    /// Reviewed by a maintainer.
    HumanReviewed,
    /// Confirmed by community reports.
    CommunityVerified,
}

impl ReviewStatus {
    /// Returns all review statuses.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AutoGenerated,
            Self::HumanReviewed,
            Self::CommunityVerified,
        ]
    }

    /// Returns the status as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AutoGenerated => "auto_generated",
            Self::HumanReviewed => "human_reviewed",
            Self::CommunityVerified => "community_verified",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("python", Some(Domain::Python))]
    #[test_case("KUBERNETES", Some(Domain::Kubernetes))]
    #[test_case(" nextjs ", Some(Domain::Nextjs))]
    #[test_case("cobol", None)]
    #[test_case("", None)]
    fn test_domain_parse(input: &str, expected: Option<Domain>) {
        assert_eq!(Domain::parse(input), expected);
    }

    #[test]
    fn test_domain_as_str_roundtrips() {
        for domain in Domain::all() {
            assert_eq!(Domain::parse(domain.as_str()), Some(*domain));
        }
        assert_eq!(Domain::all().len(), 24);
    }

    #[test]
    fn test_domain_serde_lowercase() {
        let json = serde_json::to_string(&Domain::Typescript).unwrap();
        assert_eq!(json, "\"typescript\"");
        let parsed: Domain = serde_json::from_str("\"cicd\"").unwrap();
        assert_eq!(parsed, Domain::Cicd);
        assert!(serde_json::from_str::<Domain>("\"invalid_domain\"").is_err());
    }

    #[test]
    fn test_domain_from_str_error() {
        let err = "fortran".parse::<Domain>().unwrap_err();
        assert!(err.to_string().contains("unknown domain: fortran"));
    }

    #[test]
    fn test_resolvable_wire_strings() {
        assert_eq!(serde_json::to_string(&Resolvable::True).unwrap(), "\"true\"");
        let parsed: Resolvable = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(parsed, Resolvable::Partial);
        assert!(serde_json::from_str::<Resolvable>("\"maybe\"").is_err());
        assert_eq!(Resolvable::parse("false"), Some(Resolvable::False));
    }

    #[test]
    fn test_review_status_snake_case() {
        let parsed: ReviewStatus = serde_json::from_str("\"community_verified\"").unwrap();
        assert_eq!(parsed, ReviewStatus::CommunityVerified);
        assert_eq!(ReviewStatus::HumanReviewed.to_string(), "human_reviewed");
    }
}
