//! Sitemap Checker: robots.txt and sitemap analyzer
//!
//! This crate fetches a site's robots.txt, discovers the sitemaps it declares,
//! resolves sitemap indexes recursively and reports which of the discovered
//! URLs the robots rules allow crawlers to visit.

pub mod charset;
pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod url;

use std::fmt;
use thiserror::Error;

/// Main error type for sitemap checker operations
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Failed to process {url}: {source}")]
    Document { url: String, source: DocumentError },

    #[error("Malformed robots.txt at {url}: {message}")]
    MalformedRobots { url: String, message: String },

    #[error("Fetch task for {url} ended without a result")]
    TaskAborted { url: String },

    #[error("Origin {origin} is unreachable: {reason}")]
    OriginUnreachable { origin: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl CheckerError {
    /// Classifies this error into the kind shown in reports
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::UrlError(_) => ErrorKind::InvalidUrl,
            Self::Network { .. } | Self::Timeout { .. } | Self::Client(_) => ErrorKind::Network,
            Self::Http { status, .. } => ErrorKind::Http(*status),
            Self::Document { source, .. } => source.kind(),
            Self::MalformedRobots { .. } => ErrorKind::MalformedRobots,
            Self::OriginUnreachable { .. } => ErrorKind::OriginUnreachable,
            Self::TaskAborted { .. } => ErrorKind::Aborted,
        }
    }

    /// Returns true if the server answered at all (even with an error status)
    ///
    /// Used to tell an unreachable origin apart from one that simply has no
    /// robots.txt or sitemap.
    pub fn got_response(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Document { .. } | Self::MalformedRobots { .. }
        )
    }
}

/// Error categories surfaced in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Http(u16),
    Decompression,
    MalformedDocument,
    MalformedRobots,
    OriginUnreachable,
    InvalidUrl,
    Config,
    /// A worker task ended without producing a result
    Aborted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "NetworkError"),
            Self::Http(status) => write!(f, "HttpError({})", status),
            Self::Decompression => write!(f, "DecompressionError"),
            Self::MalformedDocument => write!(f, "MalformedDocumentError"),
            Self::MalformedRobots => write!(f, "MalformedRobotsError"),
            Self::OriginUnreachable => write!(f, "OriginUnreachable"),
            Self::InvalidUrl => write!(f, "InvalidUrl"),
            Self::Config => write!(f, "ConfigError"),
            Self::Aborted => write!(f, "Aborted"),
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Errors raised while decoding or parsing one fetched document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid gzip framing: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("document is not valid {0}")]
    Encoding(String),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("document has no root element")]
    MissingRoot,
}

impl DocumentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gzip(_) => ErrorKind::Decompression,
            _ => ErrorKind::MalformedDocument,
        }
    }
}

/// Result type alias for sitemap checker operations
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for document decoding and parsing
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Checker;
pub use output::{write_report, CheckReport};
pub use robots::RobotsRuleSet;
pub use sitemap::{parse_sitemap, SitemapEntry, SitemapNode};
