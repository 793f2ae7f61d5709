//! Harrow: an attack-surface mapper for web applications
//!
//! This crate implements the crawl core of a security-testing toolkit. Given seed
//! URLs and a scope, it fetches pages, mines them for references (markup attributes,
//! META directives, HTML comments, DOCTYPE declarations, robots.txt rules, sitemap
//! entries), and feeds every admitted discovery back through a bounded worker pool
//! until the reachable surface is mapped.

pub mod config;
pub mod crawler;
pub mod events;
pub mod extract;
pub mod resource;
pub mod url;

use thiserror::Error;

/// Main error type for Harrow operations
///
/// Per-URL problems (bad links, failed fetches) never surface here; they are
/// logged and counted so one hostile page cannot end a session. This enum covers
/// the structural failures that do.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {source}")]
    Seed { url: String, source: UrlError },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker {worker} panicked")]
    WorkerPanicked { worker: usize },
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

    #[error("Invalid scope pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Per-request fetch errors
///
/// Carries enough classification for the stats counters and the discovery sink;
/// the worker loop records these and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}")]
    Connect { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },
}

/// Result type alias for Harrow operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{
    crawl, Admission, CrawlStats, CrawlSummary, CrawlTask, Crawler, CrawlerHandle, Frontier,
    HttpFetcher, ResourceFetcher, StatsSnapshot,
};
pub use events::{ChannelSink, CrawlEvent, DiscoveredResource, DiscoverySink, NoopSink};
pub use extract::{CandidateLink, ExtractorChain, LinkCollector, LinkOrigin, ResourceExtractor};
pub use resource::{ContentKind, FetchedResource};
pub use crate::url::{canonicalize, canonicalize_absolute, CrawlScope};
