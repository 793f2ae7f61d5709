use serde::Deserialize;

/// Main configuration structure for Harrow
///
/// Every section has usable defaults; a config file with nothing but a seed
/// list is a valid crawl.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Seed URLs the crawl starts from
    pub seeds: Vec<String>,

    pub crawler: CrawlerConfig,

    pub scope: ScopeConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth followed from the seeds (seeds are depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Whether HTML comments are mined for references
    #[serde(rename = "parse-comments")]
    pub parse_comments: bool,

    /// Stop admitting URLs after this many; unlimited when unset
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u64>,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// How many leading bytes of a response body are parsed for references
    #[serde(rename = "max-parse-bytes")]
    pub max_parse_bytes: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            workers: 8,
            parse_comments: true,
            max_pages: None,
            request_timeout_secs: 30,
            max_parse_bytes: 2_621_440,
            user_agent: format!("harrow/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Crawl scope configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Hosts allowed beyond the seed hosts; a `*.` prefix covers subdomains
    #[serde(rename = "include-hosts")]
    pub include_hosts: Vec<String>,

    /// Substring patterns; URLs containing one are refused admission
    #[serde(rename = "exclude-patterns")]
    pub exclude_patterns: Vec<String>,
}
