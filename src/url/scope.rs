use url::Url;

/// The admission boundary of a crawl session
///
/// A URL is in scope when its host matches one of the allowed host patterns and
/// no exclusion substring appears anywhere in it. Hosts of the seed URLs are
/// always allowed; the configuration can widen the boundary with additional
/// patterns (`internal.example.com` or `*.example.com`) and narrow it with
/// exclusion substrings (`logout`, `/delete`), the usual guard rails when
/// pointing a crawler at a live application.
///
/// Scope checks are pure and read-only; the frontier consults them on every
/// candidate link.
#[derive(Debug, Clone)]
pub struct CrawlScope {
    /// Host patterns, exact (`example.com`) or wildcard (`*.example.com`)
    allowed_hosts: Vec<String>,

    /// Lowercased substrings that veto a URL outright
    exclusions: Vec<String>,
}

impl CrawlScope {
    /// Builds a scope from the seed URLs plus configured widening/narrowing
    ///
    /// # Arguments
    ///
    /// * `seeds` - Parsed seed URLs; their hosts become exact patterns
    /// * `include_hosts` - Extra host patterns from configuration
    /// * `exclude_patterns` - Substring vetoes from configuration
    pub fn new(seeds: &[Url], include_hosts: &[String], exclude_patterns: &[String]) -> Self {
        let mut allowed_hosts: Vec<String> = Vec::new();

        for seed in seeds {
            if let Some(host) = seed.host_str() {
                if !allowed_hosts.iter().any(|h| h == host) {
                    allowed_hosts.push(host.to_string());
                }
            }
        }

        for pattern in include_hosts {
            let pattern = pattern.trim().to_lowercase();
            if !pattern.is_empty() && !allowed_hosts.contains(&pattern) {
                allowed_hosts.push(pattern);
            }
        }

        let exclusions = exclude_patterns
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        Self {
            allowed_hosts,
            exclusions,
        }
    }

    /// Returns true if the URL lies inside the crawl boundary
    pub fn contains(&self, url: &Url) -> bool {
        let host = match url.host_str() {
            Some(h) => h,
            None => return false,
        };

        if !self
            .allowed_hosts
            .iter()
            .any(|pattern| host_matches(pattern, host))
        {
            return false;
        }

        if !self.exclusions.is_empty() {
            let haystack = url.as_str().to_lowercase();
            if self.exclusions.iter().any(|e| haystack.contains(e)) {
                return false;
            }
        }

        true
    }

    /// The effective host patterns, for diagnostics and dry runs
    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// The effective exclusion substrings
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }
}

/// Checks if a host matches a pattern
///
/// Two pattern forms:
/// 1. Exact: `example.com` matches only `example.com`
/// 2. Wildcard: `*.example.com` matches the bare domain and any depth of
///    subdomain (`example.com`, `blog.example.com`, `api.v2.example.com`)
fn host_matches(pattern: &str, host: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix("*.") {
        host == suffix || host.ends_with(&format!(".{}", suffix))
    } else {
        host == pattern
    }
}
