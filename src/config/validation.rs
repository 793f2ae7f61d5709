use crate::config::types::{CrawlConfig, CrawlerConfig, ScopeConfig};
use crate::ConfigError;

/// Validates the entire configuration
///
/// Seed URL syntax is deliberately not checked here; the crawler canonicalizes
/// seeds itself and reports the exact failure.
pub fn validate_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    validate_crawler_config(&config.crawler)?;
    validate_scope_config(&config.scope)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.workers < 1 || config.workers > 100 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 100, got {}",
            config.workers
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_parse_bytes < 1024 {
        return Err(ConfigError::Validation(format!(
            "max-parse-bytes must be >= 1024, got {}",
            config.max_parse_bytes
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1 when set".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scope configuration
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    for pattern in &config.include_hosts {
        validate_host_pattern(pattern)?;
    }

    for pattern in &config.exclude_patterns {
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "exclude pattern cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates a host pattern (bare host or `*.` wildcard)
///
/// Single-label hosts like `localhost` or intranet names are allowed; targets
/// are often not public DNS names.
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' has no host part",
            pattern
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' contains invalid characters",
            pattern
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' cannot start or end with '.' or '-'",
            pattern
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' cannot contain consecutive dots",
            pattern
        )));
    }

    Ok(())
}
