//! Configuration module for Harrow
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use harrow::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harrow.toml")).unwrap();
//! println!("Crawling {} seed(s) to depth {}", config.seeds.len(), config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, CrawlerConfig, ScopeConfig};

// Re-export parser functions
pub use parser::{hash_content, load_config, load_config_with_hash, parse_config};

// Re-export validation entry point
pub use validation::validate_config;
