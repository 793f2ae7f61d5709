//! Crawler module: fetching, scheduling, and crawl coordination
//!
//! This module contains the crawl machinery:
//! - The admission-controlled frontier shared by all workers
//! - HTTP fetching behind the [`ResourceFetcher`] seam
//! - The engine that owns the worker pool and the crawl lifecycle

mod engine;
mod fetcher;
mod frontier;

pub use engine::{crawl, CrawlSummary, Crawler, CrawlerHandle};
pub use fetcher::{HttpFetcher, ResourceFetcher};
pub use frontier::{Admission, CrawlStats, CrawlTask, Frontier, StatsSnapshot};
