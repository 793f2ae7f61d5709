//! Crawl engine
//!
//! Wires the pieces together: seeds go into the frontier, a fixed pool of
//! workers pulls tasks, fetches them, runs the extractor chain, and feeds the
//! survivors back. The crawl ends when the frontier drains or a handle stops
//! it.

use crate::config::{validate_config, CrawlConfig};
use crate::crawler::fetcher::{HttpFetcher, ResourceFetcher};
use crate::crawler::frontier::{CrawlStats, Frontier, StatsSnapshot};
use crate::events::{DiscoverySink, NoopSink};
use crate::extract::{ExtractorChain, LinkCollector, LinkOrigin};
use crate::url::{canonicalize_absolute, CrawlScope};
use crate::CrawlError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Final report of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// True when the crawl was stopped early instead of draining
    pub stopped: bool,
    pub stats: StatsSnapshot,
}

impl CrawlSummary {
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// A configured crawl, ready to run once
///
/// Construction validates the configuration, canonicalizes the seeds, and
/// derives the scope. The fetcher and sink can be swapped before `run`; a
/// fresh crawler is needed for a second crawl.
pub struct Crawler {
    config: Arc<CrawlConfig>,
    seeds: Vec<Url>,
    scope: CrawlScope,
    frontier: Arc<Frontier>,
    chain: Arc<ExtractorChain>,
    fetcher: Arc<dyn ResourceFetcher>,
    sink: Arc<dyn DiscoverySink>,
    stats: Arc<CrawlStats>,
}

impl std::fmt::Debug for Crawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Crawler")
            .field("config", &self.config)
            .field("seeds", &self.seeds)
            .finish_non_exhaustive()
    }
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> crate::Result<Self> {
        validate_config(&config)?;

        let mut seeds = Vec::new();
        for raw in &config.seeds {
            let url = canonicalize_absolute(raw).map_err(|e| CrawlError::Seed {
                url: raw.clone(),
                source: e,
            })?;
            seeds.push(url);
        }

        let scope = CrawlScope::new(
            &seeds,
            &config.scope.include_hosts,
            &config.scope.exclude_patterns,
        );
        let stats = Arc::new(CrawlStats::default());
        let sink: Arc<dyn DiscoverySink> = Arc::new(NoopSink);
        let frontier = Arc::new(Frontier::new(
            scope.clone(),
            config.crawler.max_depth,
            config.crawler.max_pages,
            Arc::clone(&stats),
            Arc::clone(&sink),
        ));
        let fetcher: Arc<dyn ResourceFetcher> = Arc::new(HttpFetcher::new(&config)?);
        let chain = Arc::new(ExtractorChain::standard(config.crawler.parse_comments));

        Ok(Self {
            config: Arc::new(config),
            seeds,
            scope,
            frontier,
            chain,
            fetcher,
            sink,
            stats,
        })
    }

    /// Replaces the resource fetcher; call before `run`
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replaces the discovery sink; call before `run`
    pub fn with_sink(mut self, sink: Arc<dyn DiscoverySink>) -> Self {
        // The sink is consulted at admission time, so the (still empty)
        // frontier is rebuilt around the new one.
        self.frontier = Arc::new(Frontier::new(
            self.scope.clone(),
            self.config.crawler.max_depth,
            self.config.crawler.max_pages,
            Arc::clone(&self.stats),
            Arc::clone(&sink),
        ));
        self.sink = sink;
        self
    }

    /// Control handle usable from other tasks while `run` is in progress
    pub fn handle(&self) -> CrawlerHandle {
        CrawlerHandle {
            frontier: Arc::clone(&self.frontier),
        }
    }

    pub fn seeds(&self) -> &[Url] {
        &self.seeds
    }

    pub fn scope(&self) -> &CrawlScope {
        &self.scope
    }

    /// Runs the crawl to completion
    ///
    /// Seeds are offered at depth 0, then the worker pool runs until the
    /// frontier drains or is shut down. A panicked worker stops the crawl; the
    /// error is reported after the remaining workers have exited.
    pub async fn run(&self) -> crate::Result<CrawlSummary> {
        let started_at = Utc::now();
        let worker_count = self.config.crawler.workers;

        tracing::info!(
            "Starting crawl: {} seed(s), {} worker(s), max depth {}",
            self.seeds.len(),
            worker_count,
            self.config.crawler.max_depth
        );

        for seed in &self.seeds {
            self.frontier.offer(seed.clone(), 0, LinkOrigin::Seed, None);
        }

        let mut workers = JoinSet::new();
        let mut worker_ids = HashMap::new();
        for worker in 0..worker_count {
            let frontier = Arc::clone(&self.frontier);
            let chain = Arc::clone(&self.chain);
            let fetcher = Arc::clone(&self.fetcher);
            let sink = Arc::clone(&self.sink);
            let stats = Arc::clone(&self.stats);
            let handle = workers.spawn(async move {
                worker_loop(worker, frontier, chain, fetcher, sink, stats).await;
            });
            worker_ids.insert(handle.id(), worker);
        }

        let mut panicked = None;
        while let Some(result) = workers.join_next().await {
            if let Err(join_error) = result {
                let worker = worker_ids.get(&join_error.id()).copied().unwrap_or_default();
                tracing::error!("Worker {} panicked: {}", worker, join_error);
                if panicked.is_none() {
                    // Its in-flight task is lost, so the others would wait on
                    // it forever; stop the crawl instead.
                    self.frontier.shutdown();
                    panicked = Some(worker);
                }
            }
        }

        if let Some(worker) = panicked {
            return Err(CrawlError::WorkerPanicked { worker });
        }

        let summary = CrawlSummary {
            started_at,
            finished_at: Utc::now(),
            stopped: self.frontier.is_closed(),
            stats: self.stats.snapshot(),
        };

        tracing::info!(
            "Crawl finished: {} fetched, {} failed, {} discovered",
            summary.stats.pages_fetched,
            summary.stats.fetch_failures,
            summary.stats.admitted
        );

        Ok(summary)
    }
}

/// Clonable remote control for a running crawl
#[derive(Clone)]
pub struct CrawlerHandle {
    frontier: Arc<Frontier>,
}

impl CrawlerHandle {
    /// Stops the crawl: no further admissions, workers exit promptly
    pub fn stop(&self) {
        tracing::info!("Stop requested");
        self.frontier.shutdown();
    }

    pub fn is_stopped(&self) -> bool {
        self.frontier.is_closed()
    }

    /// Counter snapshot, usable mid-crawl
    pub fn stats(&self) -> StatsSnapshot {
        self.frontier.stats()
    }
}

/// Runs a complete crawl with the default fetcher and no sink
pub async fn crawl(config: CrawlConfig) -> crate::Result<CrawlSummary> {
    Crawler::new(config)?.run().await
}

/// One worker: pull, fetch, extract, queue the survivors, repeat
async fn worker_loop(
    worker: usize,
    frontier: Arc<Frontier>,
    chain: Arc<ExtractorChain>,
    fetcher: Arc<dyn ResourceFetcher>,
    sink: Arc<dyn DiscoverySink>,
    stats: Arc<CrawlStats>,
) {
    tracing::debug!("Worker {} started", worker);

    while let Some(task) = frontier.next_task().await {
        match fetcher.fetch(&task.url).await {
            Ok(resource) => {
                stats.record_fetched();
                tracing::debug!(
                    "Worker {} fetched {} ({}, {} bytes)",
                    worker,
                    resource.request_url,
                    resource.status,
                    resource.body.len()
                );

                let mut collector = LinkCollector::new(task.depth);
                chain.process(&resource, &mut collector);
                stats.record_extraction(collector.len(), collector.rejected());
                // Follow-ups must be queued before the task is declared done,
                // or the frontier could drain under a page that still has
                // links to contribute.
                frontier.offer_batch(collector.into_links(), &resource.request_url);
            }
            Err(e) => {
                stats.record_fetch_failure();
                tracing::warn!("Worker {} failed to fetch {}: {}", worker, task.url, e);
                sink.fetch_failed(&task.url, &e.to_string());
            }
        }
        frontier.task_done();
    }

    tracing::debug!("Worker {} finished", worker);
}
