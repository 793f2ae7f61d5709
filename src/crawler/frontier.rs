//! Crawl frontier
//!
//! The shared work queue with admission control. Every candidate URL passes
//! through [`Frontier::offer`], which applies the depth, scope, duplicate, and
//! page-cap checks and queues survivors exactly once. Workers pull with
//! [`Frontier::next_task`] and report back with [`Frontier::task_done`]; the
//! crawl is over when the queue is empty and no worker holds a task, so a
//! worker must queue any follow-up links before declaring its task done.

use crate::events::{DiscoveredResource, DiscoverySink};
use crate::extract::{CandidateLink, LinkOrigin};
use crate::url::CrawlScope;
use chrono::Utc;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use url::Url;

/// A unit of crawl work: one admitted URL and the depth it was discovered at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: u32,
}

/// Outcome of offering a candidate URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Admitted and queued for fetching
    Queued,
    /// Refused: deeper than the depth limit
    DepthExceeded,
    /// Refused: outside the crawl scope
    OutOfScope,
    /// Refused: already admitted during this crawl
    AlreadyVisited,
    /// Refused: the page cap is reached
    PageLimitReached,
    /// Refused: the frontier has been shut down
    Closed,
}

/// Shared crawl counters, updated lock-free from the worker tasks
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    links_extracted: AtomicU64,
    links_rejected: AtomicU64,
    admitted: AtomicU64,
    duplicates: AtomicU64,
    depth_exceeded: AtomicU64,
    out_of_scope: AtomicU64,
    page_limit_hits: AtomicU64,
}

impl CrawlStats {
    pub(crate) fn record_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_extraction(&self, links: usize, rejected: u64) {
        self.links_extracted.fetch_add(links as u64, Ordering::Relaxed);
        self.links_rejected.fetch_add(rejected, Ordering::Relaxed);
    }

    fn record_admission(&self, verdict: Admission) {
        let counter = match verdict {
            Admission::Queued => &self.admitted,
            Admission::DepthExceeded => &self.depth_exceeded,
            Admission::OutOfScope => &self.out_of_scope,
            Admission::AlreadyVisited => &self.duplicates,
            Admission::PageLimitReached => &self.page_limit_hits,
            Admission::Closed => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            links_extracted: self.links_extracted.load(Ordering::Relaxed),
            links_rejected: self.links_rejected.load(Ordering::Relaxed),
            admitted: self.admitted.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            depth_exceeded: self.depth_exceeded.load(Ordering::Relaxed),
            out_of_scope: self.out_of_scope.load(Ordering::Relaxed),
            page_limit_hits: self.page_limit_hits.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`CrawlStats`], taken at the end of a crawl or mid-flight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub links_extracted: u64,
    pub links_rejected: u64,
    pub admitted: u64,
    pub duplicates: u64,
    pub depth_exceeded: u64,
    pub out_of_scope: u64,
    pub page_limit_hits: u64,
}

/// Everything that must change together under one lock
struct FrontierState {
    visited: HashSet<String>,
    queue: VecDeque<CrawlTask>,
    in_flight: usize,
    admitted: u64,
    closed: bool,
}

/// Admission-controlled work queue shared by all workers
pub struct Frontier {
    state: Mutex<FrontierState>,
    wakeup: Notify,
    scope: CrawlScope,
    max_depth: u32,
    max_pages: Option<u64>,
    stats: Arc<CrawlStats>,
    sink: Arc<dyn DiscoverySink>,
}

impl Frontier {
    pub fn new(
        scope: CrawlScope,
        max_depth: u32,
        max_pages: Option<u64>,
        stats: Arc<CrawlStats>,
        sink: Arc<dyn DiscoverySink>,
    ) -> Self {
        Self {
            state: Mutex::new(FrontierState {
                visited: HashSet::new(),
                queue: VecDeque::new(),
                in_flight: 0,
                admitted: 0,
                closed: false,
            }),
            wakeup: Notify::new(),
            scope,
            max_depth,
            max_pages,
            stats,
            sink,
        }
    }

    /// Offers one candidate URL, reporting the admission verdict
    ///
    /// On admission the discovery sink is notified and any waiting worker is
    /// woken. `discovered_from` is `None` for seeds.
    pub fn offer(
        &self,
        url: Url,
        depth: u32,
        origin: LinkOrigin,
        discovered_from: Option<&Url>,
    ) -> Admission {
        let verdict = {
            let mut state = self.state.lock().unwrap();
            self.admit(&mut state, &url, depth)
        };
        self.settle(verdict, url, depth, origin, discovered_from);
        verdict
    }

    /// Offers every link extracted from one page, returning how many queued
    ///
    /// The whole batch is admitted under one lock acquisition, so a page's
    /// discovery pass lands atomically with respect to shutdown: all of it
    /// before a close, or none of it after.
    pub fn offer_batch(&self, links: Vec<CandidateLink>, discovered_from: &Url) -> usize {
        let verdicts: Vec<(Admission, CandidateLink)> = {
            let mut state = self.state.lock().unwrap();
            links
                .into_iter()
                .map(|link| (self.admit(&mut state, &link.url, link.depth), link))
                .collect()
        };

        let mut queued = 0;
        for (verdict, link) in verdicts {
            if verdict == Admission::Queued {
                queued += 1;
            }
            self.settle(verdict, link.url, link.depth, link.origin, Some(discovered_from));
        }
        queued
    }

    fn admit(&self, state: &mut FrontierState, url: &Url, depth: u32) -> Admission {
        if depth > self.max_depth {
            return Admission::DepthExceeded;
        }
        if !self.scope.contains(url) {
            return Admission::OutOfScope;
        }
        if state.closed {
            return Admission::Closed;
        }
        if let Some(cap) = self.max_pages {
            if state.admitted >= cap {
                return Admission::PageLimitReached;
            }
        }
        // Membership test and insert stay under one lock so concurrent offers
        // of the same URL admit exactly once.
        if !state.visited.insert(url.as_str().to_string()) {
            return Admission::AlreadyVisited;
        }

        state.admitted += 1;
        state.queue.push_back(CrawlTask {
            url: url.clone(),
            depth,
        });
        Admission::Queued
    }

    /// Post-admission bookkeeping, done outside the state lock
    fn settle(
        &self,
        verdict: Admission,
        url: Url,
        depth: u32,
        origin: LinkOrigin,
        discovered_from: Option<&Url>,
    ) {
        self.stats.record_admission(verdict);

        if verdict == Admission::Queued {
            tracing::debug!("Queued {} (depth {}, via {})", url, depth, origin);
            self.wakeup.notify_waiters();
            self.sink.resource_discovered(DiscoveredResource {
                url,
                depth,
                origin,
                discovered_from: discovered_from.cloned(),
                at: Utc::now(),
            });
        }
    }

    /// Takes the next task, waiting while other workers might still produce one
    ///
    /// Returns `None` when the frontier is shut down, or when the queue is
    /// empty with no task in flight anywhere.
    pub async fn next_task(&self) -> Option<CrawlTask> {
        loop {
            // Register for wakeups before checking state, otherwise a notify
            // landing between the check and the await would be lost.
            let notified = self.wakeup.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().unwrap();
                if state.closed {
                    return None;
                }
                if let Some(task) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(task);
                }
                if state.in_flight == 0 {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks one previously taken task as finished
    pub fn task_done(&self) {
        let drained = {
            let mut state = self.state.lock().unwrap();
            state.in_flight = state.in_flight.saturating_sub(1);
            state.in_flight == 0 && state.queue.is_empty()
        };
        if drained {
            self.wakeup.notify_waiters();
        }
    }

    /// Stops the crawl: refuses further offers and releases waiting workers
    pub fn shutdown(&self) {
        self.state.lock().unwrap().closed = true;
        self.wakeup.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Live counter snapshot
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of admitted URLs not yet handed to a worker
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }
}
