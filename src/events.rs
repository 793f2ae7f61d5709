//! Discovery events
//!
//! Every admitted URL and every failed fetch is reported through a
//! [`DiscoverySink`]. The crawl engine calls the sink from its worker tasks,
//! so implementations must be cheap and non-blocking; anything heavier should
//! hand off through [`ChannelSink`].

use crate::extract::LinkOrigin;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use url::Url;

/// A URL admitted to the crawl frontier
#[derive(Debug, Clone)]
pub struct DiscoveredResource {
    /// Canonical form of the discovered URL
    pub url: Url,
    /// Link depth at which it will be fetched (seeds are depth 0)
    pub depth: u32,
    /// Where the reference was found
    pub origin: LinkOrigin,
    /// Page the reference was extracted from; `None` for seeds
    pub discovered_from: Option<Url>,
    /// When the frontier admitted it
    pub at: DateTime<Utc>,
}

/// Receiver for crawl progress notifications
pub trait DiscoverySink: Send + Sync {
    /// Called once per URL, at the moment the frontier admits it
    fn resource_discovered(&self, event: DiscoveredResource);

    /// Called when a queued URL could not be fetched
    fn fetch_failed(&self, url: &Url, reason: &str) {
        let _ = (url, reason);
    }
}

/// Sink that discards all notifications
pub struct NoopSink;

impl DiscoverySink for NoopSink {
    fn resource_discovered(&self, _event: DiscoveredResource) {}
}

/// Crawl notification forwarded by [`ChannelSink`]
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    ResourceDiscovered(DiscoveredResource),
    FetchFailed { url: Url, reason: String },
}

/// Sink that forwards events over an unbounded channel
///
/// Decouples consumers from the worker tasks: the crawl never blocks on a slow
/// listener, and a dropped receiver silently ends delivery.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<CrawlEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<CrawlEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl DiscoverySink for ChannelSink {
    fn resource_discovered(&self, event: DiscoveredResource) {
        let _ = self.sender.send(CrawlEvent::ResourceDiscovered(event));
    }

    fn fetch_failed(&self, url: &Url, reason: &str) {
        let _ = self.sender.send(CrawlEvent::FetchFailed {
            url: url.clone(),
            reason: reason.to_string(),
        });
    }
}
