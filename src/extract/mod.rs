//! The resource-extraction pipeline
//!
//! Extraction is a chain of responsibility: every fetched resource is walked
//! down an ordered list of [`ResourceExtractor`]s, specific ones first and
//! permissive fallbacks last. Each extractor decides for itself whether to run,
//! and the chain threads an `already_consumed` flag through so a fallback can
//! stand down once a specific extractor has produced links from the same
//! resource.
//!
//! Extractors never talk to the frontier. They emit raw references into a
//! [`LinkCollector`], which canonicalizes them against the page they were found
//! on and stamps them with `source depth + 1`; the worker hands the collected
//! candidates to the frontier in one batch afterwards.

mod markup;
mod robots;
mod sitemap;
mod text;

pub use markup::MarkupExtractor;
pub use robots::RobotsTxtExtractor;
pub use sitemap::SitemapExtractor;
pub use text::PlainTextExtractor;

use crate::resource::FetchedResource;
use crate::url::canonicalize;
use std::fmt;
use url::Url;

/// Where a candidate link was found, kept for diagnostics and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrigin {
    /// A configured seed URL
    Seed,
    /// A markup attribute such as `a[href]` or `img[src]`
    Attribute {
        element: &'static str,
        attribute: &'static str,
    },
    /// A META refresh/location directive
    MetaDirective,
    /// A quoted token inside the DOCTYPE declaration
    Doctype,
    /// Inside an HTML comment
    Comment,
    /// Swept out of body text by the permissive URL pattern
    PlainText,
    /// An Allow/Disallow path in robots.txt
    RobotsRule,
    /// A `<loc>` entry in a sitemap
    SitemapEntry,
}

impl fmt::Display for LinkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seed => write!(f, "seed"),
            Self::Attribute { element, attribute } => write!(f, "{}[{}]", element, attribute),
            Self::MetaDirective => write!(f, "meta"),
            Self::Doctype => write!(f, "doctype"),
            Self::Comment => write!(f, "comment"),
            Self::PlainText => write!(f, "text"),
            Self::RobotsRule => write!(f, "robots.txt"),
            Self::SitemapEntry => write!(f, "sitemap"),
        }
    }
}

/// A canonicalized link waiting for a frontier admission verdict
#[derive(Debug, Clone)]
pub struct CandidateLink {
    /// Canonical absolute URL
    pub url: Url,

    /// Depth the resource would be crawled at (source depth + 1)
    pub depth: u32,

    /// Syntactic source of the reference
    pub origin: LinkOrigin,
}

/// Collects and canonicalizes the references one extraction pass produces
///
/// Malformed or out-of-protocol references are counted and dropped; a page full
/// of garbage links costs nothing but a counter.
pub struct LinkCollector {
    source_depth: u32,
    links: Vec<CandidateLink>,
    rejected: u64,
}

impl LinkCollector {
    /// Creates a collector for links found on a resource at `source_depth`
    pub fn new(source_depth: u32) -> Self {
        Self {
            source_depth,
            links: Vec::new(),
            rejected: 0,
        }
    }

    /// Canonicalizes a raw reference against `base` and keeps it
    ///
    /// Returns true if the reference survived canonicalization.
    pub fn accept(&mut self, raw: &str, base: &Url, origin: LinkOrigin) -> bool {
        match canonicalize(raw, base) {
            Ok(url) => {
                self.links.push(CandidateLink {
                    url,
                    depth: self.source_depth + 1,
                    origin,
                });
                true
            }
            Err(e) => {
                tracing::debug!("Dropping reference '{}' found on {}: {}", raw, base, e);
                self.rejected += 1;
                false
            }
        }
    }

    /// The candidates collected so far
    pub fn links(&self) -> &[CandidateLink] {
        &self.links
    }

    /// Number of candidates collected so far
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True if nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Number of references dropped as malformed or out of protocol
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Consumes the collector, yielding the candidates
    pub fn into_links(self) -> Vec<CandidateLink> {
        self.links
    }
}

/// One link in the chain of responsibility
pub trait ResourceExtractor: Send + Sync {
    /// Short stable name, used in logs
    fn name(&self) -> &'static str;

    /// Whether this extractor wants the resource
    ///
    /// `already_consumed` is true once an earlier extractor in the chain has
    /// found links in this resource; fallback extractors decline then, specific
    /// extractors ignore it.
    fn can_handle(&self, resource: &FetchedResource, already_consumed: bool) -> bool;

    /// Scans the resource and emits candidates into `out`
    ///
    /// Returns true if at least one link was found, which marks the resource
    /// consumed for the rest of the chain.
    fn extract(&self, resource: &FetchedResource, out: &mut LinkCollector) -> bool;
}

/// The ordered extractor list a session runs every resource through
pub struct ExtractorChain {
    extractors: Vec<Box<dyn ResourceExtractor>>,
}

impl ExtractorChain {
    /// Builds a chain from an explicit extractor list, evaluated in order
    pub fn new(extractors: Vec<Box<dyn ResourceExtractor>>) -> Self {
        Self { extractors }
    }

    /// The standard chain: robots.txt and sitemap miners, then the markup
    /// extractor, with the plain-text sweep as the fallback
    pub fn standard(parse_comments: bool) -> Self {
        Self::new(vec![
            Box::new(RobotsTxtExtractor),
            Box::new(SitemapExtractor),
            Box::new(MarkupExtractor::new(parse_comments)),
            Box::new(PlainTextExtractor),
        ])
    }

    /// Runs the resource down the chain
    ///
    /// Every extractor whose `can_handle` accepts gets to run; a resource is
    /// consumed once any of them reports links found. Returns whether anything
    /// consumed the resource.
    pub fn process(&self, resource: &FetchedResource, out: &mut LinkCollector) -> bool {
        let mut consumed = false;

        for extractor in &self.extractors {
            if !extractor.can_handle(resource, consumed) {
                tracing::trace!(
                    "Extractor {} declined {}",
                    extractor.name(),
                    resource.request_url
                );
                continue;
            }

            let found = extractor.extract(resource, out);
            tracing::trace!(
                "Extractor {} ran on {} (found links: {})",
                extractor.name(),
                resource.request_url,
                found
            );
            consumed |= found;
        }

        consumed
    }

    /// Number of extractors registered
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// True if the chain has no extractors
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}
