//! Plain-text fallback extraction
//!
//! The last link in the chain: when no specific extractor has consumed a textual
//! resource, this one sweeps the raw body with a permissive URL pattern. It runs
//! on markup too — a page whose element scan produced nothing can still leak
//! absolute URLs in inline scripts or style blocks.

use crate::extract::{LinkCollector, LinkOrigin, ResourceExtractor};
use crate::resource::FetchedResource;
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// Absolute or protocol-relative URLs in free-form text. Also used for the
/// comment fallback in the markup extractor.
pub(super) static BARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r#"(?:https?:)?//[^\s"'<>#()\[\]{}\x00-\x1f]+"#)
        .case_insensitive(true)
        .build()
        .expect("hardcoded bare-URL pattern is valid")
});

/// Fallback extractor sweeping unconsumed textual bodies for URLs
pub struct PlainTextExtractor;

impl ResourceExtractor for PlainTextExtractor {
    fn name(&self) -> &'static str {
        "text"
    }

    fn can_handle(&self, resource: &FetchedResource, already_consumed: bool) -> bool {
        !already_consumed && resource.kind.is_textual()
    }

    fn extract(&self, resource: &FetchedResource, out: &mut LinkCollector) -> bool {
        let mut found = false;
        for m in BARE_URL.find_iter(&resource.body) {
            found |= out.accept(m.as_str(), &resource.request_url, LinkOrigin::PlainText);
        }
        found
    }
}
