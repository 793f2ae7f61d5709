//! robots.txt mining
//!
//! Reads robots.txt as a disclosure, not a policy. `Disallow` lines are the
//! interesting ones: operators list exactly the paths they do not want indexed,
//! which is a map of what to look at. `Allow` and `Sitemap` lines come along
//! for completeness.

use crate::extract::{LinkCollector, LinkOrigin, ResourceExtractor};
use crate::resource::FetchedResource;

/// Extractor for robots.txt responses, matched by request path
pub struct RobotsTxtExtractor;

/// Strips an inline `#` comment and surrounding whitespace from a line
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// Splits a `Field: value` robots.txt line, matching the field case-insensitively
fn directive_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let (name, value) = line.split_once(':')?;
    if name.trim().eq_ignore_ascii_case(field) {
        Some(value.trim())
    } else {
        None
    }
}

impl ResourceExtractor for RobotsTxtExtractor {
    fn name(&self) -> &'static str {
        "robots"
    }

    fn can_handle(&self, resource: &FetchedResource, already_consumed: bool) -> bool {
        !already_consumed && resource.request_url.path().eq_ignore_ascii_case("/robots.txt")
    }

    fn extract(&self, resource: &FetchedResource, out: &mut LinkCollector) -> bool {
        let before = out.len();

        for line in resource.body.lines() {
            let line = strip_comment(line);
            if line.is_empty() {
                continue;
            }

            for field in ["allow", "disallow"] {
                if let Some(path) = directive_value(line, field) {
                    // Wildcard rules describe path families, not fetchable
                    // resources.
                    if !path.is_empty() && !path.contains('*') {
                        out.accept(path, &resource.request_url, LinkOrigin::RobotsRule);
                    }
                }
            }

            if let Some(target) = directive_value(line, "sitemap") {
                if !target.is_empty() {
                    out.accept(target, &resource.request_url, LinkOrigin::SitemapEntry);
                }
            }
        }

        out.len() > before
    }
}
