//! Sitemap extraction
//!
//! Pulls `<loc>` entries out of XML sitemaps and sitemap indexes. Both formats
//! wrap their URLs in the same element, so one pattern covers pages and nested
//! sitemaps alike.

use crate::extract::{LinkCollector, LinkOrigin, ResourceExtractor};
use crate::resource::{ContentKind, FetchedResource};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// `<loc>` entry content, shared by urlset and sitemapindex documents
static LOC_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"<loc>\s*([^<]+?)\s*</loc>")
        .case_insensitive(true)
        .build()
        .expect("hardcoded sitemap loc pattern is valid")
});

/// Extractor for XML sitemap documents
pub struct SitemapExtractor;

impl ResourceExtractor for SitemapExtractor {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn can_handle(&self, resource: &FetchedResource, already_consumed: bool) -> bool {
        if already_consumed {
            return false;
        }
        // Sitemaps are routinely served as text/plain or with no content type,
        // so the well-known path is matched alongside the XML kind.
        resource.kind == ContentKind::Xml
            || resource
                .request_url
                .path()
                .to_ascii_lowercase()
                .ends_with("sitemap.xml")
    }

    fn extract(&self, resource: &FetchedResource, out: &mut LinkCollector) -> bool {
        let before = out.len();

        for captures in LOC_ENTRY.captures_iter(&resource.body) {
            if let Some(entry) = captures.get(1) {
                out.accept(entry.as_str(), &resource.request_url, LinkOrigin::SitemapEntry);
            }
        }

        out.len() > before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn sitemap_resource(body: &str) -> FetchedResource {
        FetchedResource::new(
            Url::parse("http://target.example/sitemap.xml").unwrap(),
            200,
            Some("application/xml".to_string()),
            body.to_string(),
        )
    }

    fn extracted(body: &str) -> Vec<String> {
        let resource = sitemap_resource(body);
        let mut out = LinkCollector::new(0);
        SitemapExtractor.extract(&resource, &mut out);
        out.into_links()
            .into_iter()
            .map(|l| l.url.to_string())
            .collect()
    }

    #[test]
    fn test_urlset_entries() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>http://target.example/</loc></url>
              <url><loc>http://target.example/about</loc></url>
            </urlset>"#;
        assert_eq!(
            extracted(body),
            vec!["http://target.example/", "http://target.example/about"]
        );
    }

    #[test]
    fn test_sitemap_index_entries() {
        let body = r#"<sitemapindex>
              <sitemap><loc>http://target.example/sitemap-news.xml</loc></sitemap>
            </sitemapindex>"#;
        assert_eq!(extracted(body), vec!["http://target.example/sitemap-news.xml"]);
    }

    #[test]
    fn test_entry_whitespace_trimmed() {
        let body = "<urlset><url><loc>\n    http://target.example/padded\n  </loc></url></urlset>";
        assert_eq!(extracted(body), vec!["http://target.example/padded"]);
    }

    #[test]
    fn test_relative_entries_resolved() {
        // Not valid per the sitemap protocol, but seen in the wild.
        let body = "<urlset><url><loc>/relative</loc></url></urlset>";
        assert_eq!(extracted(body), vec!["http://target.example/relative"]);
    }

    #[test]
    fn test_loc_tag_case_insensitive() {
        let body = "<urlset><url><LOC>http://target.example/upper</LOC></url></urlset>";
        assert_eq!(extracted(body), vec!["http://target.example/upper"]);
    }

    #[test]
    fn test_handles_xml_kind_or_sitemap_path() {
        let by_kind = FetchedResource::new(
            Url::parse("http://target.example/feed").unwrap(),
            200,
            Some("text/xml".to_string()),
            String::new(),
        );
        assert!(SitemapExtractor.can_handle(&by_kind, false));

        let by_path = FetchedResource::new(
            Url::parse("http://target.example/Sitemap.XML").unwrap(),
            200,
            Some("text/plain".to_string()),
            String::new(),
        );
        assert!(SitemapExtractor.can_handle(&by_path, false));
        assert!(!SitemapExtractor.can_handle(&by_path, true));

        let html = FetchedResource::new(
            Url::parse("http://target.example/page").unwrap(),
            200,
            Some("text/html".to_string()),
            String::new(),
        );
        assert!(!SitemapExtractor.can_handle(&html, false));
    }

    #[test]
    fn test_reports_found() {
        let resource = sitemap_resource("<urlset><url><loc>http://target.example/a</loc></url></urlset>");
        let mut out = LinkCollector::new(0);
        assert!(SitemapExtractor.extract(&resource, &mut out));

        let empty = sitemap_resource("<urlset></urlset>");
        let mut out = LinkCollector::new(0);
        assert!(!SitemapExtractor.extract(&empty, &mut out));
    }
}
