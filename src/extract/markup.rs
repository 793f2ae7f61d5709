//! Markup extraction
//!
//! The workhorse of the chain: walks HTML documents and mines every place the
//! platform can stash a URL.
//!
//! # Extraction Rules
//!
//! - Attributes of the link-bearing elements (`a[href]`, `img[src]`,
//!   `iframe[src]`, `link[href]`, ...). `ping` attributes are whitespace-split
//!   lists, each entry its own link.
//! - `<base href>` — the first BASE element overrides the resolution base for
//!   the whole document.
//! - META refresh/location directives: the `url=` value inside `content`.
//! - The DOCTYPE declaration: space-free double-quoted tokens (in practice the
//!   DTD system identifier).
//! - HTML comments, when enabled: each comment is re-parsed as markup, and only
//!   if that turns up nothing is the raw comment text swept for bare URLs.
//!   Commented-out navigation is a classic source of forgotten endpoints.

use crate::extract::text::BARE_URL;
use crate::extract::{LinkCollector, LinkOrigin, ResourceExtractor};
use crate::resource::{ContentKind, FetchedResource};
use crate::url::canonicalize;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Node, Selector};
use std::sync::LazyLock;
use url::Url;

/// Elements whose attributes carry fetchable references, scanned in this order
const LINK_BEARING: &[(&str, &[&str])] = &[
    ("a", &["href", "ping"]),
    ("applet", &["archive", "codebase", "src"]),
    ("area", &["href", "ping"]),
    ("audio", &["src"]),
    ("embed", &["src"]),
    ("frame", &["src"]),
    ("iframe", &["src"]),
    ("input", &["src"]),
    ("isindex", &["action"]),
    ("link", &["href"]),
    ("object", &["data", "codebase"]),
    ("script", &["src"]),
    ("img", &["src", "longdesc", "lowsrc", "dynsrc"]),
    ("html", &["manifest"]),
    ("body", &["background"]),
];

/// First `url=` value inside a META refresh/location content attribute
static META_URL: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r#"url\s*=\s*["']?([^;'"]+)"#)
        .case_insensitive(true)
        .build()
        .expect("hardcoded META url pattern is valid")
});

/// The DOCTYPE declaration and its content, taken from the raw body. The HTML
/// tree strips the declaration's quoting, which the token rule depends on.
static DOCTYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"<!DOCTYPE\s+([^>]+)>")
        .case_insensitive(true)
        .build()
        .expect("hardcoded DOCTYPE pattern is valid")
});

/// Extractor for HTML/XHTML resources
pub struct MarkupExtractor {
    /// Whether HTML comments are scanned for references
    parse_comments: bool,
}

impl MarkupExtractor {
    pub fn new(parse_comments: bool) -> Self {
        Self { parse_comments }
    }
}

impl ResourceExtractor for MarkupExtractor {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn can_handle(&self, resource: &FetchedResource, already_consumed: bool) -> bool {
        !already_consumed && resource.kind == ContentKind::Markup
    }

    fn extract(&self, resource: &FetchedResource, out: &mut LinkCollector) -> bool {
        let document = Html::parse_document(&resource.body);
        let base = effective_base(&document, &resource.request_url);
        let before = out.len();

        scan_markup(&document, &base, out, false);
        scan_doctype(&resource.body, &base, out);
        if self.parse_comments {
            scan_comments(&document, &base, out);
        }

        out.len() > before
    }
}

/// Resolves the document's effective base URL
///
/// The first BASE element wins, matching browser behavior; a BASE without a
/// usable href (absent, empty, or failing canonicalization) leaves the request
/// URL in charge.
fn effective_base(document: &Html, request_url: &Url) -> Url {
    let selector = match Selector::parse("base") {
        Ok(s) => s,
        Err(_) => return request_url.clone(),
    };

    if let Some(element) = document.select(&selector).next() {
        if let Some(href) = element.value().attr("href") {
            let href = href.trim();
            if !href.is_empty() {
                if let Ok(resolved) = canonicalize(href, request_url) {
                    return resolved;
                }
            }
        }
    }

    request_url.clone()
}

/// Scans the element table and META directives of a parsed document
///
/// Also used on the fragments produced by re-parsing comments; references found
/// that way are tagged with the comment origin instead of their attribute.
fn scan_markup(document: &Html, base: &Url, out: &mut LinkCollector, from_comment: bool) {
    for &(element, attributes) in LINK_BEARING {
        let selector = match Selector::parse(element) {
            Ok(s) => s,
            Err(_) => continue,
        };

        for matched in document.select(&selector) {
            for &attribute in attributes {
                let value = match matched.value().attr(attribute) {
                    Some(v) => v.trim(),
                    None => continue,
                };
                if value.is_empty() {
                    continue;
                }

                let origin = if from_comment {
                    LinkOrigin::Comment
                } else {
                    LinkOrigin::Attribute { element, attribute }
                };

                // Ping lists name one tracking endpoint per whitespace-separated
                // entry.
                if attribute == "ping" {
                    for target in value.split_whitespace() {
                        out.accept(target, base, origin);
                    }
                } else {
                    out.accept(value, base, origin);
                }
            }
        }
    }

    scan_meta(document, base, out, from_comment);
}

/// Extracts META refresh/location redirect targets
fn scan_meta(document: &Html, base: &Url, out: &mut LinkCollector, from_comment: bool) {
    let selector = match Selector::parse("meta") {
        Ok(s) => s,
        Err(_) => return,
    };

    for matched in document.select(&selector) {
        let equiv = matched.value().attr("http-equiv");
        let content = matched.value().attr("content");
        let (equiv, content) = match (equiv, content) {
            (Some(e), Some(c)) => (e.trim(), c),
            _ => continue,
        };

        if equiv.eq_ignore_ascii_case("refresh") || equiv.eq_ignore_ascii_case("location") {
            if let Some(target) = META_URL.captures(content).and_then(|c| c.get(1)) {
                let origin = if from_comment {
                    LinkOrigin::Comment
                } else {
                    LinkOrigin::MetaDirective
                };
                out.accept(target.as_str(), base, origin);
            }
        }
    }
}

/// Extracts quoted tokens from the DOCTYPE declaration
///
/// The declaration content is split on single spaces and only tokens fully
/// wrapped in double quotes become links. A quoted public identifier containing
/// spaces splits into fragments that fail the wrapping test, so in practice this
/// yields the space-free DTD system identifier and nothing else.
fn scan_doctype(body: &str, base: &Url, out: &mut LinkCollector) {
    let content = match DOCTYPE_DECL.captures(body).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return,
    };

    for token in content.split(' ') {
        if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
            let inner = &token[1..token.len() - 1];
            if !inner.is_empty() {
                out.accept(inner, base, LinkOrigin::Doctype);
            }
        }
    }
}

/// Scans HTML comments for references
///
/// Each comment is re-parsed as markup first; the permissive bare-URL sweep only
/// runs on comments whose markup scan came up empty, so a commented-out anchor
/// is not reported twice.
fn scan_comments(document: &Html, base: &Url, out: &mut LinkCollector) {
    for node in document.tree.nodes() {
        let comment = match node.value() {
            Node::Comment(c) => c,
            _ => continue,
        };
        let text: &str = comment;

        let fragment = Html::parse_fragment(text);
        let before = out.len();
        scan_markup(&fragment, base, out, true);

        if out.len() == before {
            for m in BARE_URL.find_iter(text) {
                out.accept(m.as_str(), base, LinkOrigin::Comment);
            }
        }
    }
}
