//! Fetched resources and their coarse content classification
//!
//! Extractors never see raw HTTP responses; the fetcher reduces every response
//! to a [`FetchedResource`] first, so the chain can make handling decisions from
//! the classification alone.

use url::Url;

/// Coarse content classification derived from the Content-Type header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// HTML or XHTML markup
    Markup,
    /// XML that is not markup (sitemaps, feeds)
    Xml,
    /// Any other `text/*` body
    Text,
    /// Binary or unknown content; never parsed
    Other,
}

impl ContentKind {
    /// Classifies a raw Content-Type header value
    ///
    /// Markup wins over Xml so that `application/xhtml+xml` lands with the
    /// markup extractor. A missing header classifies as Other.
    pub fn classify(content_type: Option<&str>) -> Self {
        let ct = match content_type {
            Some(ct) => ct.to_lowercase(),
            None => return Self::Other,
        };

        if ct.contains("html") {
            Self::Markup
        } else if ct.contains("xml") {
            Self::Xml
        } else if ct.starts_with("text/") {
            Self::Text
        } else {
            Self::Other
        }
    }

    /// Returns true for bodies that are worth scanning for URLs at all
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Markup | Self::Xml | Self::Text)
    }
}

/// A fetched resource ready for the extraction pass
///
/// Owned by exactly one worker for the duration of its fetch-and-extract cycle;
/// nothing here is shared.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// The URL the content was actually served from. The transport follows
    /// redirects, so this may differ from the queued URL; links resolve
    /// against this one.
    pub request_url: Url,

    /// HTTP status code of the final response
    pub status: u16,

    /// Raw Content-Type header value, if the server sent one
    pub content_type: Option<String>,

    /// Classification of `content_type`
    pub kind: ContentKind,

    /// Body decoded as UTF-8 (lossily), truncated at the configured parse cap
    pub body: String,
}

impl FetchedResource {
    /// Builds a resource, deriving the kind from the Content-Type
    pub fn new(request_url: Url, status: u16, content_type: Option<String>, body: String) -> Self {
        let kind = ContentKind::classify(content_type.as_deref());
        Self {
            request_url,
            status,
            content_type,
            kind,
            body,
        }
    }
}
