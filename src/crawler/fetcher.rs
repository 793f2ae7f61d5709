//! HTTP fetching
//!
//! One GET per admitted URL, redirects followed by the client. The fetcher
//! reports the final post-redirect URL so extraction resolves relative links
//! against the page that actually answered.

use crate::config::CrawlConfig;
use crate::resource::FetchedResource;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Retrieval seam between the crawl engine and the network
///
/// The engine only ever sees this trait, so tests drive the full pipeline with
/// canned responses instead of sockets.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError>;
}

/// Production fetcher backed by a shared reqwest client
pub struct HttpFetcher {
    client: Client,
    max_parse_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.crawler.user_agent.clone())
            .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            max_parse_bytes: config.crawler.max_parse_bytes,
        })
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        // Oversized responses are parsed up to the cap rather than refused;
        // references near the front of a page survive a giant tail.
        let slice = if bytes.len() > self.max_parse_bytes {
            &bytes[..self.max_parse_bytes]
        } else {
            &bytes[..]
        };
        let body = String::from_utf8_lossy(slice).into_owned();

        Ok(FetchedResource::new(
            final_url,
            status.as_u16(),
            content_type,
            body,
        ))
    }
}

/// Classifies a reqwest error into the fetch error taxonomy
fn classify(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}
