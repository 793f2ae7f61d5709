//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive
//! full crawl cycles end-to-end.

use harrow::{ChannelSink, CrawlConfig, CrawlEvent, Crawler, LinkOrigin};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration seeded at the mock server's root
fn test_config(server: &MockServer, max_depth: u32) -> CrawlConfig {
    let mut config = CrawlConfig::default();
    config.seeds = vec![format!("{}/", server.uri())];
    config.crawler.max_depth = max_depth;
    config.crawler.workers = 4;
    config.crawler.request_timeout_secs = 5;
    config
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

#[tokio::test]
async fn test_full_crawl_discovers_markup_links() {
    let server = MockServer::start().await;

    // One page exercising the main discovery channels: anchors, images,
    // META refresh, and commented-out markup.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><head>
            <meta http-equiv="refresh" content="0; url=/login">
            </head><body>
            <a href="/page1">catalog</a>
            <img src="/logo.png">
            <!-- <a href="/archive/old">retired nav</a> -->
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_response("<html><body>leaf</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(html_response("<html><body>form</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/archive/old"))
        .respond_with(html_response("<html><body>old</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (sink, mut events) = ChannelSink::new();
    let crawler = Crawler::new(test_config(&server, 3))
        .expect("Failed to create crawler")
        .with_sink(Arc::new(sink));
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 5);
    assert_eq!(summary.stats.admitted, 5);
    assert_eq!(summary.stats.fetch_failures, 0);
    assert!(!summary.stopped);

    let mut discovered = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CrawlEvent::ResourceDiscovered(found) = event {
            discovered.push((found.url.path().to_string(), found.origin, found.depth));
        }
    }

    assert!(discovered.contains(&("/".to_string(), LinkOrigin::Seed, 0)));
    assert!(discovered.contains(&(
        "/page1".to_string(),
        LinkOrigin::Attribute {
            element: "a",
            attribute: "href"
        },
        1
    )));
    assert!(discovered.contains(&("/login".to_string(), LinkOrigin::MetaDirective, 1)));
    assert!(discovered.contains(&("/archive/old".to_string(), LinkOrigin::Comment, 1)));
    assert!(discovered.contains(&(
        "/logo.png".to_string(),
        LinkOrigin::Attribute {
            element: "img",
            attribute: "src"
        },
        1
    )));
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;

    // A chain: / -> level1 -> level2 -> level3
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body><a href="/level1">Level 1</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html_response(
            r#"<html><body><a href="/level2">Level 2</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_response(
            r#"<html><body><a href="/level3">Level 3</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level3"))
        .respond_with(html_response("<html><body>Level 3</body></html>"))
        .expect(0) // Should never be called with max_depth=2
        .mount(&server)
        .await;

    let crawler = Crawler::new(test_config(&server, 2)).expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 3, "Expected /, /level1, /level2");
    assert_eq!(summary.stats.depth_exceeded, 1);
}

#[tokio::test]
async fn test_failed_fetch_does_not_stop_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body><a href="/missing">gone</a><a href="/ok">fine</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_response("<html><body>fine</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let (sink, mut events) = ChannelSink::new();
    let crawler = Crawler::new(test_config(&server, 2))
        .expect("Failed to create crawler")
        .with_sink(Arc::new(sink));
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 2);
    assert_eq!(summary.stats.fetch_failures, 1);

    let mut failures = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CrawlEvent::FetchFailed { url, .. } = event {
            failures.push(url.path().to_string());
        }
    }
    assert_eq!(failures, vec!["/missing"]);
}

#[tokio::test]
async fn test_robots_txt_is_mined_not_obeyed() {
    let server = MockServer::start().await;

    // Disallow rules are exactly the paths worth looking at; harrow fetches
    // them instead of skipping them.
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    "User-agent: *\nDisallow: /secret\nDisallow: /tmp/*\nSitemap: {}/sitemap.xml\n",
                    server.uri()
                ))
                .insert_header("content-type", "text/plain"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/secret"))
        .respond_with(html_response("<html><body>not so secret</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<?xml version="1.0"?><urlset><url><loc>{}/from-sitemap</loc></url></urlset>"#,
                    server.uri()
                ))
                .insert_header("content-type", "application/xml"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/from-sitemap"))
        .respond_with(html_response("<html><body>listed</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server, 5);
    config.seeds = vec![format!("{}/robots.txt", server.uri())];

    let crawler = Crawler::new(config).expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 4);
    assert_eq!(summary.stats.admitted, 4);
}

#[tokio::test]
async fn test_duplicate_links_fetched_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="/shared">one</a>
            <a href="/shared">two</a>
            <a href="/other">three</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(html_response(
            r#"<html><body><a href="/shared">again</a></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html_response("<html><body>shared</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = Crawler::new(test_config(&server, 3)).expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 3);
    assert_eq!(summary.stats.duplicates, 2);
}

#[tokio::test]
async fn test_exclusions_and_foreign_hosts_refused() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="/logout">logout</a>
            <a href="/stay">stay</a>
            <a href="http://external.invalid/x">offsite</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .respond_with(html_response("<html><body>bye</body></html>"))
        .expect(0) // Excluded by pattern
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/stay"))
        .respond_with(html_response("<html><body>here</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server, 3);
    config.scope.exclude_patterns = vec!["/logout".to_string()];

    let crawler = Crawler::new(config).expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 2);
    assert_eq!(summary.stats.out_of_scope, 2, "excluded path + foreign host");
}

#[tokio::test]
async fn test_base_element_controls_resolution() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/app/"))
        .respond_with(html_response(
            r#"<html><head><base href="/static/"></head>
            <body><a href="style.css">css</a></body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/static/style.css"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("body {}")
                .insert_header("content-type", "text/css"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app/style.css"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0) // BASE must win over the page URL
        .mount(&server)
        .await;

    let mut config = test_config(&server, 2);
    config.seeds = vec![format!("{}/app/", server.uri())];

    let crawler = Crawler::new(config).expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.pages_fetched, 2);
}

#[tokio::test]
async fn test_page_cap_stops_admissions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="/p1">1</a><a href="/p2">2</a><a href="/p3">3</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    for page in ["/p1", "/p2", "/p3"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_response("<html><body>page</body></html>"))
            .mount(&server)
            .await;
    }

    let mut config = test_config(&server, 3);
    config.crawler.max_pages = Some(2);

    let crawler = Crawler::new(config).expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.stats.admitted, 2);
    assert_eq!(summary.stats.pages_fetched, 2);
    assert_eq!(summary.stats.page_limit_hits, 2);
}
