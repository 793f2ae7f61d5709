//! Harrow main entry point
//!
//! This is the command-line interface for the Harrow attack-surface mapper.

use clap::Parser;
use harrow::config::load_config_with_hash;
use harrow::{ChannelSink, CrawlConfig, CrawlEvent, CrawlSummary, Crawler};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Harrow: an attack-surface mapper for web applications
///
/// Harrow crawls the target defined by a scope configuration, mining markup,
/// robots.txt, and sitemaps for every reachable URL. Discoveries stream to
/// stdout as the crawl progresses.
#[derive(Parser, Debug)]
#[command(name = "harrow")]
#[command(version)]
#[command(about = "Attack-surface mapper for web applications", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the derived scope without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("harrow=info,warn"),
            1 => EnvFilter::new("harrow=debug,info"),
            2 => EnvFilter::new("harrow=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the derived scope
fn handle_dry_run(config: CrawlConfig) -> anyhow::Result<()> {
    println!("=== Harrow Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Parse comments: {}", config.crawler.parse_comments);
    match config.crawler.max_pages {
        Some(cap) => println!("  Page cap: {}", cap),
        None => println!("  Page cap: unlimited"),
    }
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.crawler.user_agent);

    let seed_count = config.seeds.len();
    let crawler = Crawler::new(config)?;

    println!("\nSeeds ({}):", seed_count);
    for seed in crawler.seeds() {
        println!("  - {}", seed);
    }

    let scope = crawler.scope();
    println!("\nAllowed hosts ({}):", scope.allowed_hosts().len());
    for host in scope.allowed_hosts() {
        println!("  - {}", host);
    }

    println!("\nExclusions ({}):", scope.exclusions().len());
    for pattern in scope.exclusions() {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from {} seed URL(s)", seed_count);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig) -> anyhow::Result<()> {
    let (sink, mut events) = ChannelSink::new();
    let crawler = Crawler::new(config)?.with_sink(Arc::new(sink));
    let handle = crawler.handle();

    // Print discoveries as the workers admit them.
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CrawlEvent::ResourceDiscovered(found) => match &found.discovered_from {
                    Some(from) => println!(
                        "[depth {}] {} (via {}, on {})",
                        found.depth, found.url, found.origin, from
                    ),
                    None => println!("[depth {}] {} (seed)", found.depth, found.url),
                },
                CrawlEvent::FetchFailed { url, reason } => {
                    println!("[failed] {}: {}", url, reason);
                }
            }
        }
    });

    // Ctrl-C stops admissions and lets the workers wind down.
    let interrupt = {
        let handle = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping crawl");
                handle.stop();
            }
        })
    };

    let result = crawler.run().await;

    // The channel closes once every sink holder is gone; the printer drains
    // whatever is still buffered and exits.
    interrupt.abort();
    let _ = interrupt.await;
    drop(crawler);
    drop(handle);
    let _ = printer.await;

    match result {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Prints the end-of-crawl report
fn print_summary(summary: &CrawlSummary) {
    let stats = &summary.stats;
    let seconds = summary.duration().num_milliseconds() as f64 / 1000.0;

    println!();
    if summary.stopped {
        println!("Crawl stopped early after {:.1}s", seconds);
    } else {
        println!("Crawl complete in {:.1}s", seconds);
    }
    println!("  Pages fetched:   {}", stats.pages_fetched);
    println!("  Fetch failures:  {}", stats.fetch_failures);
    println!("  URLs discovered: {}", stats.admitted);
    println!("  Links extracted: {}", stats.links_extracted);
    println!("  Links rejected:  {}", stats.links_rejected);
    println!("  Duplicates:      {}", stats.duplicates);
    println!("  Depth refusals:  {}", stats.depth_exceeded);
    println!("  Out of scope:    {}", stats.out_of_scope);
    if stats.page_limit_hits > 0 {
        println!("  Page cap hits:   {}", stats.page_limit_hits);
    }
}
