//! Eurocrawl main entry point
//!
//! Command-line interface for the crawler worker node.

use anyhow::Context;
use clap::Parser;
use eurocrawl::config::{load_config_with_hash, Config};
use eurocrawl::Crawler;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Eurocrawl: a polite crawler worker node
///
/// Leases crawl tasks from a coordinator, fetches pages while respecting
/// robots.txt and per-domain delays, extracts readable content, and submits
/// discovered links and content back to the coordinator.
#[derive(Parser, Debug)]
#[command(name = "eurocrawl")]
#[command(version)]
#[command(about = "A polite crawler worker node", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Stop after this many successfully crawled pages
    #[arg(long, default_value_t = 1000)]
    max_tasks: usize,

    /// Validate the configuration and show what would run, without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        print_effective_config(&config, cli.max_tasks);
        return Ok(());
    }

    tracing::info!("Starting crawler node");
    tracing::info!("Coordinator: {}", config.coordinator.base_url);
    tracing::info!("User-Agent: {}", config.user_agent.header_value());
    tracing::info!(
        "Respect robots.txt: {}",
        config.politeness.respect_robots_txt
    );

    let crawler = Crawler::new(config)?;

    tokio::select! {
        result = crawler.run(cli.max_tasks, log_crawled_page) => {
            let completed = result?;
            tracing::info!("Crawl finished after {} completed tasks", completed);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}

fn log_crawled_page(content: eurocrawl::ExtractedContent) {
    tracing::info!(
        "crawled {} (title: {}, {} chars, language: {})",
        content.url,
        content.title.as_deref().unwrap_or("n/a"),
        content.text.len(),
        content.language.as_deref().unwrap_or("unknown")
    );
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("eurocrawl=info,warn"),
            1 => EnvFilter::new("eurocrawl=debug,info"),
            2 => EnvFilter::new("eurocrawl=trace,debug"),
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

/// Handles --dry-run: prints the effective configuration without crawling
fn print_effective_config(config: &Config, max_tasks: usize) {
    println!("=== Eurocrawl Dry Run ===\n");

    println!("Coordinator:");
    println!("  Base URL: {}", config.coordinator.base_url);
    println!("  API version: {}", config.coordinator.api_version);

    println!("\nCrawler:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!("  Idle backoff: {}s", config.crawler.idle_backoff_secs);
    println!("  Max tasks this run: {}", max_tasks);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nPoliteness:");
    println!(
        "  Respect robots.txt: {}",
        config.politeness.respect_robots_txt
    );
    println!(
        "  Default crawl delay: {}s",
        config.politeness.default_crawl_delay_secs
    );

    println!("\nDiscovery:");
    println!("  Extract links: {}", config.discovery.extract_links);
    println!(
        "  Max links per page: {}",
        config.discovery.max_links_per_page
    );
    println!("  Max depth: {}", config.discovery.max_depth);
    println!(
        "  Min parent score: {}",
        config.discovery.min_parent_score
    );

    println!("\nLanguage filtering:");
    println!("  Enabled: {}", config.language.filter_by_language);
    println!(
        "  Allowed languages: {}",
        config.language.allowed_languages.join(", ")
    );

    println!("\n✓ Configuration is valid");
}
