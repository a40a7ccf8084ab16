//! # Macau Daily RSS
//!
//! Crawls the Macao Daily (澳門日報) front page and republishes the day's
//! edition as an RSS 2.0 feed, with an optional self-contained HTML digest
//! and a WebSub publish ping so subscribers get the update pushed.
//!
//! ## Usage
//!
//! ```sh
//! macau-daily-rss --feed-url https://example.com/rss.xml -o rss.xml
//! ```
//!
//! ## Architecture
//!
//! One run is a single pipeline pass:
//! 1. **Index**: resolve today's front page into an ordered list of article links
//! 2. **Fetch**: download and extract every article (parallel, 8 at a time)
//! 3. **Assemble**: reorder completions into reading order, render RSS/HTML
//! 4. **Notify**: write the files and ping the WebSub hub
//!
//! When today's edition does not exist yet, the run falls back exactly once
//! to yesterday's; if that is also missing the process exits cleanly with no
//! output, since an unpublished edition is expected, not an error.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod extract;
mod feed;
mod fetch;
mod index;
mod models;
mod orchestrator;
mod sanitize;
mod websub;

use cli::Cli;
use config::{macau_now, CrawlConfig};
use orchestrator::{crawl_with_fallback, LiveCrawler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("macau-daily-rss starting up");

    let args = Cli::parse();
    debug!(?args.output, ?args.html_out, ?args.date, "Parsed CLI arguments");

    let config = CrawlConfig::from_cli(&args);
    let client = config.http_client()?;

    let today = args.date.unwrap_or_else(|| macau_now().date_naive());
    info!(%today, concurrency = config.concurrency, "Starting crawl");

    let crawler = LiveCrawler::new(&client, &config);
    let Some(feed_document) = crawl_with_fallback(&crawler, today).await else {
        // Neither today nor yesterday is published yet. Expected condition:
        // write nothing and exit zero so the scheduler does not alarm.
        info!("No edition available for today or yesterday; nothing written");
        return Ok(());
    };

    let rss = feed::render_rss(&feed_document, config.include_summary);
    tokio::fs::write(&args.output, rss).await?;
    info!(
        path = %args.output,
        items = feed_document.items.len(),
        failed = feed_document.items.iter().filter(|r| !r.ok).count(),
        "Wrote RSS feed"
    );

    if let Some(html_path) = &args.html_out {
        let digest = feed::render_html_digest(&feed_document);
        tokio::fs::write(html_path, digest).await?;
        info!(path = %html_path, "Wrote HTML digest");
    }

    if args.no_ping {
        debug!("WebSub ping disabled");
    } else {
        websub::ping_hub(&client, &config.hub_url, &config.self_feed_url).await;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
