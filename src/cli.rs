//! Command-line interface definitions.
//!
//! All options can be passed as flags; the feed URL can also come from the
//! environment, which is how the scheduled CI job supplies it.

use chrono::NaiveDate;
use clap::Parser;

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT_SECS};

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Write rss.xml for today's edition and ping the hub
/// macau-daily-rss --feed-url https://example.com/rss.xml
///
/// # Also produce an HTML digest, for a fixed past edition
/// macau-daily-rss --feed-url https://example.com/rss.xml \
///     --html-out index.html --date 2026-08-26
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output path for the RSS feed
    #[arg(short, long, default_value = "rss.xml")]
    pub output: String,

    /// Optional output path for the HTML digest (enables digest generation)
    #[arg(long)]
    pub html_out: Option<String>,

    /// Public URL of the generated feed, used for atom:link rel="self" and
    /// for the WebSub publish ping
    #[arg(long, env = "FEED_URL")]
    pub feed_url: String,

    /// Site root the daily index URLs are built from
    #[arg(long, default_value = "https://www.macaodaily.com")]
    pub base_url: String,

    /// Crawl a fixed edition date (YYYY-MM-DD) instead of today in UTC+8
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Maximum number of concurrent article fetches
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Skip the truncated item summaries (description falls back to the body)
    #[arg(long)]
    pub no_summary: bool,

    /// Skip the WebSub publish notification
    #[arg(long)]
    pub no_ping: bool,
}
