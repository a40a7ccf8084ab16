//! Crawl configuration.
//!
//! Everything the pipeline used to treat as a process-wide constant — user
//! agent, hub endpoint, worker count, request timeout — lives in one
//! [`CrawlConfig`] value handed to the orchestrator at construction time, so
//! tests and alternate deployments can override any of it.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::cli::Cli;

/// Browser-like User-Agent the source site expects.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0";

/// WebSub hub that gets pinged after the feed is written.
pub const DEFAULT_HUB_URL: &str = "https://pubsubhubbub.appspot.com/";

/// Default width of the article fetch pool.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// The publication's timezone, UTC+8.
pub fn macau_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

/// Current time in UTC+8.
pub fn macau_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&macau_offset())
}

/// Explicit configuration for one crawler instance.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Site root the daily index URLs are built from.
    pub base_url: String,
    /// Public URL of the generated feed.
    pub self_feed_url: String,
    /// WebSub hub endpoint.
    pub hub_url: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Maximum number of concurrently running fetch tasks.
    pub concurrency: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Whether items carry a separate truncated summary.
    pub include_summary: bool,
}

impl CrawlConfig {
    /// Build the configuration from parsed CLI arguments.
    pub fn from_cli(args: &Cli) -> Self {
        CrawlConfig {
            base_url: args.base_url.trim_end_matches('/').to_string(),
            self_feed_url: args.feed_url.clone(),
            hub_url: DEFAULT_HUB_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: args.concurrency,
            timeout: Duration::from_secs(args.timeout_secs),
            include_summary: !args.no_summary,
        }
    }

    /// Index page URL for one edition date, e.g.
    /// `https://www.macaodaily.com/html/2026-08/27/node_1.htm`.
    pub fn index_url_for(&self, date: NaiveDate) -> String {
        format!("{}/html/{}/node_1.htm", self.base_url, date.format("%Y-%m/%d"))
    }

    /// Shared HTTP client with the configured User-Agent and timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
    }
}
