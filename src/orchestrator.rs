//! Day-fallback orchestration.
//!
//! The paper publishes on its own schedule, so "today has no edition yet" is
//! an expected state, not an error. The policy is a two-state machine:
//! attempt today's date, and on an index-level failure (unreachable page or
//! zero links) make exactly one more attempt at yesterday. A successful
//! assembly is terminal even when individual articles failed; both attempts
//! failing means "not yet published" and yields nothing.
//!
//! [`DayCrawler`] is the seam between the policy and the pipeline, so the
//! transition logic is testable with a scripted fake.

use chrono::{Days, NaiveDate};
use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::config::{macau_now, CrawlConfig};
use crate::models::{CrawlOutcome, FeedDocument};
use crate::{feed, fetch, index};

/// One end-to-end crawl attempt against a single edition date.
pub trait DayCrawler {
    /// Run resolve → fetch → assemble for `date`'s index page.
    async fn attempt(&self, date: NaiveDate) -> CrawlOutcome;
}

/// The real pipeline: index resolution, bounded-parallel fetching, assembly.
pub struct LiveCrawler<'a> {
    client: &'a Client,
    config: &'a CrawlConfig,
}

impl<'a> LiveCrawler<'a> {
    /// Wire a crawler onto a shared HTTP client and configuration.
    pub fn new(client: &'a Client, config: &'a CrawlConfig) -> Self {
        LiveCrawler { client, config }
    }
}

impl DayCrawler for LiveCrawler<'_> {
    #[instrument(level = "info", skip(self))]
    async fn attempt(&self, date: NaiveDate) -> CrawlOutcome {
        let index_url = self.config.index_url_for(date);
        info!(%index_url, "Attempting edition");

        let links = match index::resolve_index(self.client, &index_url).await {
            Ok(links) => links,
            Err(e) => {
                warn!(%index_url, error = %e, "Edition unavailable");
                return CrawlOutcome {
                    feed: None,
                    attempted_date: date,
                };
            }
        };

        let records = fetch::fetch_all(self.client, links, self.config.concurrency).await;
        let meta = feed::channel_meta(
            &index_url,
            &self.config.self_feed_url,
            &self.config.hub_url,
            macau_now(),
        );

        CrawlOutcome {
            feed: Some(feed::assemble(records, meta)),
            attempted_date: date,
        }
    }
}

/// Try `today`, then exactly once `today - 1`, then give up.
///
/// `None` means neither edition is published yet; callers must treat this as
/// a clean, non-error outcome.
pub async fn crawl_with_fallback<C: DayCrawler>(
    crawler: &C,
    today: NaiveDate,
) -> Option<FeedDocument> {
    let outcome = crawler.attempt(today).await;
    if let Some(feed) = outcome.feed {
        return Some(feed);
    }

    let yesterday = today - Days::new(1);
    info!(%yesterday, "Edition not yet published; falling back one day");
    let retry = crawler.attempt(yesterday).await;
    if retry.feed.is_none() {
        info!(
            first = %outcome.attempted_date,
            second = %retry.attempted_date,
            "Neither edition is published yet"
        );
    }
    retry.feed
}
