//! Data model for one crawl of the Macao Daily front page.
//!
//! The pipeline hands these types along in one direction:
//! [`ArticleLink`]s come out of index resolution, every link is turned into
//! exactly one [`ArticleRecord`] by a fetch task, and the assembled
//! [`FeedDocument`] owns the sorted records together with the channel
//! metadata. A [`CrawlOutcome`] wraps one end-to-end attempt against one
//! day's index page; the orchestrator holds at most two of these per run.

use chrono::{DateTime, FixedOffset, NaiveDate};
use url::Url;

/// Title used for records whose article page could not be fetched.
pub const FETCH_FAILED_TITLE: &str = "抓取失敗";

/// A resolved absolute article URL and its zero-based slot on the index page.
///
/// Positions form a contiguous range `[0, total)` and URLs are unique;
/// de-duplication keeps the first occurrence and its original position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// Zero-based position in the index page's reading order.
    pub position: usize,
    /// The absolute article page URL.
    pub url: Url,
}

/// One extracted article, successful or not. Immutable once produced.
///
/// A record with `ok = false` still carries placeholder title and body so the
/// feed is never missing an item for a link that was on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Position inherited from the originating [`ArticleLink`].
    pub position: usize,
    /// Sanitized article title.
    pub title: String,
    /// The article page URL, also used as the item permalink.
    pub url: String,
    /// CDATA-safe body HTML: inline images followed by paragraphs.
    pub body_html: String,
    /// Flattened plain-text summary, truncated to 150 characters.
    pub summary: String,
    /// False when the fetch failed or the content container was missing.
    pub ok: bool,
}

impl ArticleRecord {
    /// Build the placeholder record for a link whose fetch task failed.
    ///
    /// One failed article must never abort the pool, so the task boundary
    /// converts any error into this record instead of propagating it.
    pub fn fetch_failure(link: &ArticleLink, message: &str) -> Self {
        ArticleRecord {
            position: link.position,
            title: FETCH_FAILED_TITLE.to_string(),
            url: link.url.to_string(),
            body_html: format!("<p>錯誤: {message}</p>"),
            summary: FETCH_FAILED_TITLE.to_string(),
            ok: false,
        }
    }
}

/// Channel-level feed metadata, fixed at assembly time.
#[derive(Debug, Clone)]
pub struct ChannelMeta {
    /// Edition publication date (08:00 UTC+8 when derivable from the URL).
    pub pub_date: DateTime<FixedOffset>,
    /// Render time in UTC+8.
    pub last_build_date: DateTime<FixedOffset>,
    /// The index page this feed was built from.
    pub source_index_url: String,
    /// Public URL of the generated feed, for `atom:link rel="self"`.
    pub self_feed_url: String,
    /// WebSub hub advertised via `atom:link rel="hub"`.
    pub hub_url: String,
}

/// The assembled feed: records in index order plus channel metadata.
///
/// Built once per successful attempt and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    /// Article records sorted by `position`, ascending.
    pub items: Vec<ArticleRecord>,
    /// Channel metadata.
    pub meta: ChannelMeta,
}

/// Result of one end-to-end attempt against one day's index page.
#[derive(Debug)]
pub struct CrawlOutcome {
    /// The assembled feed, or `None` when the index was unreachable or empty.
    pub feed: Option<FeedDocument>,
    /// The edition date that was attempted.
    pub attempted_date: NaiveDate,
}
