//! Error taxonomy for the crawl pipeline.
//!
//! Only index-level errors ever propagate: a [`CrawlError`] returned while
//! resolving the front page aborts that day's attempt and drives the
//! day-fallback transition. The same error types occurring inside an article
//! fetch task are contained at the task boundary and converted into an
//! `ok = false` [`crate::models::ArticleRecord`] instead.

use thiserror::Error;

/// Errors produced while fetching or resolving pages.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The server answered with a non-200 status.
    #[error("{url} returned HTTP {status}")]
    Fetch {
        /// The URL that was requested.
        url: String,
        /// The status the server answered with.
        status: reqwest::StatusCode,
    },

    /// The request failed at the transport level (DNS, TLS, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The index page was fetched but contained zero qualifying article links.
    #[error("no article links found on {url}")]
    EmptyIndex {
        /// The index page URL.
        url: String,
    },
}
