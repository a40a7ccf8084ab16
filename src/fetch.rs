//! Bounded-concurrency article fetching.
//!
//! Scatter-gather with index tagging: every [`ArticleLink`] carries its
//! immutable position, tasks are submitted without regard to index order and
//! collected first-completed-first, and the assembler later restores reading
//! order by sorting on the tag. The pool always waits for every task; a
//! failed fetch yields exactly one `ok = false` record and never a pool-level
//! error. There are no retries and no cancellation — reliability comes from
//! per-article containment plus the day-level fallback.

use std::future::Future;

use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::error::CrawlError;
use crate::extract;
use crate::models::{ArticleLink, ArticleRecord};

/// Fetch and extract every linked article, up to `concurrency` at a time.
///
/// Completion order is unspecified; the returned records are unordered.
#[instrument(level = "info", skip_all, fields(links = links.len(), concurrency))]
pub async fn fetch_all(
    client: &Client,
    links: Vec<ArticleLink>,
    concurrency: usize,
) -> Vec<ArticleRecord> {
    let total = links.len();
    let records = run_pool(links, concurrency, |link| {
        let client = client.clone();
        async move { fetch_one(&client, link).await }
    })
    .await;

    let failed = records.iter().filter(|r| !r.ok).count();
    info!(total, failed, "Fetched article contents");
    records
}

/// Run one task per link through a bounded pool, collecting unordered results.
///
/// The task seam exists so pool behavior (ordering independence, failure
/// isolation) is exercisable without a network.
pub(crate) async fn run_pool<F, Fut>(
    links: Vec<ArticleLink>,
    concurrency: usize,
    task: F,
) -> Vec<ArticleRecord>
where
    F: Fn(ArticleLink) -> Fut,
    Fut: Future<Output = ArticleRecord>,
{
    stream::iter(links)
        .map(task)
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

/// One fetch task. Any error becomes a placeholder record here, at the task
/// boundary, isolating this article's failure from all others.
async fn fetch_one(client: &Client, link: ArticleLink) -> ArticleRecord {
    match fetch_raw(client, &link.url).await {
        Ok(raw_html) => {
            debug!(url = %link.url, position = link.position, "Fetched article page");
            extract::extract(&link, &raw_html)
        }
        Err(e) => {
            error!(url = %link.url, position = link.position, error = %e, "Article fetch failed");
            ArticleRecord::fetch_failure(&link, &e.to_string())
        }
    }
}

/// GET one page, forcing UTF-8 decoding regardless of response headers.
async fn fetch_raw(client: &Client, url: &Url) -> Result<String, CrawlError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(CrawlError::Fetch {
            url: url.to_string(),
            status,
        });
    }

    let bytes = response.bytes().await.map_err(|source| CrawlError::Http {
        url: url.to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
