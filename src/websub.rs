//! WebSub publish notification.
//!
//! After a feed is written, the hub gets a `hub.mode=publish` form POST so
//! subscribers pull the update immediately instead of on their next poll.
//! This is strictly fire-and-forget: any failure is logged and ignored, and
//! it never affects the written output or the process exit status.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument, warn};

/// Timeout for the ping, independent of the crawl timeout.
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Tell the hub that `feed_url` has new content.
#[instrument(level = "info", skip(client))]
pub async fn ping_hub(client: &Client, hub_url: &str, feed_url: &str) {
    let form = [("hub.mode", "publish"), ("hub.url", feed_url)];

    match client
        .post(hub_url)
        .form(&form)
        .timeout(PING_TIMEOUT)
        .send()
        .await
    {
        // Hubs answer 204 No Content or 200 OK on success.
        Ok(response) if matches!(response.status().as_u16(), 200 | 204) => {
            info!(hub_url, feed_url, "WebSub hub acknowledged publish ping");
        }
        Ok(response) => {
            warn!(
                hub_url,
                status = %response.status(),
                "WebSub hub rejected publish ping"
            );
        }
        Err(e) => {
            warn!(hub_url, error = %e, "WebSub publish ping failed");
        }
    }
}
