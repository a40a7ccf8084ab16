//! Index page resolution.
//!
//! The daily front page (`node_1.htm`) links every article of that edition.
//! Article pages follow the site's `content_<id>.htm` naming convention, so
//! an anchor qualifies exactly when its `href` contains `content_`. Hrefs are
//! resolved to absolute URLs against the index page and de-duplicated keeping
//! the first occurrence; first-seen order defines each link's position, which
//! later restores the reading order after the parallel fetch phase.

use itertools::Itertools;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::CrawlError;
use crate::models::ArticleLink;

/// Substring marking an anchor as an article-page link.
const ARTICLE_HREF_MARKER: &str = "content_";

/// Fetch the index page and extract the ordered, de-duplicated article links.
///
/// # Errors
///
/// [`CrawlError::Fetch`] on a non-200 status, [`CrawlError::Http`] on a
/// transport failure, and [`CrawlError::EmptyIndex`] when the page holds zero
/// qualifying links. All three abort the current day's attempt.
#[instrument(level = "info", skip(client))]
pub async fn resolve_index(
    client: &Client,
    index_url: &str,
) -> Result<Vec<ArticleLink>, CrawlError> {
    let response = client.get(index_url).send().await.map_err(|source| {
        CrawlError::Http {
            url: index_url.to_string(),
            source,
        }
    })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(CrawlError::Fetch {
            url: index_url.to_string(),
            status,
        });
    }

    // The site serves UTF-8 but is sloppy about charset headers.
    let bytes = response.bytes().await.map_err(|source| CrawlError::Http {
        url: index_url.to_string(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);

    let links = extract_links(&html, index_url);
    if links.is_empty() {
        return Err(CrawlError::EmptyIndex {
            url: index_url.to_string(),
        });
    }

    info!(count = links.len(), url = index_url, "Indexed article links");
    debug!(links = ?links.iter().map(|l| l.url.as_str()).collect::<Vec<_>>(), "Article URLs");
    Ok(links)
}

/// Pull qualifying hrefs out of the index markup, in document order.
fn extract_links(html: &str, index_url: &str) -> Vec<ArticleLink> {
    let base = match Url::parse(index_url) {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    document
        .select(&anchor_selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter(|href| href.contains(ARTICLE_HREF_MARKER))
        .filter_map(|href| base.join(href).ok())
        .unique()
        .enumerate()
        .map(|(position, url)| ArticleLink { position, url })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_URL: &str = "https://www.macaodaily.com/html/2026-08/27/node_1.htm";

    #[test]
    fn keeps_only_article_links_in_document_order() {
        let html = r#"
            <html><body>
                <a href="node_2.htm">第二版</a>
                <a href="content_001.htm">頭條</a>
                <a href="../26/content_999.htm">昨日要聞</a>
                <a href="https://example.com/ad">廣告</a>
                <a href="content_002.htm">社會</a>
            </body></html>
        "#;

        let links = extract_links(html, INDEX_URL);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                "https://www.macaodaily.com/html/2026-08/27/content_001.htm",
                "https://www.macaodaily.com/html/2026-08/26/content_999.htm",
                "https://www.macaodaily.com/html/2026-08/27/content_002.htm",
            ]
        );
        assert_eq!(
            links.iter().map(|l| l.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn repeated_href_dedupes_to_first_occurrence() {
        // The front page links headline articles from several boxes; the
        // resolved list must contain each article once, at the position of
        // its first appearance.
        let html = r#"
            <a href="content_100.htm">A</a>
            <a href="content_200.htm">B</a>
            <a href="content_100.htm">A again</a>
            <a href="content_300.htm">C</a>
            <a href="content_100.htm">A once more</a>
        "#;

        let links = extract_links(html, INDEX_URL);

        assert_eq!(links.len(), 3);
        assert_eq!(links[0].position, 0);
        assert!(links[0].url.as_str().ends_with("content_100.htm"));
        assert!(links[1].url.as_str().ends_with("content_200.htm"));
        assert!(links[2].url.as_str().ends_with("content_300.htm"));
    }

    #[test]
    fn positions_are_contiguous_after_dedupe() {
        let html = r#"
            <a href="content_1.htm">x</a>
            <a href="content_1.htm">x</a>
            <a href="content_2.htm">y</a>
        "#;

        let links = extract_links(html, INDEX_URL);
        let positions: Vec<usize> = links.iter().map(|l| l.position).collect();
        assert_eq!(positions, (0..links.len()).collect::<Vec<_>>());
    }

    #[test]
    fn page_without_article_links_yields_empty() {
        let html = r#"<a href="node_2.htm">版面</a><p>維護中</p>"#;
        assert!(extract_links(html, INDEX_URL).is_empty());
    }
}
