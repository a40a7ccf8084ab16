//! Article content extraction.
//!
//! Turns one article page's raw markup into an [`ArticleRecord`]:
//!
//! 1. Title from the site's custom `<founder-title>` tag (regex, since the
//!    tag sits outside the parsed body on some pages).
//! 2. Content images — every `<img>` whose `src` contains `/res/`, the
//!    site's convention for editorial images as opposed to UI chrome.
//! 3. Body text from the `id="ozoom"` container: scripts and styles are
//!    skipped, text runs become separate lines (`<br>` splits them), each
//!    surviving line is wrapped in its own `<p>`.
//! 4. A flattened summary truncated to 150 characters.
//!
//! Extraction never fails past this module. A page without the content
//! container degrades to placeholder body and summary with `ok = false`.

use std::fmt::Write;

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::models::{ArticleLink, ArticleRecord};
use crate::sanitize::{escape_cdata_close, sanitize, strip_cdata_delimiters};

/// Title placeholder when no `<founder-title>` is present.
pub const MISSING_TITLE: &str = "無標題";

/// Summary placeholder when the content container is missing.
pub const MISSING_CONTENT_SUMMARY: &str = "無內容";

/// Body placeholder when the content container is missing.
pub const MISSING_CONTENT_BODY: &str = "<p>（內文擷取失敗）</p>";

/// Maximum summary length in characters, before the ellipsis.
const SUMMARY_LIMIT: usize = 150;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<founder-title>(.*?)</founder-title>").unwrap());
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static CONTENT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("#ozoom").unwrap());

/// Extract a structured record from one article page.
///
/// Total over its inputs; malformed markup produces placeholder content
/// rather than an error. The returned body HTML is CDATA-safe.
pub fn extract(link: &ArticleLink, raw_html: &str) -> ArticleRecord {
    let title = match TITLE_RE.captures(raw_html) {
        Some(captures) => sanitize(&strip_cdata_delimiters(captures[1].trim())),
        None => MISSING_TITLE.to_string(),
    };

    let document = Html::parse_document(raw_html);
    let images = content_images(&document, &link.url);

    let container = document.select(&CONTENT_SELECTOR).next();
    let (paragraphs, summary, ok) = match container {
        Some(element) => {
            let raw_text = sanitize(&visible_text(*element));
            let mut paragraphs = String::new();
            for line in raw_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let _ = write!(paragraphs, "<p>{line}</p>");
            }
            (paragraphs, summarize(&raw_text), true)
        }
        None => (
            MISSING_CONTENT_BODY.to_string(),
            MISSING_CONTENT_SUMMARY.to_string(),
            false,
        ),
    };

    debug!(
        url = %link.url,
        position = link.position,
        ok,
        body_bytes = paragraphs.len(),
        "Extracted article"
    );

    ArticleRecord {
        position: link.position,
        title,
        url: link.url.to_string(),
        body_html: escape_cdata_close(&format!("{images}{paragraphs}")),
        summary,
        ok,
    }
}

/// Render `<figure>` blocks for every content image, in document order.
fn content_images(document: &Html, article_url: &Url) -> String {
    let mut blocks = String::new();
    for img in document.select(&IMG_SELECTOR) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if !src.contains("/res/") {
            continue;
        }
        if let Ok(full_url) = article_url.join(src) {
            let _ = write!(
                blocks,
                r#"<figure style="margin-bottom: 20px;"><img src="{full_url}" style="max-width:100%; height:auto;" /></figure>"#
            );
        }
    }
    blocks
}

/// Collect the visible text under a node with newline separators.
///
/// Skips `<script>`/`<style>` subtrees. Each non-blank text node becomes its
/// own line (`<br>` splits text nodes, so line breaks fall out of this for
/// free); the caller trims lines and drops the empty ones.
fn visible_text(node: NodeRef<'_, Node>) -> String {
    let mut chunks: Vec<&str> = Vec::new();
    collect_text(node, &mut chunks);
    chunks.join("\n")
}

fn collect_text<'a>(node: NodeRef<'a, Node>, chunks: &mut Vec<&'a str>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed);
                }
            }
            Node::Element(element) => match element.name() {
                "script" | "style" => {}
                _ => collect_text(child, chunks),
            },
            _ => {}
        }
    }
}

/// Flatten body text to one line and truncate to [`SUMMARY_LIMIT`] characters.
///
/// Counts characters, not bytes, so CJK text is never split mid-codepoint.
fn summarize(text: &str) -> String {
    let flat = text.replace('\n', " ");
    let truncated = match flat.char_indices().nth(SUMMARY_LIMIT) {
        Some((byte_index, _)) => format!("{}...", &flat[..byte_index]),
        None => flat,
    };
    strip_cdata_delimiters(&truncated)
}
