//! Feed assembly and rendering.
//!
//! [`assemble`] is the join point of the pipeline: it takes the pool's
//! unordered completions and sorts them by position, restoring the index
//! page's reading order regardless of how the network interleaved the
//! fetches. Positions are unique, so the order is total.
//!
//! Rendering produces an RSS 2.0 document (and optionally an HTML digest)
//! as plain strings; titles and links are XML-escaped, summaries and bodies
//! ride inside CDATA sections which the extractor already made safe.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate};
use once_cell::sync::Lazy;
use quick_xml::escape::escape;
use regex::Regex;
use tracing::{debug, instrument};

use crate::config::macau_offset;
use crate::models::{ArticleRecord, ChannelMeta, FeedDocument};

/// Channel title.
pub const CHANNEL_TITLE: &str = "澳門日報";
/// Channel link.
pub const CHANNEL_LINK: &str = "https://www.macaodaily.com";
/// Channel description.
pub const CHANNEL_DESCRIPTION: &str = "澳門日報當日新聞自動抓取訂閱源";
/// Channel language.
pub const CHANNEL_LANGUAGE: &str = "zh-hk";

/// `YYYY-MM/DD` as embedded in the site's index URLs.
static URL_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})/(\d{2})").unwrap());

/// Build the channel metadata for a feed assembled from `index_url`.
///
/// `now` is the render time in UTC+8; it doubles as the publication date
/// when the index URL carries no date.
pub fn channel_meta(
    index_url: &str,
    self_feed_url: &str,
    hub_url: &str,
    now: DateTime<FixedOffset>,
) -> ChannelMeta {
    ChannelMeta {
        pub_date: publication_date(index_url, now),
        last_build_date: now,
        source_index_url: index_url.to_string(),
        self_feed_url: self_feed_url.to_string(),
        hub_url: hub_url.to_string(),
    }
}

/// Publication date: the date embedded in the index URL at 08:00 UTC+8,
/// falling back to `now` for date-less (archive) URLs.
fn publication_date(index_url: &str, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let Some(captures) = URL_DATE_RE.captures(index_url) else {
        return now;
    };
    let parse = |i: usize| captures[i].parse::<u32>().ok();
    let date = match (parse(1), parse(2), parse(3)) {
        (Some(year), Some(month), Some(day)) => {
            NaiveDate::from_ymd_opt(year as i32, month, day)
        }
        _ => None,
    };
    date.and_then(|d| d.and_hms_opt(8, 0, 0))
        .and_then(|dt| dt.and_local_timezone(macau_offset()).single())
        .unwrap_or(now)
}

/// Reorder the pool's unordered completions into the index reading order.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn assemble(mut records: Vec<ArticleRecord>, meta: ChannelMeta) -> FeedDocument {
    records.sort_by_key(|r| r.position);
    debug!(items = records.len(), "Assembled feed document");
    FeedDocument {
        items: records,
        meta,
    }
}

/// Render the feed as an RSS 2.0 document.
///
/// With `include_summary` the item carries a CDATA `description` (truncated
/// summary) plus `content:encoded` (full body); without it, the body goes
/// straight into `description`.
pub fn render_rss(feed: &FeedDocument, include_summary: bool) -> String {
    let meta = &feed.meta;
    let pub_date = meta.pub_date.to_rfc2822();
    let last_build_date = meta.last_build_date.to_rfc2822();

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(
        "<rss version=\"2.0\" xmlns:content=\"http://purl.org/rss/1.0/modules/content/\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n",
    );
    xml.push_str("  <channel>\n");
    let _ = writeln!(xml, "    <title>{CHANNEL_TITLE}</title>");
    let _ = writeln!(xml, "    <link>{CHANNEL_LINK}</link>");
    let _ = writeln!(xml, "    <description>{CHANNEL_DESCRIPTION}</description>");
    let _ = writeln!(xml, "    <language>{CHANNEL_LANGUAGE}</language>");
    let _ = writeln!(xml, "    <pubDate>{pub_date}</pubDate>");
    let _ = writeln!(xml, "    <lastBuildDate>{last_build_date}</lastBuildDate>");
    let _ = writeln!(
        xml,
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\" />",
        escape(meta.self_feed_url.as_str())
    );
    let _ = writeln!(
        xml,
        "    <atom:link href=\"{}\" rel=\"hub\" />",
        escape(meta.hub_url.as_str())
    );

    for item in &feed.items {
        let title = escape(item.title.as_str());
        let link = escape(item.url.as_str());
        xml.push_str("    <item>\n");
        let _ = writeln!(xml, "      <title>{title}</title>");
        let _ = writeln!(xml, "      <link>{link}</link>");
        let _ = writeln!(xml, "      <guid isPermaLink=\"true\">{link}</guid>");
        let _ = writeln!(xml, "      <pubDate>{pub_date}</pubDate>");
        if include_summary {
            let _ = writeln!(
                xml,
                "      <description><![CDATA[{}]]></description>",
                item.summary
            );
            let _ = writeln!(
                xml,
                "      <content:encoded><![CDATA[{}]]></content:encoded>",
                item.body_html
            );
        } else {
            let _ = writeln!(
                xml,
                "      <description><![CDATA[{}]]></description>",
                item.body_html
            );
        }
        xml.push_str("    </item>\n");
    }

    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

/// Render the self-contained HTML digest: a table of contents linking to
/// per-article anchors, then the full bodies, in the same position order.
pub fn render_html_digest(feed: &FeedDocument) -> String {
    let edition = feed.meta.pub_date.format("%Y-%m-%d");
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"zh-hk\">\n<head>\n<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    let _ = writeln!(html, "<title>{CHANNEL_TITLE} {edition}</title>");
    html.push_str(concat!(
        "<style>\n",
        "body { max-width: 46em; margin: 0 auto; padding: 0 1em; ",
        "font-family: \"Noto Sans TC\", sans-serif; line-height: 1.7; }\n",
        "nav ol { padding-left: 1.5em; }\n",
        "article { border-top: 1px solid #ccc; padding: 1em 0; }\n",
        "img { max-width: 100%; height: auto; }\n",
        "</style>\n",
    ));
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{CHANNEL_TITLE} {edition}</h1>");

    html.push_str("<nav>\n<ol>\n");
    for item in &feed.items {
        let _ = writeln!(
            html,
            "<li><a href=\"#article-{}\">{}</a></li>",
            item.position,
            escape(item.title.as_str())
        );
    }
    html.push_str("</ol>\n</nav>\n");

    for item in &feed.items {
        let _ = writeln!(html, "<article id=\"article-{}\">", item.position);
        let _ = writeln!(
            html,
            "<h2><a href=\"{}\">{}</a></h2>",
            escape(item.url.as_str()),
            escape(item.title.as_str())
        );
        html.push_str(&item.body_html);
        html.push('\n');
        html.push_str("</article>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quick_xml::events::Event;
    use quick_xml::Reader;

    fn record(position: usize, title: &str, body_html: &str) -> ArticleRecord {
        ArticleRecord {
            position,
            title: title.to_string(),
            url: format!(
                "https://www.macaodaily.com/html/2026-08/27/content_{position}.htm"
            ),
            body_html: body_html.to_string(),
            summary: format!("摘要 {position}"),
            ok: true,
        }
    }

    fn meta() -> ChannelMeta {
        channel_meta(
            "https://www.macaodaily.com/html/2026-08/27/node_1.htm",
            "https://example.com/rss.xml",
            "https://pubsubhubbub.appspot.com/",
            macau_offset()
                .with_ymd_and_hms(2026, 8, 27, 10, 30, 0)
                .unwrap(),
        )
    }

    /// Pull the unescaped `<title>` text of every `<item>` out of a feed.
    fn item_titles(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut titles = Vec::new();
        let mut in_item = false;
        let mut in_title = false;
        let mut title = String::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"item" => in_item = true,
                    b"title" if in_item => {
                        in_title = true;
                        title.clear();
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"item" => in_item = false,
                    b"title" => {
                        if in_title {
                            titles.push(std::mem::take(&mut title));
                        }
                        in_title = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_title => {
                    let text = e.decode().unwrap();
                    title.push_str(&quick_xml::escape::unescape(&text).unwrap());
                }
                Ok(Event::GeneralRef(e)) if in_title => {
                    if let Some(ch) = e.resolve_char_ref().unwrap() {
                        title.push(ch);
                    } else {
                        let name = e.decode().unwrap();
                        let resolved = quick_xml::escape::resolve_xml_entity(&name)
                            .unwrap_or_else(|| panic!("unknown entity: {name}"));
                        title.push_str(resolved);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => panic!("malformed feed XML: {e}"),
                _ => {}
            }
        }
        titles
    }

    #[test]
    fn assemble_restores_index_order() {
        // Records arrive in completion order, not index order.
        let records = vec![
            record(3, "四", "<p>d</p>"),
            record(0, "一", "<p>a</p>"),
            record(2, "三", "<p>c</p>"),
            record(1, "二", "<p>b</p>"),
        ];
        let feed = assemble(records, meta());
        let positions: Vec<usize> = feed.items.iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);

        let xml = render_rss(&feed, true);
        assert_eq!(item_titles(&xml), vec!["一", "二", "三", "四"]);
    }

    #[test]
    fn publication_date_pinned_to_url_date_at_eight_am() {
        let m = meta();
        assert_eq!(m.pub_date.to_rfc2822(), "Thu, 27 Aug 2026 08:00:00 +0800");
        assert_eq!(
            m.last_build_date.to_rfc2822(),
            "Thu, 27 Aug 2026 10:30:00 +0800"
        );
    }

    #[test]
    fn dateless_url_falls_back_to_render_time() {
        let now = macau_offset()
            .with_ymd_and_hms(2026, 8, 27, 10, 30, 0)
            .unwrap();
        let m = channel_meta(
            "https://www.macaodaily.com/archive/node_1.htm",
            "https://example.com/rss.xml",
            "https://pubsubhubbub.appspot.com/",
            now,
        );
        assert_eq!(m.pub_date, now);
    }

    #[test]
    fn special_characters_in_title_round_trip() {
        let title = r#"A <b> & "quoted" title"#;
        let feed = assemble(vec![record(0, title, "<p>x</p>")], meta());
        let xml = render_rss(&feed, true);

        // Parses cleanly and unescapes back to the original string.
        assert_eq!(item_titles(&xml), vec![title.to_string()]);
    }

    #[test]
    fn cdata_body_never_terminates_early() {
        // The extractor guarantees CDATA-safe bodies; rendering must keep
        // exactly one terminator per section.
        let feed = assemble(
            vec![record(0, "t", "<p>before ]]&gt; after</p>")],
            meta(),
        );
        let xml = render_rss(&feed, true);

        let cdata_start = xml.find("<content:encoded><![CDATA[").unwrap();
        let section = &xml[cdata_start..];
        let close = section.find("]]>").unwrap();
        assert!(section[..close].contains("before"));
        assert!(section[..close].contains("after"));
    }

    #[test]
    fn channel_carries_websub_declarations() {
        let feed = assemble(vec![record(0, "t", "<p>x</p>")], meta());
        let xml = render_rss(&feed, true);

        assert!(xml.contains(
            r#"<atom:link href="https://example.com/rss.xml" rel="self" type="application/rss+xml" />"#
        ));
        assert!(xml.contains(r#"<atom:link href="https://pubsubhubbub.appspot.com/" rel="hub" />"#));
        assert!(xml.contains("<language>zh-hk</language>"));
    }

    #[test]
    fn summary_variant_controls_item_shape() {
        let feed = assemble(vec![record(0, "t", "<p>body</p>")], meta());

        let rich = render_rss(&feed, true);
        assert!(rich.contains("<description><![CDATA[摘要 0]]></description>"));
        assert!(rich.contains("<content:encoded><![CDATA[<p>body</p>]]></content:encoded>"));

        let plain = render_rss(&feed, false);
        assert!(plain.contains("<description><![CDATA[<p>body</p>]]></description>"));
        assert!(!plain.contains("content:encoded"));
    }

    #[test]
    fn item_pub_date_is_shared_channel_wide() {
        let feed = assemble(
            vec![record(0, "a", "<p>x</p>"), record(1, "b", "<p>y</p>")],
            meta(),
        );
        let xml = render_rss(&feed, true);
        let occurrences = xml
            .matches("<pubDate>Thu, 27 Aug 2026 08:00:00 +0800</pubDate>")
            .count();
        // Channel plus one per item.
        assert_eq!(occurrences, 3);
    }

    #[test]
    fn digest_has_toc_and_anchored_sections_in_order() {
        let feed = assemble(
            vec![record(1, "乙", "<p>y</p>"), record(0, "甲", "<p>x</p>")],
            meta(),
        );
        let html = render_html_digest(&feed);

        let toc_a = html.find(r##"<a href="#article-0">甲</a>"##).unwrap();
        let toc_b = html.find(r##"<a href="#article-1">乙</a>"##).unwrap();
        assert!(toc_a < toc_b);

        let section_a = html.find(r#"<article id="article-0">"#).unwrap();
        let section_b = html.find(r#"<article id="article-1">"#).unwrap();
        assert!(section_a < section_b);
        assert!(html.contains("<p>x</p>"));
        assert!(html.contains("<p>y</p>"));
    }
}
