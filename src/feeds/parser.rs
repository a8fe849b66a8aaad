//! RSS 2.0, RSS 1.0 (RDF) and Atom parsing into [`NewsItem`]s.
//!
//! Feed structure is handled by `feed-rs`; this module picks the fields the
//! digest needs and plugs in [`parse_date`], which accepts the loose
//! timestamps real feeds publish.

use super::text::{
    SUMMARY_MAX_CHARS, SUMMARY_MAX_SENTENCES, collapse_whitespace, strip_html, summarize_text,
};
use crate::error::Result;
use crate::models::NewsItem;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use url::Url;

/// Zone abbreviations chrono's RFC 2822 parser does not know.
/// Anything else alphabetic is read as UTC.
const ZONE_OFFSETS: &[(&str, &str)] = &[
    ("UTC", "+0000"),
    ("Z", "+0000"),
    ("IST", "+0530"),
    ("PKT", "+0500"),
    ("NPT", "+0545"),
    ("SGT", "+0800"),
    ("HKT", "+0800"),
    ("JST", "+0900"),
    ("KST", "+0900"),
    ("AEST", "+1000"),
    ("AEDT", "+1100"),
    ("BST", "+0100"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse a feed document into items.
///
/// # Arguments
///
/// * `body` - The raw feed document (RSS 2.0, RSS 1.0/RDF or Atom)
/// * `source` - Logical feed name, copied into every item's `source`
/// * `now` - Stand-in publication time for entries without a usable date
///
/// # Returns
///
/// One unscored [`NewsItem`] per entry, in document order.
///
/// # Errors
///
/// Returns [`crate::DigestError::Parse`] for malformed XML or a document that
/// is not a feed (an HTML error page, for example).
pub fn parse_feed(body: &str, source: &str, now: DateTime<Utc>) -> Result<Vec<NewsItem>> {
    let feed = parser::Builder::new()
        .timestamp_parser(parse_date)
        .build()
        .parse(body.as_bytes())?;
    Ok(feed
        .entries
        .into_iter()
        .map(|entry| entry_to_item(entry, source, now))
        .collect())
}

fn entry_to_item(entry: Entry, source: &str, now: DateTime<Utc>) -> NewsItem {
    let title = entry
        .title
        .map(|t| plain_title(&t.content))
        .unwrap_or_default();
    let link = pick_link(&entry.links)
        .or_else(|| permalink_id(&entry.id))
        .unwrap_or_default();

    let raw_summary = entry
        .summary
        .map(|t| t.content)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();
    let mut summary = summarize_text(&raw_summary, SUMMARY_MAX_CHARS, SUMMARY_MAX_SENTENCES);
    if summary.is_empty() && !title.is_empty() {
        summary = title.clone();
    }

    match entry.published.or(entry.updated) {
        Some(published_at) => NewsItem::new(title, link, published_at, source, summary),
        None => NewsItem::undated(title, link, now, source, summary),
    }
}

/// Titles may carry markup (Atom `type="html"`) or double-escaped entities.
fn plain_title(raw: &str) -> String {
    collapse_whitespace(&html_escape::decode_html_entities(&strip_html(raw)))
}

/// The entry's page: an `alternate` (or untyped) link first, else any link.
fn pick_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// RSS `<guid>` values that are web URLs double as the permalink.
fn permalink_id(id: &str) -> Option<String> {
    let id = id.trim();
    match Url::parse(id) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(id.to_string()),
        _ => None,
    }
}

/// Parse a feed timestamp into UTC, dropping sub-seconds.
///
/// RFC 2822 and RFC 3339 are tried first. After that the parser is lenient:
///
/// - a leading weekday of any spelling (`Monday, 10 Jun 2024 ...`) is ignored
/// - zone abbreviations from a small table are resolved (`IST` is `+0530`);
///   unknown ones are read as UTC
/// - ISO-like dates without an offset (`2024-06-10 09:40:14`,
///   `2024-06-10T09:40`, `2024-06-10`) are read as UTC
///
/// # Examples
///
/// ```ignore
/// assert!(parse_date("Mon, 10 Jun 2024 09:40:14 IST").is_some());
/// assert_eq!(parse_date("yesterday"), None);
/// ```
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_loose_rfc2822(raw))
        .or_else(|| parse_iso_like(raw))?;
    parsed.with_nanosecond(0)
}

fn parse_loose_rfc2822(raw: &str) -> Option<DateTime<Utc>> {
    let without_weekday = match raw.split_once(',') {
        Some((head, rest)) if head.chars().all(|c| c.is_ascii_alphabetic()) => rest.trim(),
        _ => raw,
    };
    let normalized = match without_weekday.rsplit_once(' ') {
        Some((body, zone)) if zone.chars().all(|c| c.is_ascii_alphabetic()) => {
            let offset = ZONE_OFFSETS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(zone))
                .map_or("+0000", |(_, offset)| offset);
            format!("{body} {offset}")
        }
        _ => without_weekday.to_string(),
    };
    DateTime::parse_from_rfc2822(&normalized)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_iso_like(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DigestError;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>Channel title must be ignored</title>
    <link>https://example.com/</link>
    <description>Channel</description>
    <item>
      <title>Markets rally &amp; close higher</title>
      <link>https://example.com/markets</link>
      <pubDate>Fri, 01 Mar 2024 10:30:00 +0000</pubDate>
      <description><![CDATA[<p>Stocks rose. Bonds fell. Oil was flat.</p>]]></description>
    </item>
    <item>
      <title>No date here</title>
      <link>https://example.com/nodate</link>
      <content:encoded><![CDATA[<div>Body from content.</div>]]></content:encoded>
    </item>
    <item>
      <title>Title only</title>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <id>urn:example:feed</id>
  <updated>2024-03-01T10:00:00Z</updated>
  <entry>
    <id>urn:example:1</id>
    <title>Atom entry</title>
    <link rel="self" href="https://example.com/self"/>
    <link rel="alternate" href="https://example.com/atom-entry"/>
    <published>2024-03-01T09:00:00.250+05:30</published>
    <updated>2024-03-01T10:00:00Z</updated>
    <summary type="html">&lt;b&gt;Bold&lt;/b&gt; summary.</summary>
  </entry>
  <entry>
    <id>urn:example:2</id>
    <title>Only updated</title>
    <link href="https://example.com/updated"/>
    <updated>2024-02-29T23:00:00Z</updated>
  </entry>
</feed>"#;

    #[test]
    fn test_parses_rss_items() {
        let items = parse_feed(RSS, "Example", now()).unwrap();
        assert_eq!(items.len(), 3);

        let first = &items[0];
        assert_eq!(first.title, "Markets rally & close higher");
        assert_eq!(first.link, "https://example.com/markets");
        assert_eq!(first.source, "Example");
        assert_eq!(first.summary, "Stocks rose. Bonds fell.");
        assert_eq!(first.published_at, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());
        assert!(!first.date_missing);
        assert_eq!(first.score, 0.0);
    }

    #[test]
    fn test_missing_date_uses_now() {
        let items = parse_feed(RSS, "Example", now()).unwrap();
        let undated = &items[1];
        assert!(undated.date_missing);
        assert_eq!(undated.published_at, now());
        assert_eq!(undated.summary, "Body from content.");
    }

    #[test]
    fn test_title_used_when_summary_empty() {
        let items = parse_feed(RSS, "Example", now()).unwrap();
        let bare = &items[2];
        assert_eq!(bare.summary, "Title only");
        assert_eq!(bare.link, "");
    }

    #[test]
    fn test_parses_atom_entries() {
        let items = parse_feed(ATOM, "Atom", now()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Atom entry");
        assert_eq!(first.link, "https://example.com/atom-entry");
        assert_eq!(first.summary, "Bold summary.");
        // published wins over updated; offset converted, sub-seconds dropped
        assert_eq!(first.published_at, Utc.with_ymd_and_hms(2024, 3, 1, 3, 30, 0).unwrap());

        let second = &items[1];
        assert_eq!(second.link, "https://example.com/updated");
        assert_eq!(second.published_at, Utc.with_ymd_and_hms(2024, 2, 29, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_parses_rdf_items() {
        let rdf = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://purl.org/rss/1.0/">
  <channel rdf:about="https://example.com/rdf">
    <title>RDF</title>
    <link>https://example.com/rdf</link>
    <description>RDF channel</description>
  </channel>
  <item rdf:about="https://example.com/rdf-item">
    <title>RDF item</title>
    <link>https://example.com/rdf-item</link>
  </item>
</rdf:RDF>"#;
        let items = parse_feed(rdf, "RDF", now()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "RDF item");
        assert_eq!(items[0].link, "https://example.com/rdf-item");
    }

    #[test]
    fn test_permalink_guid_becomes_link() {
        let rss = r#"<rss version="2.0"><channel><title>G</title>
<item>
  <title>Guid only</title>
  <guid isPermaLink="true">https://x.example/a</guid>
  <pubDate>Mon, 10 Jun 2024 09:40:14 IST</pubDate>
</item>
<item>
  <title>Opaque guid</title>
  <guid isPermaLink="false">tag-1234</guid>
</item>
</channel></rss>"#;
        let items = parse_feed(rss, "G", now()).unwrap();
        assert_eq!(items[0].link, "https://x.example/a");
        assert_eq!(items[0].published_at, Utc.with_ymd_and_hms(2024, 6, 10, 4, 10, 14).unwrap());
        assert!(!items[0].date_missing);
        assert_eq!(items[1].link, "");
    }

    #[test]
    fn test_unparseable_published_falls_back_to_updated() {
        let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>A</title><id>urn:a</id>
<entry><id>urn:a:1</id><title>x</title>
<published>yesterday</published><updated>2024-01-01T00:00:00Z</updated>
</entry></feed>"#;
        let items = parse_feed(atom, "A", now()).unwrap();
        assert!(!items[0].date_missing);
        assert_eq!(items[0].published_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_non_feed_documents() {
        let err = parse_feed("<html><body>nope</body></html>", "X", now()).unwrap_err();
        assert!(matches!(err, DigestError::Parse(_)));
        assert!(parse_feed("This is not XML", "X", now()).is_err());
    }

    #[test]
    fn test_parse_date_strict_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_date("Fri, 01 Mar 2024 10:30:00 GMT"), Some(expected));
        assert_eq!(parse_date("2024-03-01T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_date("  "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_parse_date_lenient_formats() {
        let utc = Utc.with_ymd_and_hms(2024, 6, 10, 9, 40, 14).unwrap();
        let ist = Utc.with_ymd_and_hms(2024, 6, 10, 4, 10, 14).unwrap();

        assert_eq!(parse_date("Mon, 10 Jun 2024 09:40:14 IST"), Some(ist));
        assert_eq!(parse_date("Monday, 10 Jun 2024 09:40:14 +0530"), Some(ist));
        assert_eq!(parse_date("Mon, 10 Jun 2024 09:40:14 XYZT"), Some(utc));
        assert_eq!(parse_date("2024-06-10 09:40:14"), Some(utc));
        assert_eq!(parse_date("2024-06-10T09:40:14"), Some(utc));
        assert_eq!(parse_date("2024-06-10T09:40:14.5"), Some(utc));
        assert_eq!(parse_date("2024-06-10 09:40:14+05:30"), Some(ist));
        assert_eq!(
            parse_date("2024-06-10"),
            Some(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap())
        );
    }
}
