//! HTML rendering of the digest email.
//!
//! The page is a single self-contained HTML document with inline CSS so it
//! renders the same in a browser and in mail clients. Every piece of feed
//! text is escaped before it is interpolated.

use crate::feeds::text::{collapse_whitespace, truncate_chars};
use crate::models::NewsItem;
use crate::utils::{format_utc, local_date};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Summary length shown per story, in characters.
pub const RENDER_SUMMARY_CHARS: usize = 360;

const WORLD_HEADING: &str = "World Top Stories";
const INDIA_HEADING: &str = "India Top Stories";

const STYLE: &str = r#"      :root {
        color-scheme: light;
      }
      body {
        margin: 0;
        background: #f4f4f0;
        color: #1f2933;
        font-family: "Georgia", "Times New Roman", serif;
      }
      .container {
        max-width: 760px;
        margin: 0 auto;
        padding: 28px 22px 40px;
      }
      .header {
        background: linear-gradient(120deg, #1f2933, #3e4c59);
        color: #f5f7fa;
        padding: 20px 24px;
        border-radius: 14px;
      }
      .header h1 {
        margin: 0 0 8px;
        font-size: 26px;
        letter-spacing: 0.4px;
      }
      .header .meta {
        font-size: 13px;
        opacity: 0.85;
      }
      h2 {
        margin: 28px 0 12px;
        font-size: 20px;
        color: #1f2933;
      }
      .section {
        display: block;
        background: #ffffff;
        border-radius: 12px;
        padding: 8px 18px;
        box-shadow: 0 8px 20px rgba(20, 20, 20, 0.08);
      }
      .item {
        display: block;
        padding: 14px 0;
        border-bottom: 1px solid #e4e7eb;
      }
      .item:last-child {
        border-bottom: none;
      }
      .title {
        font-size: 16px;
        color: #102a43;
        text-decoration: none;
        font-weight: 600;
      }
      .meta {
        margin-top: 6px;
        font-size: 12px;
        color: #52606d;
      }
      .summary {
        margin-top: 8px;
        font-size: 14px;
        color: #334e68;
      }
      .empty {
        font-size: 14px;
        color: #52606d;
        padding: 10px 0;
      }"#;

fn render_item(item: &NewsItem) -> String {
    let summary = truncate_chars(&collapse_whitespace(&item.summary), RENDER_SUMMARY_CHARS);
    let summary_html = if summary.is_empty() {
        String::new()
    } else {
        format!("<div class=\"summary\">{}</div>", encode_text(&summary))
    };
    let title_html = if item.link.is_empty() {
        format!("<span class=\"title\">{}</span>", encode_text(&item.title))
    } else {
        format!(
            "<a class=\"title\" href=\"{}\">{}</a>",
            encode_double_quoted_attribute(&item.link),
            encode_text(&item.title)
        )
    };
    [
        "<div class=\"item\">".to_string(),
        format!("  {title_html}"),
        format!(
            "  <div class=\"meta\">{} · {}</div>",
            encode_text(&item.source),
            format_utc(item.published_at)
        ),
        format!("  {summary_html}"),
        "</div>".to_string(),
    ]
    .join("\n")
}

/// Render one titled section; an empty list shows a placeholder.
pub fn render_section(heading: &str, items: &[NewsItem]) -> String {
    let mut rows: Vec<String> = items.iter().map(render_item).collect();
    if rows.is_empty() {
        rows.push("<div class=\"empty\">No stories found.</div>".to_string());
    }
    let mut parts = vec![
        format!("<h2>{}</h2>", encode_text(heading)),
        "<div class=\"section\">".to_string(),
    ];
    parts.extend(rows);
    parts.push("</div>".to_string());
    parts.join("\n")
}

/// Render the full digest page for the world and India sections.
///
/// # Arguments
///
/// * `world` - Final world stories, already ranked and deduplicated
/// * `india` - Final India stories, already ranked and deduplicated
/// * `generated_at` - Run time, shown in UTC in the header
/// * `tz` - Zone that decides the local date in the title and header
///
/// # Returns
///
/// A complete HTML5 document with inline styles.
pub fn render_email(
    world: &[NewsItem],
    india: &[NewsItem],
    generated_at: DateTime<Utc>,
    tz: Tz,
) -> String {
    let date = local_date(generated_at, tz);
    let world_section = render_section(WORLD_HEADING, world);
    let india_section = render_section(INDIA_HEADING, india);
    let generated = format_utc(generated_at);

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Daily Digest {date}</title>
    <style>
{STYLE}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>Daily Digest</h1>
        <div class="meta">Local date: {date} · Generated at {generated}</div>
      </div>
      {world_section}
      {india_section}
    </div>
  </body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 20, 15, 0).unwrap()
    }

    #[test]
    fn test_render_linked_item() {
        let item = NewsItem::new(
            "Markets <rally>",
            "https://example.com/a?x=1&y=\"2\"",
            at(),
            "Wire & Co",
            "Stocks rose.",
        );
        let html = render_section("World Top Stories", &[item]);
        assert!(html.starts_with("<h2>World Top Stories</h2>\n<div class=\"section\">"));
        let anchor = "<a class=\"title\" href=\"https://example.com/a?x=1&amp;y=&quot;2&quot;\">\
                      Markets &lt;rally&gt;</a>";
        assert!(html.contains(anchor));
        assert!(html.contains("<div class=\"meta\">Wire &amp; Co · 2024-01-01 20:15 UTC</div>"));
        assert!(html.contains("<div class=\"summary\">Stocks rose.</div>"));
    }

    #[test]
    fn test_render_item_without_link_or_summary() {
        let item = NewsItem::new("Plain", "", at(), "Feed", "");
        let html = render_section("S", &[item]);
        assert!(html.contains("<span class=\"title\">Plain</span>"));
        assert!(!html.contains("class=\"summary\""));
    }

    #[test]
    fn test_empty_section_placeholder() {
        let html = render_section("India Top Stories", &[]);
        assert!(html.contains("<div class=\"empty\">No stories found.</div>"));
    }

    #[test]
    fn test_summary_is_truncated() {
        let item = NewsItem::new("T", "", at(), "Feed", "x ".repeat(400));
        let html = render_section("S", &[item]);
        assert!(html.contains("..."));
        assert!(!html.contains(&"x ".repeat(200)));
    }

    #[test]
    fn test_render_email_document() {
        let world = vec![NewsItem::new("World one", "https://w", at(), "W", "")];
        let html = render_email(&world, &[], at(), chrono_tz::Asia::Kolkata);
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Daily Digest 2024-01-02</title>"));
        assert!(html.contains("Local date: 2024-01-02 · Generated at 2024-01-01 20:15 UTC"));
        assert!(html.contains("<h2>World Top Stories</h2>"));
        assert!(html.contains("<h2>India Top Stories</h2>"));
        assert!(html.contains("No stories found."));
        let world_pos = html.find("World one").unwrap();
        let india_pos = html.find("India Top Stories").unwrap();
        assert!(world_pos < india_pos);
    }
}
