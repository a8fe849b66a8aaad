//! Data model for normalized news items.
//!
//! A [`NewsItem`] is produced once by feed ingestion, gets its `score` filled
//! in by [`crate::ranker::rank_items`], and is then either kept or dropped by
//! [`crate::dedupe::dedupe_items`]. Rendering reads it but never re-sorts.

use chrono::{DateTime, Utc};

/// A single story pulled from an RSS/Atom feed.
///
/// Items have no identity beyond their fields. `score` is only meaningful
/// after ranking; before that it is `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    /// Headline; may be empty.
    pub title: String,
    /// Article URL; may be empty.
    pub link: String,
    /// Publication time in UTC. When `date_missing` is set this is the
    /// ingestion time, not a real publish time.
    pub published_at: DateTime<Utc>,
    /// Logical feed name, used as the key into the source weights.
    pub source: String,
    /// Short plain-text summary.
    pub summary: String,
    /// `true` when no publish date could be parsed.
    pub date_missing: bool,
    /// Relevance score assigned by the ranker.
    pub score: f64,
}

impl NewsItem {
    /// Create an unscored item with a real publication date.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<Utc>,
        source: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published_at,
            source: source.into(),
            summary: summary.into(),
            date_missing: false,
            score: 0.0,
        }
    }

    /// Create an unscored item whose date could not be parsed; `now` stands in
    /// for the publication time.
    pub fn undated(
        title: impl Into<String>,
        link: impl Into<String>,
        now: DateTime<Utc>,
        source: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            date_missing: true,
            ..Self::new(title, link, now, source, summary)
        }
    }

    /// Return the same item with `score` set.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}
