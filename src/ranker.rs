//! Relevance scoring and deterministic ranking.
//!
//! A score is the product of four independent factors:
//!
//! | Factor | Value |
//! |--------|-------|
//! | source weight | `source_weights[item.source]`, `1.0` when unknown |
//! | recency | `exp(-ln 2 * age_hours / half_life_hours)`, `1.0` when decay is disabled |
//! | keywords | `1 + min(hits * per_hit, cap)` over `title + " " + summary` |
//! | completeness | `0.5` without title, `0.7` without link, `0.6` without date (compounding) |
//!
//! Ranking consumes the items, attaches the score, and sorts with
//! [`compare_items`]: score descending, then newer first, then title and
//! source ascending (case-insensitive).

use crate::models::NewsItem;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Default recency half-life, in hours.
pub const DEFAULT_HALF_LIFE_HOURS: f64 = 18.0;
/// Default boost per matched keyword.
pub const DEFAULT_KEYWORD_BOOST_PER_HIT: f64 = 0.12;
/// Default ceiling for the total keyword boost.
pub const DEFAULT_KEYWORD_BOOST_CAP: f64 = 0.5;

const MISSING_TITLE_FACTOR: f64 = 0.5;
const MISSING_LINK_FACTOR: f64 = 0.7;
const MISSING_DATE_FACTOR: f64 = 0.6;

/// Tunable scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Age at which recency halves. `<= 0` disables decay.
    pub half_life_hours: f64,
    pub keyword_boost_per_hit: f64,
    pub keyword_boost_cap: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            half_life_hours: DEFAULT_HALF_LIFE_HOURS,
            keyword_boost_per_hit: DEFAULT_KEYWORD_BOOST_PER_HIT,
            keyword_boost_cap: DEFAULT_KEYWORD_BOOST_CAP,
        }
    }
}

impl ScoringParams {
    /// Defaults with a different half-life.
    pub fn with_half_life(half_life_hours: f64) -> Self {
        Self {
            half_life_hours,
            ..Self::default()
        }
    }
}

/// Exponential half-life decay. Future timestamps count as age zero.
pub fn recency_factor(
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
    half_life_hours: f64,
) -> f64 {
    if half_life_hours <= 0.0 {
        return 1.0;
    }
    let age = now - published_at;
    // Microseconds overflow only for ages beyond ~290k years.
    let age_seconds = match age.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => age.num_milliseconds() as f64 / 1000.0,
    }
    .max(0.0);
    let age_hours = age_seconds / 3600.0;
    (-std::f64::consts::LN_2 * (age_hours / half_life_hours)).exp()
}

/// Multiplicative boost for case-insensitive keyword hits in `text`.
pub fn keyword_factor(text: &str, keywords: &[String], params: &ScoringParams) -> f64 {
    if keywords.is_empty() {
        return 1.0;
    }
    let lowered = text.to_lowercase();
    let hits = keywords
        .iter()
        .filter(|kw| !kw.is_empty() && lowered.contains(&kw.to_lowercase()))
        .count();
    let boost = (hits as f64 * params.keyword_boost_per_hit).min(params.keyword_boost_cap);
    1.0 + boost
}

/// Penalty for missing title, link or publication date.
pub fn completeness_factor(item: &NewsItem) -> f64 {
    let mut factor = 1.0;
    if item.title.is_empty() {
        factor *= MISSING_TITLE_FACTOR;
    }
    if item.link.is_empty() {
        factor *= MISSING_LINK_FACTOR;
    }
    if item.date_missing {
        factor *= MISSING_DATE_FACTOR;
    }
    factor
}

/// Score a single item. Pure; the caller decides where the value goes.
///
/// # Arguments
///
/// * `item` - The item to score; its current `score` is ignored
/// * `source_weights` - Per-source multipliers keyed by `item.source`
/// * `keywords` - Terms matched case-insensitively in title and summary
/// * `now` - Reference time for the recency factor
/// * `params` - Half-life and keyword boost settings
///
/// # Returns
///
/// The product of the source, recency, keyword and completeness factors.
///
/// # Examples
///
/// ```ignore
/// let item = NewsItem::new("Headline", "https://x", now, "Wire", "");
/// let s = score_item(&item, &HashMap::new(), &[], now, &ScoringParams::default());
/// assert_eq!(s, 1.0);
/// ```
pub fn score_item(
    item: &NewsItem,
    source_weights: &HashMap<String, f64>,
    keywords: &[String],
    now: DateTime<Utc>,
    params: &ScoringParams,
) -> f64 {
    let source_weight = source_weights.get(&item.source).copied().unwrap_or(1.0);
    let recency = recency_factor(item.published_at, now, params.half_life_hours);
    let keywords = keyword_factor(&format!("{} {}", item.title, item.summary), keywords, params);
    let completeness = completeness_factor(item);
    source_weight * recency * keywords * completeness
}

/// Total order used for every ranked list: higher score, newer, title, source.
pub fn compare_items(a: &NewsItem, b: &NewsItem) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.published_at.cmp(&a.published_at))
        .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        .then_with(|| a.source.to_lowercase().cmp(&b.source.to_lowercase()))
}

/// Sort in place with [`compare_items`].
pub fn sort_ranked(items: &mut [NewsItem]) {
    items.sort_by(compare_items);
}

/// Score every item and return them in ranked order.
///
/// Takes ownership of `items`; the returned items carry their score and are
/// sorted with [`compare_items`], so equal inputs always give equal output.
#[instrument(level = "debug", skip_all, fields(items = items.len()))]
pub fn rank_items(
    items: Vec<NewsItem>,
    source_weights: &HashMap<String, f64>,
    keywords: &[String],
    now: DateTime<Utc>,
    params: &ScoringParams,
) -> Vec<NewsItem> {
    let mut ranked: Vec<NewsItem> = items
        .into_iter()
        .map(|item| {
            let score = score_item(&item, source_weights, keywords, now, params);
            debug!(title = %item.title, source = %item.source, score, "Scored item");
            item.with_score(score)
        })
        .collect();
    sort_ranked(&mut ranked);
    ranked
}
