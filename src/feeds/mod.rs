//! Feed ingestion: fetch configured RSS/Atom feeds and normalize their entries.
//!
//! Each feed follows the same two steps:
//!
//! 1. **Fetching**: one HTTP GET with a fixed timeout, no retries
//! 2. **Parsing**: [`parser::parse_feed`] turns the body into [`NewsItem`]s
//!
//! Feeds are fetched a few at a time with `futures::stream`, and results keep
//! the configured feed order. A feed that fails at either step is logged and
//! skipped; it never fails the whole batch.

pub mod parser;
pub mod text;

use crate::config::FeedConfig;
use crate::error::{DigestError, Result};
use crate::models::NewsItem;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

pub use parser::parse_feed;

/// Per-request timeout.
pub const FETCH_TIMEOUT_SECS: u64 = 12;

/// Number of feeds fetched concurrently.
const CONCURRENT_FETCHES: usize = 4;

const USER_AGENT: &str = concat!("daily-digest-bot/", env!("CARGO_PKG_VERSION"));
const ACCEPT_FEEDS: &str =
    "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.5";

/// Build the HTTP client shared by all feed fetches.
pub fn build_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_FEEDS));
    let client = Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetch every feed and return all parsed items, in feed order.
///
/// Up to four feeds are in flight at once. A feed that fails to download or
/// parse is logged with `warn!` and contributes no items; it never fails the
/// batch.
///
/// # Arguments
///
/// * `client` - Client from [`build_client`]
/// * `feeds` - Feeds to fetch; output keeps this order
/// * `now` - Stand-in publication time for undated entries
#[instrument(level = "info", skip_all, fields(feeds = feeds.len()))]
pub async fn fetch_feeds(
    client: &Client,
    feeds: &[FeedConfig],
    now: DateTime<Utc>,
) -> Vec<NewsItem> {
    let batches: Vec<Vec<NewsItem>> = stream::iter(feeds)
        .map(|feed| async move {
            match fetch_feed(client, feed, now).await {
                Ok(items) => {
                    info!(feed = %feed.name, count = items.len(), "Fetched feed");
                    items
                }
                Err(e) => {
                    warn!(
                        feed = %feed.name,
                        url = %feed.url,
                        error = %e,
                        "Failed to fetch feed; skipping"
                    );
                    Vec::new()
                }
            }
        })
        .buffered(CONCURRENT_FETCHES)
        .collect()
        .await;

    let items: Vec<NewsItem> = batches.into_iter().flatten().collect();
    info!(count = items.len(), "Fetched all feeds");
    items
}

/// Fetch and parse a single feed.
///
/// # Errors
///
/// [`DigestError::Http`] for transport failures and non-success statuses,
/// [`DigestError::Feed`] when the body is not a feed.
#[instrument(level = "debug", skip_all, fields(feed = %feed.name))]
pub async fn fetch_feed(
    client: &Client,
    feed: &FeedConfig,
    now: DateTime<Utc>,
) -> Result<Vec<NewsItem>> {
    let response = client.get(&feed.url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Downloaded feed body");

    parse_feed(&body, &feed.name, now).map_err(|e| {
        debug!(body = %truncate_for_log(&body, 300), "Unparseable feed body");
        DigestError::Feed(format!("{}: {}", feed.name, e))
    })
}
