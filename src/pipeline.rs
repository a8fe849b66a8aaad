//! One digest run, from config to delivered email.
//!
//! 1. **Fetching**: world and India feeds, each list fetched independently
//! 2. **Selection**: rank, collapse near-duplicates, keep the top N per section
//! 3. **Output**: render the HTML page and write `<output_dir>/<local date>.html`
//! 4. **Delivery**: send the page by email unless this is a dry run

use crate::cli::{Cli, non_blank};
use crate::config::{AppConfig, load_config};
use crate::dedupe::dedupe_items;
use crate::emailer::send_email;
use crate::error::Result;
use crate::feeds::{build_client, fetch_feeds};
use crate::models::NewsItem;
use crate::ranker::rank_items;
use crate::render::render_email;
use crate::utils::{ensure_writable_dir, local_date};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Rank, deduplicate and keep the best `limit` items of one section.
pub fn top_stories(
    items: Vec<NewsItem>,
    config: &AppConfig,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<NewsItem> {
    let ranked = rank_items(
        items,
        &config.source_weights,
        &config.keywords,
        now,
        &config.ranking.scoring_params(),
    );
    let mut unique = dedupe_items(ranked, &config.ranking.dedupe_params());
    unique.truncate(limit);
    unique
}

/// Path of the HTML page for `date` under `output_dir`.
pub fn output_path(output_dir: &Path, date: &str) -> PathBuf {
    output_dir.join(format!("{date}.html"))
}

fn log_section(section: &str, items: &[NewsItem]) {
    info!(section, count = items.len(), "Selected stories");
    for (rank, item) in items.iter().enumerate() {
        info!(
            section,
            rank = rank + 1,
            score = item.score,
            source = %item.source,
            title = %item.title,
            "Story"
        );
    }
}

/// Execute a full digest run for the given arguments.
#[instrument(level = "info", skip_all, fields(config = %args.config, dry_run = args.dry_run))]
pub async fn run(args: &Cli) -> Result<()> {
    let config = load_config(&args.config)?;
    let now = Utc::now();
    let date = local_date(now, config.timezone);

    let output_dir = PathBuf::from(&config.output_dir);
    ensure_writable_dir(&output_dir).await?;

    let client = build_client()?;
    let world_items = fetch_feeds(&client, &config.world_feeds, now).await;
    let india_items = fetch_feeds(&client, &config.india_feeds, now).await;
    info!(world = world_items.len(), india = india_items.len(), "Collected raw items");

    let world = top_stories(world_items, &config, now, args.limit_world);
    let india = top_stories(india_items, &config, now, args.limit_india);

    let html = render_email(&world, &india, now, config.timezone);
    let path = output_path(&output_dir, &date);
    tokio::fs::write(&path, &html).await?;
    info!(path = %path.display(), bytes = html.len(), "Wrote digest HTML");

    log_section("world", &world);
    log_section("india", &india);

    if args.dry_run {
        info!("Dry run; email not sent");
        return Ok(());
    }

    let from_email = non_blank(args.from_email.as_deref())
        .unwrap_or_else(|| config.email.from_email.clone());
    let to_email =
        non_blank(args.to_email.as_deref()).unwrap_or_else(|| config.email.to_email.clone());
    let subject = format!("{} {}", config.email.subject_prefix, date);

    send_email(
        &html,
        &subject,
        &from_email,
        &to_email,
        &config.email.smtp_host,
        config.email.smtp_port,
    )
    .await
}
