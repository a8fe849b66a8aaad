//! YAML configuration loading and validation.
//!
//! ```yaml
//! world_feeds:
//!   - { name: BBC World, url: "https://feeds.bbci.co.uk/news/world/rss.xml" }
//! india_feeds:
//!   - { name: The Hindu, url: "https://www.thehindu.com/news/national/feeder/default.rss" }
//! source_weights: { BBC World: 1.2, The Hindu: 1.1 }
//! keywords: [election, monsoon, markets]
//! email:
//!   from_email: me@example.com
//!   to_email: me@example.com
//!   subject_prefix: Daily Digest   # default
//!   smtp_host: smtp.gmail.com      # default
//!   smtp_port: 465                 # default
//! output_dir: out                  # default
//! timezone: Asia/Kolkata           # default
//! ranking:                         # all optional
//!   half_life_hours: 18.0
//!   keyword_boost_per_hit: 0.12
//!   keyword_boost_cap: 0.5
//!   dedupe_threshold: 0.6
//! ```
//!
//! The raw YAML is deserialized into permissive structs, then validated into
//! [`AppConfig`]. Validation failures come back as [`DigestError::Config`].

use crate::dedupe::{DEFAULT_DEDUPE_THRESHOLD, DedupeParams};
use crate::error::{DigestError, Result};
use crate::ranker::{
    DEFAULT_HALF_LIFE_HOURS, DEFAULT_KEYWORD_BOOST_CAP, DEFAULT_KEYWORD_BOOST_PER_HIT,
    ScoringParams,
};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use url::Url;

const DEFAULT_SUBJECT_PREFIX: &str = "Daily Digest";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_OUTPUT_DIR: &str = "out";
const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// A single named feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Logical source name; also the key into `source_weights`.
    pub name: String,
    pub url: String,
}

/// SMTP delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub from_email: String,
    pub to_email: String,
    pub subject_prefix: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

/// Ranking and deduplication knobs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub half_life_hours: f64,
    pub keyword_boost_per_hit: f64,
    pub keyword_boost_cap: f64,
    pub dedupe_threshold: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            half_life_hours: DEFAULT_HALF_LIFE_HOURS,
            keyword_boost_per_hit: DEFAULT_KEYWORD_BOOST_PER_HIT,
            keyword_boost_cap: DEFAULT_KEYWORD_BOOST_CAP,
            dedupe_threshold: DEFAULT_DEDUPE_THRESHOLD,
        }
    }
}

impl RankingConfig {
    pub fn scoring_params(&self) -> ScoringParams {
        ScoringParams {
            half_life_hours: self.half_life_hours,
            keyword_boost_per_hit: self.keyword_boost_per_hit,
            keyword_boost_cap: self.keyword_boost_cap,
        }
    }

    pub fn dedupe_params(&self) -> DedupeParams {
        DedupeParams {
            threshold: self.dedupe_threshold,
        }
    }
}

/// Fully validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub world_feeds: Vec<FeedConfig>,
    pub india_feeds: Vec<FeedConfig>,
    pub source_weights: HashMap<String, f64>,
    pub keywords: Vec<String>,
    pub email: EmailConfig,
    pub output_dir: String,
    /// Zone used for the digest's local date.
    pub timezone: Tz,
    pub ranking: RankingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    world_feeds: Option<Vec<RawFeed>>,
    india_feeds: Option<Vec<RawFeed>>,
    source_weights: Option<HashMap<String, f64>>,
    keywords: Option<Vec<String>>,
    email: Option<RawEmail>,
    output_dir: Option<String>,
    timezone: Option<String>,
    ranking: Option<RankingConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFeed {
    name: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEmail {
    from_email: Option<String>,
    to_email: Option<String>,
    subject_prefix: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
}

/// Load and validate the config file at `path`.
///
/// # Errors
///
/// Returns [`DigestError::Config`] when the file is missing or fails
/// validation, [`DigestError::Yaml`] when it is not valid YAML, and
/// [`DigestError::Io`] when it cannot be read.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DigestError::Config(format!("Config not found: {}", path.display())));
    }
    let text = std::fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    debug!(
        path = %path.display(),
        world_feeds = config.world_feeds.len(),
        india_feeds = config.india_feeds.len(),
        keywords = config.keywords.len(),
        "Loaded configuration"
    );
    Ok(config)
}

/// Validate config from YAML text. An empty document is all defaults.
pub fn parse_config(text: &str) -> Result<AppConfig> {
    let value: serde_yaml::Value = if text.trim().is_empty() {
        serde_yaml::Value::Null
    } else {
        serde_yaml::from_str(text)?
    };
    let raw: RawConfig = if value.is_null() {
        RawConfig::default()
    } else {
        serde_yaml::from_value(value)?
    };
    validate(raw)
}

fn validate(raw: RawConfig) -> Result<AppConfig> {
    let world_feeds = parse_feeds(raw.world_feeds, "world_feeds")?;
    let india_feeds = parse_feeds(raw.india_feeds, "india_feeds")?;
    let source_weights = raw.source_weights.unwrap_or_default();
    let keywords = raw
        .keywords
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    let email = parse_email(raw.email.unwrap_or_default())?;

    let output_dir = raw
        .output_dir
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    let tz_name = raw.timezone.unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    let timezone: Tz = tz_name
        .trim()
        .parse()
        .map_err(|_| DigestError::Config(format!("unknown timezone: {}", tz_name.trim())))?;

    let ranking = raw.ranking.unwrap_or_default();
    if !(0.0..=1.0).contains(&ranking.dedupe_threshold) {
        return Err(DigestError::Config(
            "ranking.dedupe_threshold must be between 0 and 1".to_string(),
        ));
    }

    Ok(AppConfig {
        world_feeds,
        india_feeds,
        source_weights,
        keywords,
        email,
        output_dir,
        timezone,
        ranking,
    })
}

fn parse_feeds(raw: Option<Vec<RawFeed>>, label: &str) -> Result<Vec<FeedConfig>> {
    let mut feeds = Vec::new();
    for (idx, item) in raw.unwrap_or_default().into_iter().enumerate() {
        let name = item.name.unwrap_or_default().trim().to_string();
        let url = item.url.unwrap_or_default().trim().to_string();
        if name.is_empty() || url.is_empty() {
            return Err(DigestError::Config(format!("{label}[{idx}] requires name and url")));
        }
        match Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(DigestError::Config(format!(
                    "{label}[{idx}] has unsupported url scheme: {}",
                    parsed.scheme()
                )));
            }
            Err(e) => {
                return Err(DigestError::Config(format!("{label}[{idx}] has invalid url: {e}")));
            }
        }
        feeds.push(FeedConfig { name, url });
    }
    Ok(feeds)
}

fn parse_email(raw: RawEmail) -> Result<EmailConfig> {
    let from_email = raw.from_email.unwrap_or_default().trim().to_string();
    let to_email = raw.to_email.unwrap_or_default().trim().to_string();
    if from_email.is_empty() || to_email.is_empty() {
        return Err(DigestError::Config(
            "email.from_email and email.to_email are required".to_string(),
        ));
    }
    let subject_prefix = raw
        .subject_prefix
        .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string())
        .trim()
        .to_string();
    let smtp_host = raw
        .smtp_host
        .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string())
        .trim()
        .to_string();
    Ok(EmailConfig {
        from_email,
        to_email,
        subject_prefix,
        smtp_host,
        smtp_port: raw.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
    })
}
