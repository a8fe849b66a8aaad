//! # Daily Digest
//!
//! Pulls world and India headlines from RSS/Atom feeds, scores and
//! deduplicates them, and renders a short ranked digest that can be sent by
//! email.
//!
//! ## Architecture
//!
//! 1. **Ingestion** ([`feeds`]): fetch feeds and normalize entries into [`models::NewsItem`]
//! 2. **Ranking** ([`ranker`]): score by source weight, recency, keywords and completeness
//! 3. **Deduplication** ([`dedupe`]): collapse near-identical headlines
//! 4. **Output** ([`render`], [`emailer`]): HTML page on disk, optionally emailed
//!
//! [`pipeline::run`] ties the steps together for the binary.

pub mod cli;
pub mod config;
pub mod dedupe;
pub mod emailer;
pub mod error;
pub mod feeds;
pub mod models;
pub mod pipeline;
pub mod ranker;
pub mod render;
pub mod utils;

pub use error::{DigestError, Result};
