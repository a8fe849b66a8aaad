//! Error types for the digest pipeline.
//!
//! Ranking and deduplication never fail; everything that touches the outside
//! world (config files, feeds, SMTP, the output directory) reports through
//! [`DigestError`].

use thiserror::Error;

/// Common error type for digest operations.
#[derive(Error, Debug)]
pub enum DigestError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// YAML syntax or type error in the config file.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Feed could not be fetched or interpreted.
    #[error("feed error: {0}")]
    Feed(String),

    /// Feed body is not a parseable RSS/Atom document.
    #[error("feed parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Message building or SMTP delivery failure.
    #[error("email error: {0}")]
    Email(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, DigestError>;
