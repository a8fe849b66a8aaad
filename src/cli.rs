//! Command-line interface definitions for the daily digest.
//!
//! Sender and recipient addresses can also come from the environment, so a
//! scheduled job can keep them out of the config file.

use clap::Parser;

/// Command-line arguments for a single digest run.
///
/// # Examples
///
/// ```sh
/// # Build the page only
/// daily_digest --config config.yaml --dry-run
///
/// # Build and send, overriding the recipient
/// GMAIL_APP_PASSWORD=... daily_digest --to-email reader@example.com
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Write the HTML file but do not send the email
    #[arg(long)]
    pub dry_run: bool,

    /// Number of world stories to include
    #[arg(long, default_value_t = 5)]
    pub limit_world: usize,

    /// Number of India stories to include
    #[arg(long, default_value_t = 5)]
    pub limit_india: usize,

    /// Override the sender address from the config
    #[arg(long, env = "DIGEST_FROM_EMAIL")]
    pub from_email: Option<String>,

    /// Override the recipient address from the config
    #[arg(long, env = "DIGEST_TO_EMAIL")]
    pub to_email: Option<String>,
}

/// Return the trimmed override when it is present and not blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}
