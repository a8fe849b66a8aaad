//! Plain-text cleanup for feed content.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default summary length cap, in characters.
pub const SUMMARY_MAX_CHARS: usize = 320;
/// Default number of sentences kept in a summary.
pub const SUMMARY_MAX_SENTENCES: usize = 2;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Remove anything that looks like an HTML tag.
pub fn strip_html(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `limit` characters, ending in `...` when shortened.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Turn an HTML description into a short plain-text summary.
///
/// Tags are stripped, entities decoded, whitespace collapsed; then the first
/// `max_sentences` sentences (split after `.`, `!` or `?`) are kept and the
/// result is capped at `max_chars`.
pub fn summarize_text(text: &str, max_chars: usize, max_sentences: usize) -> String {
    let stripped = strip_html(text);
    let decoded = html_escape::decode_html_entities(&stripped);
    let cleaned = collapse_whitespace(&decoded);
    if cleaned.is_empty() {
        return String::new();
    }

    let mut words = Vec::new();
    let mut sentences = 0;
    for word in cleaned.split(' ') {
        words.push(word);
        if word.ends_with(['.', '!', '?']) {
            sentences += 1;
            if sentences >= max_sentences {
                break;
            }
        }
    }
    let mut summary = words.join(" ");
    if summary.is_empty() {
        summary = cleaned;
    }
    truncate_chars(&summary, max_chars)
}
