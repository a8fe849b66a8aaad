//! Near-duplicate collapsing by title similarity.
//!
//! Items are clustered in a single pass: each incoming item is compared with
//! the kept representatives in insertion order and joins the **first** one
//! whose similarity reaches the threshold. A representative is replaced only
//! by a strictly higher-scored member of its cluster. The survivors are
//! re-sorted with [`crate::ranker::compare_items`].
//!
//! Similarity is the Jaccard index of the title token sets (lowercase
//! alphanumeric runs longer than two characters). When either title has no
//! such token the lowercased titles are compared with [`sequence_ratio`].

use crate::models::NewsItem;
use crate::ranker::sort_ranked;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Default similarity at or above which two items are the same story.
pub const DEFAULT_DEDUPE_THRESHOLD: f64 = 0.6;

/// Sequences at least this long get the popular-character heuristic.
const AUTOJUNK_MIN_LEN: usize = 200;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").unwrap());

/// Tunable deduplication parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupeParams {
    /// Minimum similarity (inclusive) for two items to merge.
    pub threshold: f64,
}

impl Default for DedupeParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DEDUPE_THRESHOLD,
        }
    }
}

/// Lowercased alphanumeric tokens longer than two characters.
pub fn tokenize(title: &str) -> HashSet<String> {
    let lowered = title.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() > 2)
        .map(str::to_string)
        .collect()
}

/// Title similarity in `[0, 1]`; symmetric in its arguments.
///
/// # Examples
///
/// ```ignore
/// // {india, election, results, announced} on both sides
/// let a = NewsItem::new("India election results announced", "", now, "A", "");
/// let b = NewsItem::new("Election results announced in India", "", now, "B", "");
/// assert_eq!(similarity(&a, &b), 1.0);
/// ```
pub fn similarity(a: &NewsItem, b: &NewsItem) -> f64 {
    let tokens_a = tokenize(&a.title);
    let tokens_b = tokenize(&b.title);
    if !tokens_a.is_empty() && !tokens_b.is_empty() {
        let intersection = tokens_a.intersection(&tokens_b).count();
        let union = tokens_a.union(&tokens_b).count();
        return intersection as f64 / union as f64;
    }

    let lower_a = a.title.to_lowercase();
    let lower_b = b.title.to_lowercase();
    // Matching blocks depend on argument order; fix it so the ratio doesn't.
    if lower_a <= lower_b {
        sequence_ratio(&lower_a, &lower_b)
    } else {
        sequence_ratio(&lower_b, &lower_a)
    }
}

/// Ratcliff/Obershelp similarity: `2 * M / T`, where `M` is the number of
/// characters in matching blocks and `T` the combined length.
///
/// Blocks are found by taking the longest common run (earliest in `a`, then
/// earliest in `b` on ties) and recursing on both sides of it. Two empty
/// strings are identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matcher = SequenceMatcher::new(&a, &b);
    2.0 * matcher.matched_chars() as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character of `b`, minus the popular ones.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, ch) in b.iter().enumerate() {
            b2j.entry(*ch).or_default().push(j);
        }
        if b.len() >= AUTOJUNK_MIN_LEN {
            let popular = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= popular);
        }
        Self { a, b, b2j }
    }

    /// Longest block `(i, j, size)` inside `a[alo..ahi]` and `b[blo..bhi]`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
        // j2len[j] = length of the match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular characters never start a block, but may extend one.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }
        (best_i, best_j, best_size)
    }

    fn matched_chars(&self) -> usize {
        let mut matched = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            matched += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }
        matched
    }
}

/// Collapse near-duplicates, keeping the best-scored item of each cluster.
///
/// # Arguments
///
/// * `items` - Scored items, normally the output of [`crate::ranker::rank_items`]
/// * `params` - Similarity threshold (inclusive)
///
/// # Returns
///
/// One item per cluster, sorted like [`crate::ranker::rank_items`]. Running
/// the result through again changes nothing.
#[instrument(
    level = "debug",
    skip_all,
    fields(items = items.len(), threshold = params.threshold)
)]
pub fn dedupe_items(items: Vec<NewsItem>, params: &DedupeParams) -> Vec<NewsItem> {
    let mut kept: Vec<NewsItem> = Vec::new();
    for item in items {
        let matched = kept
            .iter()
            .position(|existing| similarity(&item, existing) >= params.threshold);
        match matched {
            None => kept.push(item),
            Some(idx) if item.score > kept[idx].score => {
                debug!(
                    kept = %item.title,
                    dropped = %kept[idx].title,
                    "Replaced cluster representative"
                );
                kept[idx] = item;
            }
            Some(idx) => {
                debug!(kept = %kept[idx].title, dropped = %item.title, "Dropped duplicate");
            }
        }
    }
    sort_ranked(&mut kept);
    kept
}
