//! Unigram and bigram frequency counters with tail truncation and pruning.
//!
//! Counters are `BTreeMap`s so that iteration, serialization and therefore
//! pruning are deterministic across runs and processes. Pruned views are kept
//! alongside the full counters: ranked lookups (anagram map, dictionary,
//! case restriction) read the pruned view, scoring reads the full one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Word (or word-pair) frequency counter.
pub type Counter = BTreeMap<String, u64>;

/// Raw casings, lowercased counts and the pruned view of the latter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unigrams {
    /// Cleaned tokens as observed, case preserved.
    pub raw: Counter,
    /// Lowercased counts: `folded[w] = Σ raw[c]` over the case variants of `w`.
    pub folded: Counter,
    pub folded_pruned: Counter,
}

impl Unigrams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate observed casings.
    pub fn record(&mut self, tokens: &[String]) {
        for token in tokens {
            *self.raw.entry(token.clone()).or_insert(0) += 1;
        }
    }

    /// Derive the lowercased counter from the raw casings and a
    /// lower → casings map.
    pub fn fold(&mut self, case_variants: &BTreeMap<String, std::collections::BTreeSet<String>>) {
        let mut folded = Counter::new();
        for (lower, variants) in case_variants {
            let total: u64 = variants
                .iter()
                .map(|v| self.raw.get(v).copied().unwrap_or(0))
                .sum();
            folded.insert(lower.clone(), total);
        }
        self.folded = folded;
    }

    pub fn prune(&mut self, rate: f64) {
        self.folded_pruned = prune_counter(&self.folded, rate);
    }
}

/// Lowercased adjacent word pairs and their pruned view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bigrams {
    pub folded: Counter,
    pub folded_pruned: Counter,
}

impl Bigrams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count consecutive token pairs. Only pairs where both members have at
    /// least two characters contribute; the pair is lowercased and joined by
    /// a single space.
    pub fn record(&mut self, tokens: &[String]) {
        for pair in tokens.windows(2) {
            if pair[0].chars().count() < 2 || pair[1].chars().count() < 2 {
                continue;
            }
            let key = format!("{} {}", pair[0].to_lowercase(), pair[1].to_lowercase());
            *self.folded.entry(key).or_insert(0) += 1;
        }
    }

    pub fn prune(&mut self, rate: f64) {
        self.folded_pruned = prune_counter(&self.folded, rate);
    }
}

/// Drop the entries whose occurrence count is shared by an outsized number
/// of items — the long tail of hapaxes and near-hapaxes.
///
/// The distribution-of-counts maps each count to the number of items holding
/// it. Counts held by more items than the clipped upper-median bound are
/// removed wholesale. An empty upper-median list leaves the counter as-is.
fn truncate_tail(counter: &Counter) -> Counter {
    if counter.is_empty() {
        return Counter::new();
    }

    let mut distribution: BTreeMap<u64, u64> = BTreeMap::new();
    for &count in counter.values() {
        *distribution.entry(count).or_insert(0) += 1;
    }

    let mut items_per_count: Vec<u64> = distribution.values().copied().collect();
    items_per_count.sort_unstable();
    let m = median(&items_per_count);

    let upper: Vec<u64> = items_per_count
        .iter()
        .copied()
        .filter(|&v| (v as f64) > m)
        .collect();
    if upper.is_empty() {
        return counter.clone();
    }

    let index = ((upper.len() as f64 * 0.99).floor() as usize).saturating_sub(1);
    let cap = upper[index];

    counter
        .iter()
        .filter(|(_, &count)| distribution[&count] <= cap)
        .map(|(word, &count)| (word.clone(), count))
        .collect()
}

/// Keep the highest-count entries until `rate` of the truncated counter has
/// been emitted, never splitting a class of equal counts.
///
/// `rate >= 1` keeps everything; the top-count class is always kept.
pub fn prune_counter(counter: &Counter, rate: f64) -> Counter {
    if rate >= 1.0 {
        return counter.clone();
    }

    let truncated = truncate_tail(counter);

    let mut entries: Vec<(&String, u64)> = truncated.iter().map(|(w, &c)| (w, c)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let total = entries.len();
    let mut pruned = Counter::new();
    let mut registered = 0usize;
    let mut current = 0u64;

    for (word, count) in entries {
        if registered > 0 && registered as f64 / total as f64 >= rate && count != current {
            break;
        }
        current = count;
        pruned.insert(word.clone(), count);
        registered += 1;
    }

    pruned
}

fn median(sorted: &[u64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}
