//! Scoring functions for candidate corrections.
//!
//! All scores are monotonic in the candidate's corpus frequency. Words the
//! occurrence map has never seen score zero and are discarded by the
//! strictly-positive filter downstream.

use crate::line::CorrectionMap;
use crate::ngram::Counter;

pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

fn log_frequency(occurrence: &Counter, word: &str) -> Option<f64> {
    let freq = occurrence.get(&word.to_lowercase()).copied().unwrap_or(0);
    if freq == 0 {
        None
    } else {
        Some((freq as f64).ln())
    }
}

/// `(|word| − edit_distance) · retrievals · ln(freq)`.
pub fn score_anagram(
    occurrence: &Counter,
    word: &str,
    candidate: &str,
    retrievals: u32,
) -> f64 {
    let Some(log_freq) = log_frequency(occurrence, candidate) else {
        return 0.0;
    };
    let closeness =
        word.chars().count() as f64 - edit_distance(word, candidate) as f64;
    closeness * retrievals as f64 * log_freq
}

/// `(|word| − edit_distance − cardinality_diff) · ln(freq)`.
pub fn score_ocr_key(
    occurrence: &Counter,
    word: &str,
    candidate: &str,
    cardinality_diff: i64,
) -> f64 {
    let Some(log_freq) = log_frequency(occurrence, candidate) else {
        return 0.0;
    };
    let closeness = word.chars().count() as f64
        - edit_distance(word, candidate) as f64
        - cardinality_diff as f64;
    closeness * log_freq
}

/// Contextual boost: log of the summed occurrence of the candidate next to
/// its neighbour pools, floored at 2 so the boost never turns negative.
pub fn score_bigram(
    correction: &str,
    previous: &[String],
    next: &[String],
    occurrence: &Counter,
) -> f64 {
    let mut total: u64 = 0;
    for p in previous {
        total += occurrence
            .get(&format!("{p} {correction}"))
            .copied()
            .unwrap_or(0);
    }
    for n in next {
        total += occurrence
            .get(&format!("{correction} {n}"))
            .copied()
            .unwrap_or(0);
    }
    (total.max(2) as f64).ln()
}

/// Scale a candidate map into a probability distribution. A single survivor
/// gets score 1 outright.
pub fn normalize_scores(mut map: CorrectionMap) -> CorrectionMap {
    if map.len() == 1 {
        for score in map.values_mut() {
            *score = 1.0;
        }
        return map;
    }

    let total: f64 = map.values().sum();
    if total > 0.0 {
        for score in map.values_mut() {
            *score /= total;
        }
    }
    map
}
