//! Feature extraction for the learning model.
//!
//! Sixteen raw measurements per line are normalised against the document
//! statistics, reordered into the canonical layout, run through a degree-1
//! polynomial lift and trimmed to the final 13-element vector the classifier
//! was trained on.

use crate::error::Result;
use crate::line::Line;
use crate::ngram::Counter;
use crate::stats::Statistics;

/// Length of the extracted feature vector.
pub const FEATURE_LEN: usize = 13;

/// Canonical ordering of the normalised measurements, by raw index.
const CANONICAL_ORDER: [usize; 14] = [11, 12, 9, 10, 13, 14, 0, 1, 2, 3, 4, 5, 6, 7];

/// Extract the feature vector of one line.
pub fn extract_features(
    line: &Line,
    unigrams: &Counter,
    doc_stats: &Statistics,
) -> Result<Vec<f64>> {
    let orig = line.orig_stats();
    let o_lw = orig.get("lw_char")?;
    let o_up = orig.get("up_char")?;
    let o_sp = orig.get("sp_char")?;
    let o_nb = orig.get("nb_char")?;

    let clean = line.clean_stats();
    let c_lw = clean.get("lw_char")?;
    let c_up = clean.get("up_char")?;
    let c_sp = clean.get("sp_char")?;
    let c_nb = clean.get("nb_char")?;

    let token_count = line.tokens.len() as f64;
    let line_score = line.line_score();
    let orig_len = line.orig_line().chars().count() as f64;
    let clean_len = line.clean_line().chars().count() as f64;

    let mean_token_len = mean(
        line.tokens
            .iter()
            .map(|t| t.original.chars().count() as f64),
    );

    // mean corpus frequency of the original, cleaned and corrected forms
    let freq = |word: &str| unigrams.get(word).copied().unwrap_or(0) as f64;
    let s0 = mean(line.tokens.iter().map(|t| freq(&t.original)));
    let s1 = mean(
        line.tokens
            .iter()
            .filter_map(|t| t.cleaned.as_deref())
            .map(freq),
    );
    let s2 = mean(
        line.tokens
            .iter()
            .filter_map(|t| t.corrections.as_ref())
            .flat_map(|map| map.keys())
            .map(|word| freq(word)),
    );

    // normalisation
    let orig_sum = o_lw + o_up + o_sp + o_nb;
    let clean_sum = c_lw + c_up + c_sp + c_nb;
    let ratio = |value: f64, denom: f64| if denom != 0.0 { value / denom } else { 0.0 };

    let word_avg_nb = doc_stats.get("word_avg_nb")?;
    let word_avg_length = doc_stats.get("word_avg_length")?;
    let line_avg_length = doc_stats.get("line_avg_length")?;

    let normalised: [f64; 15] = [
        ratio(o_lw, orig_sum),
        ratio(o_up, orig_sum),
        ratio(o_sp, orig_sum),
        ratio(o_nb, orig_sum),
        ratio(c_lw, clean_sum),
        ratio(c_up, clean_sum),
        ratio(c_sp, clean_sum),
        ratio(c_nb, clean_sum),
        line_score,
        ratio(token_count, word_avg_nb),
        ratio(mean_token_len, word_avg_length),
        ratio(orig_len, line_avg_length),
        ratio(clean_len, line_avg_length),
        ratio(s1, s0),
        ratio(s2, s0),
    ];

    let ordered: Vec<f64> = CANONICAL_ORDER
        .iter()
        .map(|&index| normalised[index])
        .collect();

    // degree-1 polynomial lift: the coefficient vector itself, with the
    // sixth entry removed
    let mut lifted = ordered;
    lifted.remove(5);

    debug_assert_eq!(lifted.len(), FEATURE_LEN);
    Ok(lifted)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
