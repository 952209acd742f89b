//! Shape hashes used by the correction indices.
//!
//! The anagram hash is commutative: permuting a word leaves it unchanged, and
//! adding or removing one character shifts it by a known delta, which is what
//! makes neighbourhood lookups cheap. The OCR key collapses a word into a
//! run-length encoding over eight visual shape classes, so that strings which
//! look alike under a scanner (`m`/`rn`, `o`/`0`) collide.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Commutative fingerprint: sum of the fifth powers of the codepoints.
pub fn anagram_hash(word: &str) -> i64 {
    word.chars().map(|c| (c as i64).pow(5)).sum()
}

/// One run of the OCR key: a shape class and its accumulated weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrRun {
    pub class: char,
    pub weight: i64,
}

/// Run-length encoding of a word over the shape-class alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OcrKey {
    pub runs: Vec<OcrRun>,
}

impl fmt::Display for OcrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.runs {
            write!(f, "{}{}", run.class, run.weight)?;
        }
        Ok(())
    }
}

/// Shape class and weight of a single character. Characters outside the
/// table fall into the `#` sink class.
fn shape_class(c: char) -> (char, i64) {
    match c {
        // Lower case
        'a' => ('o', 1),
        'b' => ('o', 1),
        'c' => ('c', 1),
        'd' => ('o', 1),
        'e' => ('c', 1),
        'f' => ('i', 1),
        'g' => ('o', 1),
        'h' => ('i', 2),
        'i' => ('i', 1),
        'j' => ('i', 1),
        'k' => ('i', 1),
        'l' => ('i', 1),
        'm' => ('i', 3),
        'n' => ('i', 2),
        'o' => ('o', 1),
        'p' => ('o', 1),
        'q' => ('o', 1),
        'r' => ('i', 1),
        's' => ('s', 1),
        't' => ('i', 1),
        'u' => ('i', 2),
        'v' => ('v', 1),
        'w' => ('v', 2),
        'x' => ('v', 1),
        'y' => ('v', 1),
        'z' => ('z', 1),

        // Upper case
        'A' => ('a', 1),
        'B' => ('i', 1),
        'C' => ('c', 1),
        'D' => ('i', 1),
        'E' => ('i', 1),
        'F' => ('i', 1),
        'G' => ('c', 1),
        'H' => ('i', 2),
        'I' => ('i', 1),
        'J' => ('i', 1),
        'K' => ('i', 1),
        'L' => ('i', 1),
        'M' => ('i', 3),
        'N' => ('i', 2),
        'O' => ('o', 1),
        'P' => ('i', 1),
        'Q' => ('o', 1),
        'R' => ('i', 1),
        'S' => ('s', 1),
        'T' => ('i', 1),
        'U' => ('i', 2),
        'V' => ('v', 1),
        'W' => ('v', 2),
        'X' => ('v', 1),
        'Y' => ('v', 1),
        'Z' => ('z', 1),

        // Digits and specials that mimic letter shapes
        '0' => ('o', 1),
        '1' => ('i', 1),
        '5' => ('s', 1),
        '6' => ('o', 1),
        '9' => ('o', 1),
        '!' => ('i', 1),
        '\'' => ('\'', 1),
        '-' => ('-', 1),

        _ => ('#', 1),
    }
}

/// Compute the OCR key of a word. Adjacent characters sharing a shape class
/// accumulate their weights into one run.
pub fn ocr_key_hash(word: &str) -> OcrKey {
    let mut runs: Vec<OcrRun> = Vec::new();

    for c in word.chars() {
        let (class, weight) = shape_class(c);
        match runs.last_mut() {
            Some(last) if last.class == class => last.weight += weight,
            _ => runs.push(OcrRun { class, weight }),
        }
    }

    OcrKey { runs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anagram_hash_is_permutation_invariant() {
        assert_eq!(anagram_hash("listen"), anagram_hash("silent"));
        assert_eq!(anagram_hash("listen"), anagram_hash("litsen"));
        assert_ne!(anagram_hash("listen"), anagram_hash("listens"));
    }

    #[test]
    fn anagram_hash_single_char_delta() {
        let base = anagram_hash("cat");
        assert_eq!(anagram_hash("cats"), base + ('s' as i64).pow(5));
    }

    #[test]
    fn ocr_key_merges_adjacent_runs() {
        // b→(o,1), 0→(o,1), 0→(o,1), k→(i,1)
        assert_eq!(ocr_key_hash("b00k").to_string(), "o3i1");
        assert_eq!(ocr_key_hash("book").to_string(), "o3i1");
    }

    #[test]
    fn ocr_key_weights_accumulate() {
        // m→(i,3), i→(i,1), n→(i,2) all share the i class
        assert_eq!(ocr_key_hash("min").to_string(), "i6");
    }

    #[test]
    fn ocr_key_alternates_classes_with_positive_weights() {
        let key = ocr_key_hash("The quick-brown fox! 42");
        for pair in key.runs.windows(2) {
            assert_ne!(pair[0].class, pair[1].class);
        }
        assert!(key.runs.iter().all(|r| r.weight >= 1));
    }

    #[test]
    fn unknown_characters_sink() {
        assert_eq!(ocr_key_hash("2").to_string(), "#1");
        assert_eq!(ocr_key_hash("$$").to_string(), "#2");
    }
}
