//! Anagram map: commutative hash → words, plus the character-delta alphabet.
//!
//! The alphabet holds the hashes of every single character and adjacent
//! character pair observed in the unigrams (words padded with one space on
//! each side), plus zero. During lookup, adding an alphabet hash and
//! subtracting a local one walks the single-edit neighbourhood of a token.

use crate::hashing::anagram_hash;
use crate::ngram::Counter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnagramMap {
    pub hashmap: BTreeMap<i64, BTreeSet<String>>,
    pub alphabet: BTreeSet<i64>,
}

impl AnagramMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild both the hash map (over pruned unigram and bigram keys) and
    /// the alphabet (over pruned unigram keys).
    pub fn rebuild(&mut self, pruned_bigrams: &Counter, pruned_unigrams: &Counter) {
        let mut hashmap: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
        for word in pruned_bigrams.keys().chain(pruned_unigrams.keys()) {
            hashmap
                .entry(anagram_hash(word))
                .or_default()
                .insert(word.clone());
        }
        self.hashmap = hashmap;

        let mut alphabet = BTreeSet::new();
        for word in pruned_unigrams.keys() {
            alphabet.extend(local_alphabet(word));
        }
        alphabet.insert(0);
        self.alphabet = alphabet;
    }

    pub fn lookup(&self, hash: i64) -> Option<&BTreeSet<String>> {
        self.hashmap.get(&hash)
    }
}

/// Hashes of the single characters and adjacent pairs of `" word "`,
/// restricted to `[a-zA-Z '-]`, with zero always included.
pub fn local_alphabet(word: &str) -> BTreeSet<i64> {
    let padded: Vec<char> = std::iter::once(' ')
        .chain(word.chars())
        .chain(std::iter::once(' '))
        .collect();

    let in_alphabet =
        |c: char| c.is_ascii_alphabetic() || c == ' ' || c == '\'' || c == '-';

    let mut out = BTreeSet::new();
    out.insert(0);

    for &c in &padded {
        if in_alphabet(c) {
            out.insert(anagram_hash(&c.to_string()));
        }
    }
    for pair in padded.windows(2) {
        if in_alphabet(pair[0]) && in_alphabet(pair[1]) {
            let mut s = String::with_capacity(2);
            s.push(pair[0]);
            s.push(pair[1]);
            out.insert(anagram_hash(&s));
        }
    }

    out
}
