//! OCR-key map: shape string → dictionary words sharing that shape.

use crate::hashing::ocr_key_hash;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrKeyMap {
    pub map: BTreeMap<String, BTreeSet<String>>,
}

impl OcrKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every word under its serialized OCR key, keeping whatever was
    /// already there.
    pub fn extend<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            let key = ocr_key_hash(word).to_string();
            self.map.entry(key).or_default().insert(word.to_string());
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.map.get(key)
    }
}
