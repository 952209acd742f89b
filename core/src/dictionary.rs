//! Accepted-word dictionary backed by an FST set.
//!
//! The dictionary is the intersection of an external word list with the
//! pruned unigrams, rebuilt on every training update. An `fst::Set` keeps
//! membership checks cheap and the serialized form byte-stable for a given
//! word set.

use crate::error::Result;
use fst::{Set, Streamer};
use std::collections::BTreeSet;
use std::fmt;

pub struct Dictionary {
    set: Set<Vec<u8>>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("words", &self.set.len())
            .finish()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            set: Set::from_iter(std::iter::empty::<&str>())
                .expect("empty set builds"),
        }
    }

    /// Rebuild from an already-sorted word set.
    pub fn rebuild(words: &BTreeSet<String>) -> Result<Self> {
        let set = Set::from_iter(words.iter())?;
        Ok(Self { set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Serialized FST bytes, suitable for the model store.
    pub fn as_bytes(&self) -> &[u8] {
        self.set.as_fst().as_bytes()
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            set: Set::new(bytes)?,
        })
    }

    /// All words in lexicographic order.
    pub fn words(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.set.len());
        let mut stream = self.set.stream();
        while let Some(bytes) = stream.next() {
            out.push(String::from_utf8_lossy(bytes).into_owned());
        }
        out
    }
}
