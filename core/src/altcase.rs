//! Case-variant map: lowercased form → set of observed casings.

use crate::ngram::Counter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type CaseVariants = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AltCaseMap {
    /// Every lowercased form seen so far with all of its casings.
    pub full: CaseVariants,
    /// Restricted to the keys that survived unigram pruning.
    pub pruned: CaseVariants,
}

impl AltCaseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the full map from the raw (case-preserving) unigram counter.
    pub fn rebuild(&mut self, raw_unigrams: &Counter) {
        let mut map = CaseVariants::new();
        for casing in raw_unigrams.keys() {
            map.entry(casing.to_lowercase())
                .or_default()
                .insert(casing.clone());
        }
        self.full = map;
    }

    /// Restrict the pruned view to keys present in the pruned unigrams.
    pub fn prune_to(&mut self, pruned_unigrams: &Counter) {
        self.pruned = self
            .full
            .iter()
            .filter(|(lower, _)| pruned_unigrams.contains_key(*lower))
            .map(|(lower, variants)| (lower.clone(), variants.clone()))
            .collect();
    }

    pub fn variants(&self, lower: &str) -> Option<&BTreeSet<String>> {
        self.full.get(lower)
    }
}
