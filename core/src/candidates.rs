//! Candidate generation, fusion, case restoration and final selection.
//!
//! A [`CorrectionContext`] bundles read-only references to the shared indices
//! for one correction pass. Candidate generation for a cleaned token is pure
//! over the context, so repeated tokens are served from a small LRU cache.

use crate::altcase::AltCaseMap;
use crate::anagram::{local_alphabet, AnagramMap};
use crate::dictionary::Dictionary;
use crate::error::{DenoiseError, Result};
use crate::hashing::{anagram_hash, ocr_key_hash};
use crate::line::{CorrectionMap, Token};
use crate::ngram::Counter;
use crate::ocrkey::OcrKeyMap;
use crate::ranking::{
    edit_distance, normalize_scores, score_anagram, score_bigram, score_ocr_key,
};
use crate::{Config, Paragraph};
use ahash::AHashMap;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// Read-only view of the trained indices for one correction pass.
pub struct CorrectionContext<'a> {
    /// Folded unigram and bigram occurrences, summed into one map.
    pub occurrence: Counter,
    pub altcase: &'a AltCaseMap,
    pub ocrkeys: &'a OcrKeyMap,
    pub anagrams: &'a AnagramMap,
    pub dictionary: &'a Dictionary,
    pub config: &'a Config,
    cache: RefCell<lru::LruCache<String, Option<CorrectionMap>>>,
}

impl<'a> CorrectionContext<'a> {
    pub fn new(
        occurrence: Counter,
        altcase: &'a AltCaseMap,
        ocrkeys: &'a OcrKeyMap,
        anagrams: &'a AnagramMap,
        dictionary: &'a Dictionary,
        config: &'a Config,
    ) -> Self {
        let capacity = NonZeroUsize::new(config.candidate_cache_size)
            .unwrap_or(NonZeroUsize::new(1024).expect("non-zero literal"));
        Self {
            occurrence,
            altcase,
            ocrkeys,
            anagrams,
            dictionary,
            config,
            cache: RefCell::new(lru::LruCache::new(capacity)),
        }
    }

    /// Full per-token pipeline: short-circuit, neighbourhood search, fusion,
    /// case restoration, normalisation. `None` means no candidate survived.
    pub fn correct_token(&self, cleaned: &str) -> Result<Option<CorrectionMap>> {
        if cleaned.chars().count() <= 2 || self.dictionary.contains(&cleaned.to_lowercase()) {
            let mut map = CorrectionMap::new();
            map.insert(cleaned.to_string(), 1.0);
            return Ok(Some(map));
        }

        if let Some(cached) = self.cache.borrow_mut().get(cleaned) {
            return Ok(cached.clone());
        }

        let anagrams = self.select_anagrams(cleaned);
        let ocr_sims = self.select_ocr_sims(cleaned);
        let merged = self.build_candidates(cleaned, anagrams, ocr_sims);
        let cased = self.correct_case(cleaned, merged)?;

        let positive: CorrectionMap =
            cased.into_iter().filter(|(_, score)| *score > 0.0).collect();
        let result = if positive.is_empty() {
            None
        } else {
            Some(normalize_scores(positive))
        };

        self.cache
            .borrow_mut()
            .put(cleaned.to_string(), result.clone());
        Ok(result)
    }

    /// Anagram neighbourhood: walk `hash + x − y` over the index alphabet and
    /// the token's own alphabet, scoring every stored word within the edit
    /// ceiling.
    fn select_anagrams(&self, token: &str) -> CorrectionMap {
        let focus = local_alphabet(token);
        let token_hash = anagram_hash(token);

        let mut retrievals: AHashMap<i64, u32> = AHashMap::new();
        for &x in &self.anagrams.alphabet {
            for &y in &focus {
                *retrievals.entry(token_hash + x - y).or_insert(0) += 1;
            }
        }

        let mut out = CorrectionMap::new();
        for (&hash, &count) in &retrievals {
            let Some(words) = self.anagrams.lookup(hash) else {
                continue;
            };
            for word in words {
                if edit_distance(word, token) > self.config.anagram_edit_ceiling {
                    continue;
                }
                let score = score_anagram(&self.occurrence, token, word, count);
                if score > 0.0 {
                    out.insert(word.clone(), score);
                }
            }
        }
        out
    }

    /// OCR-key neighbourhood: perturb each run weight by ±delta (clamped at
    /// one) and look the mutated shape up in the index.
    fn select_ocr_sims(&self, token: &str) -> CorrectionMap {
        let delta = self.config.ocr_weight_delta;
        let token_key = ocr_key_hash(token);

        // keyed by perturbed shape string, so a shape reached twice is
        // scored once
        let mut sim_lists: BTreeMap<String, Vec<(String, i64)>> = BTreeMap::new();

        for (index, run) in token_key.runs.iter().enumerate() {
            for d in -delta..=delta {
                if d == 0 {
                    continue;
                }
                let card = (run.weight + d).max(1);
                let mut perturbed = token_key.clone();
                perturbed.runs[index].weight = card;
                let key = perturbed.to_string();

                let Some(words) = self.ocrkeys.lookup(&key) else {
                    continue;
                };
                let card_diff = (run.weight - card).abs();
                let hits: Vec<(String, i64)> = words
                    .iter()
                    .filter(|w| edit_distance(w, token) <= self.config.ocr_edit_ceiling)
                    .map(|w| (w.clone(), card_diff))
                    .collect();
                sim_lists.insert(key, hits);
            }
        }

        let mut out = CorrectionMap::new();
        for hits in sim_lists.values() {
            for (word, card_diff) in hits {
                let score = score_ocr_key(&self.occurrence, token, word, *card_diff);
                if score > 0.0 {
                    out.insert(word.clone(), score);
                }
            }
        }
        out
    }

    /// Deterministic candidate order: score, then edit distance, then the
    /// ASCII-zeroed alphabetical rule, then md5.
    fn ocr_order(
        &self,
        token: &str,
        a: &(String, f64),
        b: &(String, f64),
    ) -> Ordering {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                edit_distance(&a.0, token).cmp(&edit_distance(&b.0, token))
            })
            .then_with(|| {
                let code_a = zeroed_codes(&a.0);
                let code_b = zeroed_codes(&b.0);
                if starts_uppercase(token) {
                    code_b.cmp(&code_a)
                } else {
                    code_a.cmp(&code_b)
                }
            })
            .then_with(|| md5_hex(&a.0).cmp(&md5_hex(&b.0)))
    }

    /// Keep at most `ocr_truncate_cap` OCR candidates.
    fn truncate_ocr_list(&self, token: &str, sims: CorrectionMap) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = sims.into_iter().collect();
        entries.sort_by(|a, b| self.ocr_order(token, a, b));
        entries.truncate(self.config.ocr_truncate_cap);
        entries
    }

    /// Merge the anagram and OCR candidate sets: words in both multiply
    /// their scores, the rest join with a combined anagram × OCR score.
    fn build_candidates(
        &self,
        token: &str,
        anagrams: CorrectionMap,
        ocr_sims: CorrectionMap,
    ) -> CorrectionMap {
        let mut final_list = anagrams;

        let ocr_list = self.truncate_ocr_list(token, ocr_sims);
        let split_at = if ocr_list.len() > self.config.ocr_split_threshold {
            self.config.ocr_split_threshold
        } else {
            ocr_list.len()
        };
        let (strong, weak) = ocr_list.split_at(split_at);

        for (word, score) in strong.iter() {
            if let Some(existing) = final_list.get_mut(word) {
                *existing *= *score;
            }
        }

        for (word, _) in strong.iter().chain(weak.iter()) {
            if !final_list.contains_key(word) {
                let combined = score_anagram(&self.occurrence, token, word, 1)
                    * score_ocr_key(&self.occurrence, token, word, 0);
                final_list.insert(word.clone(), combined);
            }
        }

        final_list
    }

    /// Re-case every candidate to the best observed spelling for the token's
    /// case mode. Colliding spellings keep the higher score.
    fn correct_case(&self, token: &str, candidates: CorrectionMap) -> Result<CorrectionMap> {
        let mode = case_mode(token);

        let mut out = CorrectionMap::new();
        for (word, score) in candidates {
            let recased = if word.contains(' ') {
                let parts: Vec<String> = word
                    .split(' ')
                    .map(|part| self.find_correct_case(part, mode))
                    .collect::<Result<Vec<_>>>()?;
                parts.join(" ")
            } else {
                self.find_correct_case(&word, mode)?
            };

            match out.get_mut(&recased) {
                Some(existing) => *existing = existing.max(score),
                None => {
                    out.insert(recased, score);
                }
            }
        }
        Ok(out)
    }

    /// Pick the best spelling among the observed case variants of `word`.
    /// Falls back to `word` itself when the case map has never seen it.
    fn find_correct_case(&self, word: &str, mode: i8) -> Result<String> {
        let Some(variants) = self.altcase.variants(&word.to_lowercase()) else {
            return Ok(word.to_string());
        };

        let weighted: Vec<(&String, u64)> = variants
            .iter()
            .map(|v| (v, self.occurrence.get(v).copied().unwrap_or(0)))
            .collect();

        let filtered: Vec<(&String, u64)> = match mode {
            0 => weighted
                .iter()
                .copied()
                .filter(|(v, _)| starts_uppercase(v) && uppercase_count(v) > 2)
                .collect(),
            1 => weighted
                .iter()
                .copied()
                .filter(|(v, _)| starts_uppercase(v) && uppercase_count(v) <= 2)
                .collect(),
            _ => weighted.clone(),
        };
        let pool = if filtered.is_empty() { weighted } else { filtered };

        let max_freq = pool.iter().map(|(_, f)| *f).max().unwrap_or(0);
        let frequent: Vec<&String> = pool
            .iter()
            .filter(|(_, f)| *f == max_freq)
            .map(|(v, _)| *v)
            .collect();
        if frequent.len() == 1 {
            return Ok(frequent[0].clone());
        }

        let min_dist = frequent
            .iter()
            .map(|v| edit_distance(word, v))
            .min()
            .unwrap_or(0);
        let closest: Vec<&String> = frequent
            .into_iter()
            .filter(|v| edit_distance(word, v) == min_dist)
            .collect();
        if closest.len() == 1 {
            return Ok(closest[0].clone());
        }

        // last resort: ASCII comparison with non-letters zeroed; a residual
        // tie violates the data invariant
        let coded: Vec<(&String, Vec<u32>)> =
            closest.iter().map(|v| (*v, zeroed_codes(v))).collect();
        let target = if mode >= 0 {
            coded.iter().map(|(_, c)| c.clone()).min()
        } else {
            coded.iter().map(|(_, c)| c.clone()).max()
        }
        .unwrap_or_default();

        let winners: Vec<&String> = coded
            .into_iter()
            .filter(|(_, c)| *c == target)
            .map(|(v, _)| v)
            .collect();
        if winners.len() != 1 {
            return Err(DenoiseError::UnresolvedTie(winners.len()));
        }
        Ok(winners[0].clone())
    }
}

/// Case mode of a token: 0 = all-caps, 1 = capitalised, −1 = lowercase.
pub fn case_mode(token: &str) -> i8 {
    if starts_uppercase(token) {
        if uppercase_count(token) > 2 {
            0
        } else {
            1
        }
    } else {
        -1
    }
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn uppercase_count(word: &str) -> usize {
    word.chars().filter(|c| c.is_ascii_uppercase()).count()
}

/// Codepoints with everything outside `[a-zA-Z]` zeroed.
fn zeroed_codes(word: &str) -> Vec<u32> {
    word.chars()
        .map(|c| if c.is_ascii_alphabetic() { c as u32 } else { 0 })
        .collect()
}

fn md5_hex(word: &str) -> String {
    format!("{:x}", md5::compute(word.as_bytes()))
}

/// Words holding the minimum edit distance to `ref_word`, input order kept.
pub fn min_edit_distance(ref_word: &str, words: &[String]) -> Vec<String> {
    let Some(min) = words.iter().map(|w| edit_distance(ref_word, w)).min() else {
        return Vec::new();
    };
    words
        .iter()
        .filter(|w| edit_distance(ref_word, w) == min)
        .cloned()
        .collect()
}

/// ASCII-zeroed alphabetical winner; md5 settles what the codes cannot.
/// An md5 collision is a data-invariant violation.
pub fn best_alphabetical(ref_word: &str, words: &[String]) -> Result<String> {
    let coded: Vec<(&String, Vec<u32>)> =
        words.iter().map(|w| (w, zeroed_codes(w))).collect();

    // uppercase-initial reference words prefer the larger code sequence
    let target = if starts_uppercase(ref_word) {
        coded.iter().map(|(_, c)| c.clone()).max()
    } else {
        coded.iter().map(|(_, c)| c.clone()).min()
    }
    .unwrap_or_default();

    let tied: Vec<&String> = coded
        .into_iter()
        .filter(|(_, c)| *c == target)
        .map(|(w, _)| w)
        .collect();

    if tied.len() == 1 {
        return Ok(tied[0].clone());
    }
    select_by_hash(&tied)
}

fn select_by_hash(words: &[&String]) -> Result<String> {
    let mut digests: Vec<(String, &String)> =
        words.iter().map(|w| (md5_hex(w), *w)).collect();
    digests.sort();

    let unique: std::collections::BTreeSet<&str> =
        digests.iter().map(|(d, _)| d.as_str()).collect();
    if unique.len() != words.len() {
        return Err(DenoiseError::UnresolvedTie(words.len()));
    }
    Ok(digests[0].1.clone())
}

/// Final per-token choice: a singleton, or two spellings when the evidence
/// does not separate them.
pub fn select_correction(
    word: &str,
    candidates: &CorrectionMap,
    config: &Config,
) -> Result<CorrectionMap> {
    if candidates.len() <= 1 {
        return Ok(candidates.clone());
    }

    let max_val = candidates
        .values()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let top: Vec<String> = candidates
        .iter()
        .filter(|(_, &s)| s == max_val)
        .map(|(w, _)| w.clone())
        .collect();

    if top.len() == 1 {
        let first = top[0].clone();
        if max_val > config.selection_confidence {
            return Ok(singleton(first, max_val));
        }

        // threshold not reached: look for a runner-up
        let rest: CorrectionMap = candidates
            .iter()
            .filter(|(w, _)| **w != first)
            .map(|(w, &s)| (w.clone(), s))
            .collect();
        let second_val = rest.values().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let tied: Vec<String> = rest
            .iter()
            .filter(|(_, &s)| s == second_val)
            .map(|(w, _)| w.clone())
            .collect();

        let second = if tied.len() == 1 {
            tied[0].clone()
        } else {
            let closest = min_edit_distance(word, &tied);
            if closest.len() == 1 {
                closest[0].clone()
            } else {
                best_alphabetical(word, &closest)?
            }
        };

        if (max_val / second_val).ln() >= config.selection_log_ratio {
            return Ok(singleton(first, max_val));
        }
        let mut out = singleton(first, max_val);
        out.insert(second, second_val);
        return Ok(out);
    }

    if top.len() == 2 {
        let mut out = singleton(top[0].clone(), max_val);
        out.insert(top[1].clone(), max_val);
        return Ok(out);
    }

    // more than two spellings share the maximum
    let closest = min_edit_distance(word, &top);
    match closest.len() {
        1 => {
            let first = closest[0].clone();
            let remainder: Vec<String> =
                top.into_iter().filter(|w| *w != first).collect();
            let next_closest = min_edit_distance(word, &remainder);
            let second = if next_closest.len() == 1 {
                next_closest[0].clone()
            } else {
                best_alphabetical(word, &next_closest)?
            };
            let mut out = singleton(first, max_val);
            out.insert(second, max_val);
            Ok(out)
        }
        2 => {
            let mut out = singleton(closest[0].clone(), max_val);
            out.insert(closest[1].clone(), max_val);
            Ok(out)
        }
        _ => {
            let first = best_alphabetical(word, &closest)?;
            let remainder: Vec<String> =
                closest.into_iter().filter(|w| *w != first).collect();
            let second = best_alphabetical(word, &remainder)?;
            let mut out = singleton(first, max_val);
            out.insert(second, max_val);
            Ok(out)
        }
    }
}

/// Reduce a still-ambiguous map to its single best spelling.
pub fn final_downselect(word: &str, candidates: &CorrectionMap) -> Result<CorrectionMap> {
    if candidates.len() <= 1 {
        return Ok(candidates.clone());
    }

    let max_val = candidates
        .values()
        .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let mut best: Vec<String> = candidates
        .iter()
        .filter(|(_, &s)| s == max_val)
        .map(|(w, _)| w.clone())
        .collect();

    if best.len() != 1 {
        best = min_edit_distance(word, &best);
    }
    let winner = if best.len() == 1 {
        best[0].clone()
    } else {
        best_alphabetical(word, &best)?
    };

    let score = candidates[&winner];
    Ok(singleton(winner, score))
}

/// Multiply every candidate of every multi-candidate token by its bigram
/// boost. Adjacent pools are snapshotted before any score moves, and never
/// cross paragraph boundaries.
pub fn apply_bigram_boost(paragraph: &mut Paragraph, occurrence: &Counter) {
    let positions: Vec<(usize, usize)> = paragraph
        .lines
        .iter()
        .enumerate()
        .flat_map(|(li, line)| (0..line.tokens.len()).map(move |ti| (li, ti)))
        .collect();

    let pools: Vec<Vec<String>> = positions
        .iter()
        .map(|&(li, ti)| adjacency_pool(&paragraph.lines[li].tokens[ti]))
        .collect();

    for (flat, &(li, ti)) in positions.iter().enumerate() {
        let previous: &[String] = if flat > 0 { &pools[flat - 1] } else { &[] };
        let next: &[String] = pools.get(flat + 1).map(|p| p.as_slice()).unwrap_or(&[]);

        let token = &mut paragraph.lines[li].tokens[ti];
        let Some(map) = token.corrections.as_mut() else {
            continue;
        };
        if map.len() < 2 {
            continue;
        }

        for (word, score) in map.iter_mut() {
            *score *= score_bigram(&word.to_lowercase(), previous, next, occurrence);
        }
    }
}

/// Adjacent-word pool: top five corrections, else the cleaned form, else the
/// original surface — all lowercased.
fn adjacency_pool(token: &Token) -> Vec<String> {
    match &token.corrections {
        Some(map) if !map.is_empty() => {
            let mut entries: Vec<(&String, f64)> =
                map.iter().map(|(w, &s)| (w, s)).collect();
            entries.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.0.cmp(b.0))
            });
            entries
                .into_iter()
                .take(5)
                .map(|(w, _)| w.to_lowercase())
                .collect()
        }
        _ => match &token.cleaned {
            Some(cleaned) => vec![cleaned.to_lowercase()],
            None => vec![token.original.to_lowercase()],
        },
    }
}

fn singleton(word: String, score: f64) -> CorrectionMap {
    let mut map = CorrectionMap::new();
    map.insert(word, score);
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::Line;
    use std::collections::BTreeSet;

    struct Fixture {
        occurrence: Counter,
        altcase: AltCaseMap,
        ocrkeys: OcrKeyMap,
        anagrams: AnagramMap,
        dictionary: Dictionary,
        config: Config,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                occurrence: Counter::new(),
                altcase: AltCaseMap::new(),
                ocrkeys: OcrKeyMap::new(),
                anagrams: AnagramMap::new(),
                dictionary: Dictionary::new(),
                config: Config::default(),
            }
        }

        fn context(&self) -> CorrectionContext<'_> {
            CorrectionContext::new(
                self.occurrence.clone(),
                &self.altcase,
                &self.ocrkeys,
                &self.anagrams,
                &self.dictionary,
                &self.config,
            )
        }
    }

    fn dict(words: &[&str]) -> Dictionary {
        let set: BTreeSet<String> = words.iter().map(|s| s.to_string()).collect();
        Dictionary::rebuild(&set).unwrap()
    }

    #[test]
    fn dictionary_hit_short_circuits() {
        let mut fx = Fixture::new();
        fx.dictionary = dict(&["hello", "world"]);
        let ctx = fx.context();

        let map = ctx.correct_token("hello").unwrap().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["hello"], 1.0);
    }

    #[test]
    fn short_tokens_short_circuit() {
        let fx = Fixture::new();
        let ctx = fx.context();
        let map = ctx.correct_token("ab").unwrap().unwrap();
        assert_eq!(map["ab"], 1.0);
    }

    #[test]
    fn ocr_key_digit_confusion_is_resolved() {
        // seeded scenario: "b00k" → "book" via shape o3i1
        let mut fx = Fixture::new();
        fx.dictionary = dict(&["book"]);
        fx.occurrence.insert("book".to_string(), 10);
        fx.ocrkeys.extend(["book"]);
        let ctx = fx.context();

        let map = ctx.correct_token("b00k").unwrap().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["book"], 1.0);
    }

    #[test]
    fn anagram_transposition_is_resolved() {
        // seeded scenario: "litsen" → "listen", identical anagram hash
        let mut fx = Fixture::new();
        fx.occurrence.insert("listen".to_string(), 5);
        fx.anagrams.alphabet.insert(0);
        fx.anagrams
            .hashmap
            .entry(anagram_hash("listen"))
            .or_default()
            .insert("listen".to_string());
        let ctx = fx.context();

        let map = ctx.correct_token("litsen").unwrap().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["listen"], 1.0);
    }

    #[test]
    fn case_restoration_picks_capitalised_variant() {
        // seeded scenario: candidates {"apple": 0.8}, token "Apple", mode 1
        let mut fx = Fixture::new();
        fx.occurrence.insert("apple".to_string(), 14);
        let variants: BTreeSet<String> = ["Apple", "APPLE", "apple"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        fx.altcase.full.insert("apple".to_string(), variants);
        let ctx = fx.context();

        let mut candidates = CorrectionMap::new();
        candidates.insert("apple".to_string(), 0.8);
        let cased = ctx.correct_case("Apple", candidates).unwrap();
        assert_eq!(cased.len(), 1);
        assert_eq!(cased["Apple"], 0.8);
    }

    #[test]
    fn case_mode_classification() {
        assert_eq!(case_mode("word"), -1);
        assert_eq!(case_mode("Word"), 1);
        assert_eq!(case_mode("WORD"), 0);
        assert_eq!(case_mode("WOrd"), 1);
    }

    #[test]
    fn unknown_case_variant_keeps_surface() {
        let fx = Fixture::new();
        let ctx = fx.context();
        let mut candidates = CorrectionMap::new();
        candidates.insert("ghost".to_string(), 0.5);
        let cased = ctx.correct_case("ghost", candidates).unwrap();
        assert_eq!(cased["ghost"], 0.5);
    }

    #[test]
    fn residual_case_tie_is_an_invariant_violation() {
        let mut fx = Fixture::new();
        // two casings with equal (zero) frequency, both distance 1 from the
        // candidate, and identical zeroed codes ("won't" / "won-t" differ
        // only in a non-letter)
        let variants: BTreeSet<String> = ["won't", "won-t"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        fx.altcase.full.insert("wonxt".to_string(), variants);
        let ctx = fx.context();

        let mut candidates = CorrectionMap::new();
        candidates.insert("wonxt".to_string(), 0.9);
        assert!(matches!(
            ctx.correct_case("wonxt", candidates),
            Err(DenoiseError::UnresolvedTie(_))
        ));
    }

    #[test]
    fn log_ratio_cutoff_keeps_single_winner() {
        // seeded scenario: {"foo": 0.5, "bar": 0.1}, ln(5) ≥ 1
        let mut map = CorrectionMap::new();
        map.insert("foo".to_string(), 0.5);
        map.insert("bar".to_string(), 0.1);
        let config = Config::default();

        let chosen = select_correction("foo", &map, &config).unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen["foo"], 0.5);
    }

    #[test]
    fn close_scores_keep_both_candidates() {
        // ln(0.5/0.3) ≈ 0.51 < 1: runner-up survives
        let mut map = CorrectionMap::new();
        map.insert("foo".to_string(), 0.5);
        map.insert("bar".to_string(), 0.3);
        let config = Config::default();

        let chosen = select_correction("foo", &map, &config).unwrap();
        assert_eq!(chosen.len(), 2);
        assert_eq!(chosen["bar"], 0.3);
    }

    #[test]
    fn confident_winner_skips_runner_up_search() {
        let mut map = CorrectionMap::new();
        map.insert("foo".to_string(), 0.9);
        map.insert("bar".to_string(), 0.1);
        let config = Config::default();

        let chosen = select_correction("foo", &map, &config).unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen["foo"], 0.9);
    }

    #[test]
    fn tied_maximum_pair_is_returned_whole() {
        let mut map = CorrectionMap::new();
        map.insert("aa".to_string(), 0.4);
        map.insert("bb".to_string(), 0.4);
        map.insert("cc".to_string(), 0.2);
        let config = Config::default();

        let chosen = select_correction("ab", &map, &config).unwrap();
        assert_eq!(chosen.len(), 2);
        assert!(chosen.contains_key("aa"));
        assert!(chosen.contains_key("bb"));
    }

    #[test]
    fn many_way_tie_resolves_by_edit_distance() {
        let mut map = CorrectionMap::new();
        map.insert("cart".to_string(), 0.3);
        map.insert("card".to_string(), 0.3);
        map.insert("chars".to_string(), 0.3);
        let config = Config::default();

        // "cart" and "card" are distance 1 from "carx", "chars" is 2
        let chosen = select_correction("carx", &map, &config).unwrap();
        assert_eq!(chosen.len(), 2);
        assert!(chosen.contains_key("cart"));
        assert!(chosen.contains_key("card"));
    }

    #[test]
    fn min_edit_distance_keeps_all_holders() {
        let words = vec!["cat".to_string(), "cot".to_string(), "dog".to_string()];
        assert_eq!(min_edit_distance("cut", &words), vec!["cat", "cot"]);
    }

    #[test]
    fn best_alphabetical_prefers_zeroed_minimum() {
        let words = vec!["beta".to_string(), "alpha".to_string()];
        assert_eq!(best_alphabetical("word", &words).unwrap(), "alpha");
        // uppercase-initial reference flips the direction
        assert_eq!(best_alphabetical("Word", &words).unwrap(), "beta");
    }

    #[test]
    fn final_downselect_is_singleton() {
        let mut map = CorrectionMap::new();
        map.insert("near".to_string(), 0.4);
        map.insert("gear".to_string(), 0.4);
        let chosen = final_downselect("nea", &map).unwrap();
        assert_eq!(chosen.len(), 1);
        assert!(chosen.contains_key("near"));
    }

    #[test]
    fn bigram_boost_scales_multi_candidate_tokens() {
        let mut occurrence = Counter::new();
        occurrence.insert("the cat".to_string(), 18);

        let mut line = Line::new("the cxt");
        let mut map = CorrectionMap::new();
        map.insert("cat".to_string(), 0.6);
        map.insert("cot".to_string(), 0.4);
        line.tokens[1].corrections = Some(map);

        let mut paragraph = Paragraph { lines: vec![line] };
        apply_bigram_boost(&mut paragraph, &occurrence);

        let boosted = paragraph.lines[0].tokens[1].corrections.as_ref().unwrap();
        // "the cat" occurs 18 times → boost ln(18); "cot" only gets the floor
        assert!((boosted["cat"] - 0.6 * 18f64.ln()).abs() < 1e-9);
        assert!((boosted["cot"] - 0.4 * 2f64.ln()).abs() < 1e-9);
    }

    #[test]
    fn bigram_boost_leaves_singletons_alone() {
        let mut line = Line::new("hello there");
        let mut map = CorrectionMap::new();
        map.insert("hello".to_string(), 1.0);
        line.tokens[0].corrections = Some(map);

        let mut paragraph = Paragraph { lines: vec![line] };
        apply_bigram_boost(&mut paragraph, &Counter::new());

        let map = paragraph.lines[0].tokens[0].corrections.as_ref().unwrap();
        assert_eq!(map["hello"], 1.0);
    }
}
