//! Inline model: owns the correction indices, trains them from documents and
//! runs the per-token correction pass.
//!
//! Training appends a document to the counters and rebuilds every derived
//! structure; each artefact is persisted after an update. Correction treats
//! the indices as read-only: a correction pass never mutates the model.

use crate::altcase::AltCaseMap;
use crate::anagram::AnagramMap;
use crate::candidates::{
    apply_bigram_boost, final_downselect, select_correction, CorrectionContext,
};
use crate::dictionary::Dictionary;
use crate::document::Document;
use crate::error::Result;
use crate::ngram::{Bigrams, Counter, Unigrams};
use crate::ocrkey::OcrKeyMap;
use crate::store::{keys, ModelStore};
use crate::Config;
use std::collections::BTreeSet;
use tracing::{debug, info};

pub struct InlineModel {
    pub unigrams: Unigrams,
    pub bigrams: Bigrams,
    pub altcase: AltCaseMap,
    pub ocrkeys: OcrKeyMap,
    pub anagrams: AnagramMap,
    pub dictionary: Dictionary,
    /// Checksums of documents already folded into the indices.
    ingested: BTreeSet<String>,
    config: Config,
}

impl InlineModel {
    pub fn new(config: Config) -> Self {
        Self {
            unigrams: Unigrams::new(),
            bigrams: Bigrams::new(),
            altcase: AltCaseMap::new(),
            ocrkeys: OcrKeyMap::new(),
            anagrams: AnagramMap::new(),
            dictionary: Dictionary::new(),
            ingested: BTreeSet::new(),
            config,
        }
    }

    /// Load every artefact the store holds; missing ones start empty.
    pub fn load_from(store: &ModelStore, config: Config) -> Result<Self> {
        let dictionary = match store.get_bytes(keys::DICTIONARY)? {
            Some(bytes) => Dictionary::from_bytes(bytes)?,
            None => Dictionary::new(),
        };
        Ok(Self {
            unigrams: store.load(keys::UNIGRAMS)?.unwrap_or_default(),
            bigrams: store.load(keys::BIGRAMS)?.unwrap_or_default(),
            altcase: store.load(keys::CASE_MAP)?.unwrap_or_default(),
            ocrkeys: store.load(keys::OCR_KEYS)?.unwrap_or_default(),
            anagrams: store.load(keys::ANAGRAMS)?.unwrap_or_default(),
            dictionary,
            ingested: store.load(keys::HASHES)?.unwrap_or_default(),
            config,
        })
    }

    pub fn persist(&self, store: &ModelStore) -> Result<()> {
        store.save(keys::UNIGRAMS, &self.unigrams)?;
        store.save(keys::BIGRAMS, &self.bigrams)?;
        store.save(keys::CASE_MAP, &self.altcase)?;
        store.save(keys::OCR_KEYS, &self.ocrkeys)?;
        store.save(keys::ANAGRAMS, &self.anagrams)?;
        store.put_bytes(keys::DICTIONARY, self.dictionary.as_bytes())?;
        store.save(keys::HASHES, &self.ingested)?;
        Ok(())
    }

    /// Fold a document into the indices. Returns `false` when the document's
    /// checksum was already ingested and nothing changed.
    pub fn ingest(&mut self, document: &Document, word_list: &BTreeSet<String>) -> Result<bool> {
        if self.ingested.contains(document.checksum()) {
            debug!(doc = %document.name, "already ingested, skipping");
            return Ok(false);
        }
        self.ingested.insert(document.checksum().to_string());

        // candidate unigrams: cleaned tokens of more than one character,
        // taken from lines that are not garbage
        let candidates: Vec<String> = document
            .lines()
            .filter(|line| line.grade() != 0)
            .flat_map(|line| line.tokens.iter())
            .filter_map(|token| token.cleaned.as_ref())
            .filter(|cleaned| cleaned.chars().count() > 1)
            .cloned()
            .collect();

        self.unigrams.record(&candidates);
        self.bigrams.record(&candidates);

        self.altcase.rebuild(&self.unigrams.raw);
        self.unigrams.fold(&self.altcase.full);

        let known: Vec<&str> = self
            .unigrams
            .folded
            .keys()
            .filter(|word| word_list.contains(*word))
            .map(String::as_str)
            .collect();
        self.ocrkeys.extend(known);

        self.unigrams.prune(self.config.unigram_prune_rate);
        self.bigrams.prune(self.config.bigram_prune_rate);
        self.altcase.prune_to(&self.unigrams.folded_pruned);
        self.anagrams
            .rebuild(&self.bigrams.folded_pruned, &self.unigrams.folded_pruned);

        let accepted: BTreeSet<String> = self
            .unigrams
            .folded_pruned
            .keys()
            .filter(|word| word_list.contains(*word))
            .cloned()
            .collect();
        self.dictionary = Dictionary::rebuild(&accepted)?;

        info!(
            doc = %document.name,
            unigrams = self.unigrams.folded.len(),
            dictionary = self.dictionary.len(),
            "inline indices updated"
        );
        Ok(true)
    }

    /// Folded unigram and bigram occurrences summed into one map.
    pub fn occurrence_map(&self) -> Counter {
        let mut occurrence = self.unigrams.folded.clone();
        for (pair, count) in &self.bigrams.folded {
            *occurrence.entry(pair.clone()).or_insert(0) += count;
        }
        occurrence
    }

    /// Read-only correction context over the loaded indices.
    pub fn context(&self) -> CorrectionContext<'_> {
        CorrectionContext::new(
            self.occurrence_map(),
            &self.altcase,
            &self.ocrkeys,
            &self.anagrams,
            &self.dictionary,
            &self.config,
        )
    }

    /// Annotate every token of the document with its resolved correction.
    pub fn correct(&self, document: &mut Document) -> Result<()> {
        let ctx = self.context();

        for paragraph in &mut document.paragraphs {
            // candidate generation and ranking
            for line in &mut paragraph.lines {
                for token in &mut line.tokens {
                    token.corrections = match &token.cleaned {
                        Some(cleaned) => ctx.correct_token(cleaned)?,
                        None => None,
                    };
                }
            }

            // contextual boost, then the final choice
            apply_bigram_boost(paragraph, &ctx.occurrence);

            for line in &mut paragraph.lines {
                for token in &mut line.tokens {
                    let (Some(cleaned), Some(map)) = (&token.cleaned, &token.corrections)
                    else {
                        continue;
                    };
                    let selected = select_correction(cleaned, map, &self.config)?;
                    let resolved = final_downselect(cleaned, &selected)?;
                    token.corrections = Some(resolved);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_list(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn training_doc() -> Document {
        Document::from_paragraphs(
            "train",
            vec![vec![
                "the book is on the table".to_string(),
                "the book was read".to_string(),
            ]],
        )
    }

    #[test]
    fn ingest_builds_all_indices() {
        let mut model = InlineModel::new(Config::default());
        let words = word_list(&["the", "book", "table", "read", "was"]);
        let updated = model.ingest(&training_doc(), &words).unwrap();

        assert!(updated);
        assert_eq!(model.unigrams.raw["the"], 3);
        assert_eq!(model.unigrams.folded["book"], 2);
        assert_eq!(model.bigrams.folded["the book"], 2);
        assert!(model.altcase.full.contains_key("table"));
        assert!(!model.anagrams.hashmap.is_empty());
        assert!(model.dictionary.contains("book"));
    }

    #[test]
    fn reingesting_the_same_document_is_skipped() {
        let mut model = InlineModel::new(Config::default());
        let words = word_list(&["the", "book"]);
        let doc = training_doc();

        assert!(model.ingest(&doc, &words).unwrap());
        let before = model.unigrams.raw.clone();
        assert!(!model.ingest(&doc, &words).unwrap());
        assert_eq!(model.unigrams.raw, before);
    }

    #[test]
    fn garbage_lines_feed_no_unigrams() {
        let mut model = InlineModel::new(Config::default());
        let doc = Document::from_paragraphs(
            "mixed",
            vec![vec!["+++ 123 ###".to_string(), "real words".to_string()]],
        );
        model.ingest(&doc, &word_list(&["real", "words"])).unwrap();
        assert!(model.unigrams.raw.contains_key("real"));
        assert!(!model.unigrams.raw.contains_key("123"));
    }

    #[test]
    fn dictionary_fixed_point() {
        // every cleaned token in the dictionary → document unchanged, all
        // corrections {cleaned: 1.0}
        let mut model = InlineModel::new(Config::default());
        model
            .ingest(&training_doc(), &word_list(&["hello", "world"]))
            .unwrap();
        model.dictionary =
            Dictionary::rebuild(&word_list(&["hello", "world"])).unwrap();

        let mut doc =
            Document::from_paragraphs("in", vec![vec!["hello world".to_string()]]);
        model.correct(&mut doc).unwrap();

        for token in doc.lines().flat_map(|l| l.tokens.iter()) {
            let map = token.corrections.as_ref().unwrap();
            assert_eq!(map.len(), 1);
            assert_eq!(map[token.cleaned.as_ref().unwrap()], 1.0);
        }
        assert_eq!(doc.lines().next().unwrap().clean_line(), "hello world");
    }

    #[test]
    fn untrained_model_leaves_tokens_unannotated() {
        let model = InlineModel::new(Config::default());
        let mut doc =
            Document::from_paragraphs("in", vec![vec!["mystery words".to_string()]]);
        model.correct(&mut doc).unwrap();

        for token in doc.lines().flat_map(|l| l.tokens.iter()) {
            assert!(token.corrections.is_none());
            // grades untouched by the inline pass
        }
        assert_eq!(doc.lines().next().unwrap().grade(), 3);
    }

    #[test]
    fn correction_is_deterministic() {
        let mut model = InlineModel::new(Config::default());
        model
            .ingest(
                &training_doc(),
                &word_list(&["the", "book", "table", "read", "was"]),
            )
            .unwrap();

        let make_doc = || {
            Document::from_paragraphs("in", vec![vec!["the b00k was read".to_string()]])
        };
        let mut a = make_doc();
        let mut b = make_doc();
        model.correct(&mut a).unwrap();
        model.correct(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path().join("models.redb")).unwrap();

        let mut model = InlineModel::new(Config::default());
        model
            .ingest(&training_doc(), &word_list(&["the", "book", "table"]))
            .unwrap();
        model.persist(&store).unwrap();

        let loaded = InlineModel::load_from(&store, Config::default()).unwrap();
        assert_eq!(loaded.unigrams, model.unigrams);
        assert_eq!(loaded.bigrams, model.bigrams);
        assert_eq!(loaded.altcase, model.altcase);
        assert_eq!(loaded.ocrkeys, model.ocrkeys);
        assert_eq!(loaded.anagrams, model.anagrams);
        assert_eq!(loaded.dictionary.words(), model.dictionary.words());
        assert!(loaded.ingested.contains(training_doc().checksum()));
    }
}
