//! denoiser-core
//!
//! Deterministic post-OCR text correction: classifies each line of a document
//! as clean, garbage or unclassified, and proposes replacement spellings for
//! tokens from shape-based indices built over a training corpus.
//!
//! Three models run in strict order over a parsed [`Document`]:
//! - [`InlineModel`] — per-token spelling correction (anagram and OCR-key
//!   indices, frequency ranking, contextual bigram boost).
//! - [`IndicatorModel`] — rule-based line grading plus a smoothing pass.
//! - [`LearningModel`] — linear classification of the lines the indicators
//!   left undetermined.
//!
//! Public API:
//! - `Document` / `Paragraph` / `Line` / `Token` - the annotated text model
//! - `Denoiser` - facade wiring the three models over a model store
//! - `ModelStore` - redb-backed persistent key→blob artefact storage
//! - `Config` - tunables and feature thresholds

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{DenoiseError, Result};

pub mod stats;
pub use stats::Statistics;

pub mod tokenizer;

pub mod line;
pub use line::{CorrectionMap, Line, Token};

pub mod document;
pub use document::{Document, Paragraph, ScoreReport};

pub mod hashing;
pub use hashing::{anagram_hash, ocr_key_hash, OcrKey};

pub mod ngram;
pub use ngram::{Bigrams, Unigrams};

pub mod altcase;
pub use altcase::AltCaseMap;

pub mod ocrkey;
pub use ocrkey::OcrKeyMap;

pub mod anagram;
pub use anagram::AnagramMap;

pub mod dictionary;
pub use dictionary::Dictionary;

pub mod store;
pub use store::ModelStore;

pub mod ranking;

pub mod candidates;
pub use candidates::CorrectionContext;

pub mod inline;
pub use inline::InlineModel;

pub mod indicators;
pub use indicators::{Indicator, IndicatorBundle, IndicatorModel};

pub mod features;

pub mod classifier;
pub use classifier::{SgdClassifier, TrainingSet};

pub mod learning;
pub use learning::LearningModel;

pub mod denoiser;
pub use denoiser::Denoiser;

/// Tunables of the correction pipeline.
///
/// Defaults reproduce the reference behaviour; every quantity the pipeline
/// branches on lives here so a caller can tighten or relax the engine without
/// touching code.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Fraction of unigram entries kept by pruning.
    pub unigram_prune_rate: f64,
    /// Fraction of bigram entries kept by pruning.
    pub bigram_prune_rate: f64,
    /// Maximum edit distance for anagram candidates.
    pub anagram_edit_ceiling: usize,
    /// Maximum edit distance for OCR-key candidates.
    pub ocr_edit_ceiling: usize,
    /// OCR-key weight perturbation range (each weight is moved by ±delta).
    pub ocr_weight_delta: i64,
    /// Keep at most this many OCR candidates per token.
    pub ocr_truncate_cap: usize,
    /// OCR candidate lists longer than this are split into strong and weak.
    pub ocr_split_threshold: usize,
    /// A single top candidate above this score wins outright.
    pub selection_confidence: f64,
    /// Log score ratio above which the runner-up is dropped.
    pub selection_log_ratio: f64,
    /// Capacity of the per-pass candidate-map cache.
    pub candidate_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unigram_prune_rate: 0.70,
            bigram_prune_rate: 0.35,
            anagram_edit_ceiling: 3,
            ocr_edit_ceiling: 2,
            ocr_weight_delta: 2,
            ocr_truncate_cap: 10,
            ocr_split_threshold: 5,
            selection_confidence: 0.7,
            selection_log_ratio: 1.0,
            candidate_cache_size: 4096,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. Missing fields keep their
    /// defaults.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content))
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).unwrap_or_default();
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Parse configuration from a TOML string, falling back to defaults on
    /// parse failure.
    pub fn from_toml_str(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }
}
