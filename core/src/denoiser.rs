//! Facade wiring the three models over a model store.
//!
//! Training and correction are separate entry points and must not be
//! interleaved: `train` updates the indices and persists every artefact,
//! `cleanse` runs over the loaded snapshot and never writes.

use crate::document::Document;
use crate::error::Result;
use crate::indicators::IndicatorModel;
use crate::inline::InlineModel;
use crate::learning::LearningModel;
use crate::store::ModelStore;
use crate::Config;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

pub struct Denoiser {
    config: Config,
    store: ModelStore,
    inline: InlineModel,
    indicators: IndicatorModel,
    learning: LearningModel,
}

impl Denoiser {
    /// Open (or create) the model store and load whatever artefacts exist.
    pub fn open<P: AsRef<Path>>(store_path: P, config: Config) -> Result<Self> {
        let store = ModelStore::open(store_path)?;
        let inline = InlineModel::load_from(&store, config.clone())?;
        let learning = LearningModel::load_from(&store)?;
        Ok(Self {
            config,
            store,
            inline,
            indicators: IndicatorModel::new(),
            learning,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the inline indices from a set of documents, without touching
    /// the classifier.
    pub fn ingest(
        &mut self,
        documents: &[Document],
        word_list: &BTreeSet<String>,
    ) -> Result<()> {
        for document in documents {
            self.inline.ingest(document, word_list)?;
        }
        self.inline.persist(&self.store)?;
        info!(documents = documents.len(), "inline indices generated");
        Ok(())
    }

    /// Full training run: indices, grading passes, then the classifier.
    pub fn train(
        &mut self,
        documents: &mut [Document],
        word_list: &BTreeSet<String>,
    ) -> Result<()> {
        for document in documents.iter() {
            self.inline.ingest(document, word_list)?;
        }
        self.inline.persist(&self.store)?;

        for document in documents.iter_mut() {
            debug!(doc = %document.name, "grading for training");
            self.inline.correct(document)?;
            self.indicators.correct(document);
            self.learning
                .collect(document, &self.inline.unigrams.folded)?;
        }

        self.learning.fit()?;
        self.learning.persist(&self.store)?;
        info!(documents = documents.len(), "denoiser trained");
        Ok(())
    }

    /// Run the three correction stages over one document, in order.
    pub fn cleanse(&self, document: &mut Document) -> Result<()> {
        debug!(doc = %document.name, "cleansing");
        self.inline.correct(document)?;
        self.indicators.correct(document);
        self.learning
            .classify(document, &self.inline.unigrams.folded)?;
        Ok(())
    }
}
