//! Learning model: collects graded lines into a training set and classifies
//! the lines the indicators left undetermined.

use crate::classifier::{SgdClassifier, TrainingSet};
use crate::document::Document;
use crate::error::Result;
use crate::features::extract_features;
use crate::line::CLEAN_GRADE;
use crate::ngram::Counter;
use crate::store::{keys, ModelStore};
use tracing::{debug, info, warn};

pub struct LearningModel {
    pub training_set: TrainingSet,
    pub classifier: SgdClassifier,
}

impl Default for LearningModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningModel {
    pub fn new() -> Self {
        Self {
            training_set: TrainingSet::new(),
            classifier: SgdClassifier::new(),
        }
    }

    pub fn load_from(store: &ModelStore) -> Result<Self> {
        Ok(Self {
            training_set: store.load(keys::TRAINING_SET)?.unwrap_or_default(),
            classifier: store.load(keys::CLASSIFIER)?.unwrap_or_default(),
        })
    }

    pub fn persist(&self, store: &ModelStore) -> Result<()> {
        store.save(keys::TRAINING_SET, &self.training_set)?;
        store.save(keys::CLASSIFIER, &self.classifier)?;
        Ok(())
    }

    /// Append every decisively graded line (0 or 5) of the document to the
    /// training set. Returns how many lines were taken.
    pub fn collect(&mut self, document: &Document, unigrams: &Counter) -> Result<usize> {
        let mut taken = 0usize;
        for line in document.lines() {
            if line.is_undetermined() {
                continue;
            }
            let features = extract_features(line, unigrams, document.stats())?;
            let label = (line.grade() / CLEAN_GRADE) as i32;
            self.training_set.push(features, label);
            taken += 1;
        }
        debug!(doc = %document.name, taken, "training lines collected");
        Ok(taken)
    }

    /// Fit the classifier over everything collected so far.
    pub fn fit(&mut self) -> Result<()> {
        if self.training_set.is_empty() {
            warn!("no graded lines collected, classifier left untrained");
            return Ok(());
        }
        self.classifier.fit(&self.training_set)?;
        info!(samples = self.training_set.len(), "classifier trained");
        Ok(())
    }

    /// Assign a final grade to every undetermined line. Without a trained
    /// classifier the pass is skipped and grades stay untouched.
    pub fn classify(&self, document: &mut Document, unigrams: &Counter) -> Result<()> {
        if !self.classifier.is_trained() {
            debug!("classifier artefact missing, skipping classification");
            return Ok(());
        }

        let doc_stats = document.stats().clone();
        for line in document.lines_mut() {
            if !line.is_undetermined() {
                continue;
            }
            let features = extract_features(line, unigrams, &doc_stats)?;
            let label = self.classifier.predict(&features)?;
            line.set_grade(CLEAN_GRADE * label as u8);
        }
        Ok(())
    }
}
