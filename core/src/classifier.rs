//! Deterministic linear classifier over line features.
//!
//! A binary logistic regression trained with plain stochastic gradient
//! descent: fixed epoch count, in-order sample visits, L2 regularisation and
//! balanced class reweighting. No randomness anywhere, so a fit over the same
//! training set always lands on the same weights.

use crate::error::{DenoiseError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parallel arrays of feature vectors and labels (0 = garbage, 1 = clean).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<i32>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, features: Vec<f64>, label: i32) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn extend(&mut self, other: TrainingSet) {
        self.features.extend(other.features);
        self.labels.extend(other.labels);
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.features.len() != self.labels.len() {
            return Err(DenoiseError::TrainingSetMismatch {
                features: self.features.len(),
                labels: self.labels.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SgdClassifier {
    weights: Vec<f64>,
    bias: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for SgdClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SgdClassifier {
    pub fn new() -> Self {
        Self {
            weights: Vec::new(),
            bias: 0.0,
            epochs: 50,
            learning_rate: 0.1,
            l2: 1e-4,
        }
    }

    pub fn is_trained(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Fit log-loss weights over the training set. An empty set leaves the
    /// classifier untrained.
    pub fn fit(&mut self, set: &TrainingSet) -> Result<()> {
        set.validate()?;
        if set.is_empty() {
            return Ok(());
        }

        // balanced reweighting: n / (2 · count), so the sparse class pulls
        // as hard as the common one
        let n = set.len() as f64;
        let positives = set.labels.iter().filter(|&&l| l == 1).count() as f64;
        let negatives = n - positives;
        let weight_pos = if positives > 0.0 { n / (2.0 * positives) } else { 0.0 };
        let weight_neg = if negatives > 0.0 { n / (2.0 * negatives) } else { 0.0 };

        let dim = set.features[0].len();
        self.weights = vec![0.0; dim];
        self.bias = 0.0;

        for epoch in 0..self.epochs {
            let eta = self.learning_rate / (1.0 + epoch as f64);

            for (row, &label) in set.features.iter().zip(set.labels.iter()) {
                let target = label as f64;
                let class_weight = if label == 1 { weight_pos } else { weight_neg };

                let p = sigmoid(self.decision(row));
                let error = (p - target) * class_weight;

                for (weight, &x) in self.weights.iter_mut().zip(row.iter()) {
                    *weight -= eta * (error * x + self.l2 * *weight);
                }
                self.bias -= eta * error;
            }
        }

        debug!(samples = set.len(), dim, "classifier fitted");
        Ok(())
    }

    /// Predict a label for one feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<i32> {
        if !self.is_trained() {
            return Err(DenoiseError::MissingClassifier);
        }
        let p = sigmoid(self.decision(features));
        Ok(if p >= 0.5 { 1 } else { 0 })
    }

    fn decision(&self, features: &[f64]) -> f64 {
        let dot: f64 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum();
        dot + self.bias
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
