//! Fixed-key numeric statistics bag.
//!
//! Both documents and lines carry one of these. The key set is declared at
//! construction time and reads/writes outside it are rejected, so a typo in a
//! counter name surfaces as a typed error instead of a silent zero.

use crate::error::{DenoiseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    values: BTreeMap<String, f64>,
}

impl Statistics {
    /// Create a bag with every declared key initialised to zero.
    pub fn new(keys: &[&str]) -> Self {
        Self {
            values: keys.iter().map(|k| (k.to_string(), 0.0)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Result<f64> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| DenoiseError::UnknownStat(key.to_string()))
    }

    pub fn set(&mut self, key: &str, value: f64) -> Result<()> {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DenoiseError::UnknownStat(key.to_string())),
        }
    }

    pub fn add(&mut self, key: &str, delta: f64) -> Result<()> {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot += delta;
                Ok(())
            }
            None => Err(DenoiseError::UnknownStat(key.to_string())),
        }
    }
}
