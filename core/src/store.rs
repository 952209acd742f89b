//! Persistent model store: a redb database mapping artefact keys to blobs.
//!
//! Every learned structure is serialized with bincode and written under a
//! well-known key. Writes are checksum-guarded: saving a blob identical to
//! the stored one is a no-op, so repeated training runs do not churn the
//! database file.

use crate::error::Result;
use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store keys of the persisted artefacts.
pub mod keys {
    pub const DICTIONARY: &str = "dictionary";
    pub const UNIGRAMS: &str = "unigrams";
    pub const BIGRAMS: &str = "bigrams";
    pub const CASE_MAP: &str = "case_map";
    pub const OCR_KEYS: &str = "ocr_keys";
    pub const ANAGRAMS: &str = "anagrams";
    pub const TRAINING_SET: &str = "training_set";
    pub const CLASSIFIER: &str = "classifier";
    pub const HASHES: &str = "hashes";
}

pub struct ModelStore {
    db: Database,
    #[allow(dead_code)]
    path: PathBuf,
}

impl ModelStore {
    fn table_def() -> TableDefinition<'static, &'static str, &'static [u8]> {
        TableDefinition::new("artifacts")
    }

    /// Create or open a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(dir) = path.as_ref().parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let db = Database::create(path.as_ref()).map_err(redb::Error::from)?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Write a blob under a key, unless an identical blob is already there.
    pub fn put_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        if let Some(existing) = self.get_bytes(key)? {
            if Sha256::digest(&existing) == Sha256::digest(bytes) {
                debug!(key, "artefact unchanged, skipping write");
                return Ok(());
            }
        }

        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn
                .open_table(Self::table_def())
                .map_err(redb::Error::from)?;
            table.insert(key, bytes).map_err(redb::Error::from)?;
        }
        txn.commit().map_err(redb::Error::from)?;
        debug!(key, len = bytes.len(), "artefact written");
        Ok(())
    }

    pub fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(Self::table_def()) {
            Ok(table) => table,
            // a store that has never been written to has no table yet
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb::Error::from(e).into()),
        };
        match table.get(key).map_err(redb::Error::from)? {
            Some(guard) => Ok(Some(guard.value().to_vec())),
            None => Ok(None),
        }
    }

    /// Serialize and store an artefact.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value)?;
        self.put_bytes(key, &bytes)
    }

    /// Load and deserialize an artefact; `None` when it was never saved.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_bytes(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Keys present in the store, sorted.
    pub fn artefact_keys(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(Self::table_def()) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(redb::Error::from(e).into()),
        };
        let mut out = Vec::new();
        for item in table.iter().map_err(redb::Error::from)? {
            let (key, _) = item.map_err(redb::Error::from)?;
            out.push(key.value().to_string());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngram::Unigrams;

    fn temp_store() -> (tempfile::TempDir, ModelStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ModelStore::open(dir.path().join("models.redb")).expect("open");
        (dir, store)
    }

    #[test]
    fn missing_artefact_loads_as_none() {
        let (_dir, store) = temp_store();
        let loaded: Option<Unigrams> = store.load(keys::UNIGRAMS).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let (_dir, store) = temp_store();

        let mut unigrams = Unigrams::new();
        unigrams.record(&["alpha".to_string(), "alpha".to_string(), "Beta".to_string()]);
        store.save(keys::UNIGRAMS, &unigrams).unwrap();

        let loaded: Unigrams = store.load(keys::UNIGRAMS).unwrap().unwrap();
        assert_eq!(loaded, unigrams);
    }

    #[test]
    fn identical_save_is_a_noop() {
        let (_dir, store) = temp_store();
        store.put_bytes("blob", b"payload").unwrap();
        store.put_bytes("blob", b"payload").unwrap();
        assert_eq!(store.get_bytes("blob").unwrap().unwrap(), b"payload");

        store.put_bytes("blob", b"changed").unwrap();
        assert_eq!(store.get_bytes("blob").unwrap().unwrap(), b"changed");
    }

    #[test]
    fn keys_are_listed_sorted() {
        let (_dir, store) = temp_store();
        store.put_bytes("b", b"1").unwrap();
        store.put_bytes("a", b"2").unwrap();
        assert_eq!(store.artefact_keys().unwrap(), vec!["a", "b"]);
    }
}
