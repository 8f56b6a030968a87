//! Sled-backed storage: one tree, one JSON-encoded entry per record keyed by id.

use super::{RecordMap, RecordStorage};
use crate::error::StorageError;
use crate::record::Record;
use sled::{Batch, Db};
use std::path::{Path, PathBuf};

const TREE_NAME: &str = "students";

pub struct SledStorage {
    db: Db,
    path: PathBuf,
}

impl SledStorage {
    /// Opens or creates the sled database at `path`.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref())?;
        Ok(Self {
            db,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Number of stored entries.
    pub fn count(&self) -> Result<usize, StorageError> {
        Ok(self.db.open_tree(TREE_NAME)?.len())
    }
}

impl RecordStorage for SledStorage {
    fn load(&self) -> Result<RecordMap, StorageError> {
        let tree = self.db.open_tree(TREE_NAME)?;
        let mut out = RecordMap::new();
        for item in tree.iter() {
            let (k, v) = item?;
            let key = String::from_utf8(k.to_vec()).map_err(|e| StorageError::Corrupt {
                key: String::from_utf8_lossy(&k).into_owned(),
                reason: e.to_string(),
            })?;
            let record = Record::from_bytes(&v).map_err(|e| StorageError::Corrupt {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            out.insert(key, record);
        }
        tracing::info!(
            target: "roster::storage",
            path = %self.path.display(),
            count = out.len(),
            "Loaded {} records from sled tree '{}'",
            out.len(),
            TREE_NAME
        );
        Ok(out)
    }

    /// Removes stale keys and writes every record in a single atomic batch.
    fn save(&self, records: &RecordMap) -> Result<(), StorageError> {
        let tree = self.db.open_tree(TREE_NAME)?;
        let mut batch = Batch::default();
        for key in tree.iter().keys() {
            let key = key?;
            let stale = std::str::from_utf8(&key)
                .map(|k| !records.contains_key(k))
                .unwrap_or(true);
            if stale {
                batch.remove(key);
            }
        }
        for (id, record) in records {
            batch.insert(id.as_bytes(), record.to_bytes()?);
        }
        tree.apply_batch(batch)?;
        self.db.flush()?;
        tracing::info!(
            target: "roster::storage",
            path = %self.path.display(),
            count = records.len(),
            "Saved {} records to sled tree '{}'",
            records.len(),
            TREE_NAME
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("sled:{}", self.path.display())
    }
}
