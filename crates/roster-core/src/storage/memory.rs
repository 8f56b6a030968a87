//! Process-local backend. Nothing survives the process; useful for tests and dry runs.

use super::{RecordMap, RecordStorage};
use crate::error::StorageError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<RecordMap>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with `records`, as if they had been saved earlier.
    pub fn with_records(records: RecordMap) -> Self {
        Self {
            records: Mutex::new(records),
            saves: AtomicUsize::new(0),
        }
    }

    /// Copy of what a subsequent `load` would return.
    pub fn snapshot(&self) -> RecordMap {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

impl RecordStorage for MemoryStorage {
    fn load(&self) -> Result<RecordMap, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, records: &RecordMap) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = records.clone();
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
