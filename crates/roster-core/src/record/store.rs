//! In-memory record container owned by the manager.
//!
//! Keyed by record id in a `BTreeMap`, so listing is always in ascending id order.
//! Field rules live in `RecordDraft`; the store only re-applies them to entries handed
//! over at load time.

use super::{Record, RecordDraft};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: BTreeMap<String, Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a loaded mapping, re-keying any entry whose key disagrees
    /// with its record id.
    pub fn from_map(map: BTreeMap<String, Record>) -> Self {
        let mut store = Self::new();
        store.replace_all(map);
        store
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// All records in ascending id order.
    pub fn all(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Inserts or replaces the record under its own id. Returns the previous record.
    pub fn insert(&mut self, record: Record) -> Option<Record> {
        let id = record.id.clone();
        let prev = self.records.insert(id.clone(), record);
        let action = if prev.is_some() { "UPDATE" } else { "INSERT" };
        tracing::info!(target: "roster::store", id = %id, action, "record '{}' stored", id);
        prev
    }

    /// Removes the record with `id`. Returns it if present.
    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let prev = self.records.remove(id);
        if prev.is_some() {
            tracing::info!(
                target: "roster::store",
                id = %id,
                action = "REMOVE",
                "record '{}' removed",
                id
            );
        }
        prev
    }

    /// Replaces the whole content. Only used when loading from storage. Entries that
    /// fail the field rules are skipped with a warning.
    pub fn replace_all(&mut self, map: BTreeMap<String, Record>) {
        self.records.clear();
        for (key, record) in map {
            let record = match RecordDraft::from(&record).validate() {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        target: "roster::store",
                        key = %key,
                        error = %e,
                        "skipping stored record that fails validation"
                    );
                    continue;
                }
            };
            if key != record.id {
                tracing::warn!(
                    target: "roster::store",
                    key = %key,
                    id = %record.id,
                    "stored key does not match record id; keying by record id"
                );
            }
            self.records.insert(record.id.clone(), record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrowed view of the whole mapping, handed to storage on save.
    pub fn as_map(&self) -> &BTreeMap<String, Record> {
        &self.records
    }
}
