//! Record manager: CRUD, validation and query filtering over the in-memory store.
//!
//! The manager owns the [`RecordStore`] for the lifetime of the process. It loads the
//! whole mapping from its storage backend when opened and only writes back on
//! [`RecordManager::save`]. Every mutation is validated in full before the store is
//! touched, so a failed call never leaves a partial change behind.

use crate::error::{Result, RosterError};
use crate::query::{QueryAgent, QueryParams};
use crate::record::{Record, RecordDraft, RecordPatch, RecordStore};
use crate::storage::RecordStorage;
use serde::Serialize;
use std::sync::Arc;

/// Result of a natural-language query: the matches plus what the agent understood.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    pub students: Vec<Record>,
    pub query_params: QueryParams,
}

pub struct RecordManager {
    store: RecordStore,
    storage: Arc<dyn RecordStorage>,
    agent: Arc<dyn QueryAgent>,
}

impl RecordManager {
    /// Loads every record from `storage`. A failed load is logged and the manager
    /// starts with an empty store instead.
    pub fn open(storage: Arc<dyn RecordStorage>, agent: Arc<dyn QueryAgent>) -> Self {
        let store = match storage.load() {
            Ok(map) => RecordStore::from_map(map),
            Err(e) => {
                tracing::warn!(
                    target: "roster::manager",
                    storage = %storage.describe(),
                    error = %e,
                    "Data loading failed; starting with an empty roster"
                );
                RecordStore::new()
            }
        };
        tracing::info!(
            target: "roster::manager",
            storage = %storage.describe(),
            agent = agent.name(),
            count = store.len(),
            "Record manager ready"
        );
        Self {
            store,
            storage,
            agent,
        }
    }

    /// Adds a new record. Duplicate ids are rejected before the fields are checked.
    pub fn add(&mut self, draft: RecordDraft) -> Result<Record> {
        if self.store.contains(&draft.id) {
            return Err(RosterError::AlreadyExists(draft.id));
        }
        let record = draft.validate()?;
        self.store.insert(record.clone());
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<&Record> {
        self.store
            .get(id)
            .ok_or_else(|| RosterError::NotFound(id.to_string()))
    }

    /// All records in ascending id order.
    pub fn all(&self) -> Vec<&Record> {
        self.store.all().collect()
    }

    /// Records whose name contains `part`, ignoring case. Empty `part` matches all.
    pub fn find_by_name(&self, part: &str) -> Vec<&Record> {
        self.store.all().filter(|r| r.name_contains(part)).collect()
    }

    /// Replaces every mutable field of `id`. The complete new record is validated
    /// before anything is written.
    pub fn update(
        &mut self,
        id: &str,
        name: impl Into<String>,
        age: i64,
        gender: impl Into<String>,
        major: impl Into<String>,
    ) -> Result<Record> {
        self.commit_update(RecordDraft::new(id, name, age, gender, major))
    }

    /// Merges `patch` onto the current record and updates with the result.
    pub fn patch(&mut self, id: &str, patch: RecordPatch) -> Result<Record> {
        let draft = patch.merge_onto(self.get(id)?);
        self.commit_update(draft)
    }

    fn commit_update(&mut self, draft: RecordDraft) -> Result<Record> {
        if !self.store.contains(&draft.id) {
            return Err(RosterError::NotFound(draft.id));
        }
        let record = draft.validate()?;
        self.store.insert(record.clone());
        Ok(record)
    }

    /// Removes `id` and returns the removed record.
    pub fn delete(&mut self, id: &str) -> Result<Record> {
        self.store
            .remove(id)
            .ok_or_else(|| RosterError::NotFound(id.to_string()))
    }

    /// Narrows the record set by each present parameter, in order:
    /// major, gender, age_min, age_max, name_part.
    pub fn filter(&self, params: &QueryParams) -> Vec<&Record> {
        let mut results: Vec<&Record> = self.store.all().collect();
        if let Some(major) = &params.major {
            results.retain(|r| &r.major == major);
        }
        if let Some(gender) = &params.gender {
            results.retain(|r| r.gender.as_str() == gender);
        }
        if let Some(age_min) = params.age_min {
            results.retain(|r| i64::from(r.age) >= age_min);
        }
        if let Some(age_max) = params.age_max {
            results.retain(|r| i64::from(r.age) <= age_max);
        }
        if let Some(name_part) = &params.name_part {
            results.retain(|r| r.name_contains(name_part));
        }
        results
    }

    /// Asks the query agent for parameters and filters with them. An empty result is
    /// not an error; only an agent failure is.
    pub fn query(&self, text: &str) -> Result<QueryOutcome> {
        let params = self.agent.parse(text)?;
        let students = self.filter(&params).into_iter().cloned().collect::<Vec<_>>();
        tracing::info!(
            target: "roster::manager",
            params = %params,
            matches = students.len(),
            "natural-language query executed"
        );
        Ok(QueryOutcome {
            students,
            query_params: params,
        })
    }

    /// Writes the whole store through the storage backend. In-memory state is left
    /// untouched whether or not the write succeeds.
    pub fn save(&self) -> Result<()> {
        self.storage.save(self.store.as_map()).map_err(|e| {
            tracing::error!(
                target: "roster::manager",
                storage = %self.storage.describe(),
                error = %e,
                "Data saving failed"
            );
            RosterError::from(e)
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn storage_description(&self) -> String {
        self.storage.describe()
    }
}
