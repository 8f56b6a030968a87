//! roster-core: student roster library (record model, validation, storage backends,
//! keyword query agent and the record manager).
//!
//! Binaries construct a [`RecordManager`] from a [`RecordStorage`] backend and a
//! [`QueryAgent`], then drive it through their own presentation layer.

mod error;
mod manager;
mod query;
mod record;
mod shared;
mod storage;

pub use error::{Result, RosterError, StorageError};

pub use record::{
    Gender, Record, RecordDraft, RecordPatch, RecordStore, ValidationError, MAX_AGE, MIN_AGE,
};

pub use storage::{JsonFileStorage, MemoryStorage, RecordMap, RecordStorage, SledStorage};

pub use query::{KeywordQueryAgent, QueryAgent, QueryParams, QueryParseError};

pub use manager::{QueryOutcome, RecordManager};

pub use shared::{RosterConfig, StorageBackend};
