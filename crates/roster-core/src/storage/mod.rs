//! Persistence port and its backends.
//!
//! | Backend            | Medium                                   |
//! |--------------------|------------------------------------------|
//! | [`JsonFileStorage`] | one JSON document holding the whole map |
//! | [`SledStorage`]     | one sled tree, one entry per record     |
//! | [`MemoryStorage`]   | process memory (tests, dry runs)        |
//!
//! Every backend loads and saves the whole mapping at once.

mod json_file;
mod memory;
mod sled_store;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use sled_store::SledStorage;

use crate::error::StorageError;
use crate::record::Record;
use std::collections::BTreeMap;

/// Full store content as exchanged with a backend: id -> record.
pub type RecordMap = BTreeMap<String, Record>;

/// Read/write contract over the full record mapping.
pub trait RecordStorage: Send + Sync {
    /// Loads every stored record. Returns an empty map when nothing was ever saved;
    /// errors only on genuine I/O or decode failures.
    fn load(&self) -> Result<RecordMap, StorageError>;

    /// Replaces the stored content with `records`. Must leave the previous content
    /// intact if it fails.
    fn save(&self, records: &RecordMap) -> Result<(), StorageError>;

    /// Human-readable location, used in logs and status output.
    fn describe(&self) -> String;
}
