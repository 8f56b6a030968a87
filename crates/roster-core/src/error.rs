//! Error kinds surfaced by the record manager and its storage backends.

use crate::query::QueryParseError;
use crate::record::ValidationError;
use thiserror::Error;

/// Every failure the manager can report. None of them is fatal to the process.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Student ID {0} already exists.")]
    AlreadyExists(String),

    #[error("No student found with ID {0}.")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    QueryParse(#[from] QueryParseError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StorageError),
}

impl RosterError {
    /// Short machine-readable kind, used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::QueryParse(_) => "query_parse",
            Self::Persistence(_) => "persistence",
        }
    }
}

/// Failure reading or writing the external medium.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("corrupt entry '{key}': {reason}")]
    Corrupt { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, RosterError>;
