//! Field rules for student records. Each check covers exactly one rule; the order in
//! which [`RecordDraft::validate`](super::RecordDraft::validate) calls them is the
//! order in which violations are reported.

use super::{MAX_AGE, MIN_AGE};
use thiserror::Error;

/// A single violated field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ID must be non-empty alphanumeric.")]
    InvalidId,

    #[error("Name cannot be empty.")]
    EmptyName,

    #[error("Age must be an integer between 1-150.")]
    AgeOutOfRange(i64),

    #[error("Gender must be 'Male' or 'Female'.")]
    InvalidGender(String),

    #[error("Major cannot be empty.")]
    EmptyMajor,
}

pub(super) fn check_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || !id.chars().all(char::is_alphanumeric) {
        return Err(ValidationError::InvalidId);
    }
    Ok(())
}

pub(super) fn check_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

pub(super) fn check_age(age: i64) -> Result<u8, ValidationError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange(age));
    }
    u8::try_from(age).map_err(|_| ValidationError::AgeOutOfRange(age))
}

pub(super) fn check_major(major: &str) -> Result<(), ValidationError> {
    if major.is_empty() {
        return Err(ValidationError::EmptyMajor);
    }
    Ok(())
}
