//! Student record model.
//!
//! A [`Record`] is always valid: the only way the manager produces one is through
//! [`RecordDraft::validate`], which applies the five field rules in a fixed order.
//! Drafts carry the raw, unchecked values coming from a user or a request body.

mod store;
mod validation;

pub use store::RecordStore;
pub use validation::ValidationError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowest accepted age (inclusive).
pub const MIN_AGE: i64 = 1;
/// Highest accepted age (inclusive).
pub const MAX_AGE: i64 = 150;

/// Fixed two-value gender enumeration. Parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            other => Err(ValidationError::InvalidGender(other.to_string())),
        }
    }
}

/// A validated student record. `id` is the store key and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub major: String,
}

impl Record {
    /// Serializes to JSON bytes for key/value storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserializes from JSON bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Case-insensitive substring match on `name`. An empty `part` matches everything.
    pub fn name_contains(&self, part: &str) -> bool {
        self.name.to_lowercase().contains(&part.to_lowercase())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}\tName: {}\tAge: {}\tGender: {}\tMajor: {}",
            self.id, self.name, self.age, self.gender, self.major
        )
    }
}

/// Unchecked candidate values for a record, as typed by a user or sent in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub gender: String,
    pub major: String,
}

impl RecordDraft {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        age: i64,
        gender: impl Into<String>,
        major: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
            gender: gender.into(),
            major: major.into(),
        }
    }

    /// Applies the field rules in order (id, name, age, gender, major) and returns the
    /// first violation, or the validated record.
    pub fn validate(self) -> Result<Record, ValidationError> {
        validation::check_id(&self.id)?;
        validation::check_name(&self.name)?;
        let age = validation::check_age(self.age)?;
        let gender = self.gender.parse::<Gender>()?;
        validation::check_major(&self.major)?;
        Ok(Record {
            id: self.id,
            name: self.name,
            age,
            gender,
            major: self.major,
        })
    }
}

impl From<&Record> for RecordDraft {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            age: i64::from(record.age),
            gender: record.gender.as_str().to_string(),
            major: record.major.clone(),
        }
    }
}

/// Partial update: absent fields keep the current record's values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.gender.is_none() && self.major.is_none()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = Some(major.into());
        self
    }

    /// Builds the full candidate for `current`, keeping its id.
    pub fn merge_onto(self, current: &Record) -> RecordDraft {
        let mut draft = RecordDraft::from(current);
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(age) = self.age {
            draft.age = age;
        }
        if let Some(gender) = self.gender {
            draft.gender = gender;
        }
        if let Some(major) = self.major {
            draft.major = major;
        }
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RecordDraft {
        RecordDraft::new("S1", "Alice", 25, "Female", "Finance")
    }

    #[test]
    fn valid_draft_becomes_record() {
        let record = draft().validate().unwrap();
        assert_eq!(record.id, "S1");
        assert_eq!(record.age, 25);
        assert_eq!(record.gender, Gender::Female);
    }

    #[test]
    fn first_violated_rule_is_reported() {
        let bad = RecordDraft::new("S-1", "", 0, "female", "");
        assert_eq!(bad.validate().unwrap_err(), ValidationError::InvalidId);

        let bad = RecordDraft::new("S1", "", 0, "female", "");
        assert_eq!(bad.validate().unwrap_err(), ValidationError::EmptyName);

        let bad = RecordDraft::new("S1", "Bob", 0, "female", "");
        assert_eq!(bad.validate().unwrap_err(), ValidationError::AgeOutOfRange(0));

        let bad = RecordDraft::new("S1", "Bob", 30, "female", "");
        assert_eq!(
            bad.validate().unwrap_err(),
            ValidationError::InvalidGender("female".to_string())
        );

        let bad = RecordDraft::new("S1", "Bob", 30, "Male", "");
        assert_eq!(bad.validate().unwrap_err(), ValidationError::EmptyMajor);
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let mut d = draft();
        d.age = 1;
        assert!(d.clone().validate().is_ok());
        d.age = 150;
        assert!(d.clone().validate().is_ok());
        d.age = 151;
        assert_eq!(d.validate().unwrap_err(), ValidationError::AgeOutOfRange(151));
    }

    #[test]
    fn patch_keeps_unchanged_fields() {
        let current = draft().validate().unwrap();
        let merged = RecordPatch::default().with_age(26).merge_onto(&current);
        assert_eq!(merged, RecordDraft::new("S1", "Alice", 26, "Female", "Finance"));
    }

    #[test]
    fn display_matches_listing_format() {
        let record = draft().validate().unwrap();
        assert_eq!(
            record.to_string(),
            "ID: S1\tName: Alice\tAge: 25\tGender: Female\tMajor: Finance"
        );
    }

    #[test]
    fn name_match_ignores_case() {
        let record = draft().validate().unwrap();
        assert!(record.name_contains("ALI"));
        assert!(record.name_contains(""));
        assert!(!record.name_contains("bob"));
    }
}
