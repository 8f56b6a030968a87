//! Query agent port: turns free text into a small set of filter parameters.

mod keyword;

pub use keyword::KeywordQueryAgent;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Filter parameters extracted from one query. Absent fields skip their filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Exact match on `major`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    /// Exact match on `gender` ("Male" / "Female").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Inclusive lower age bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_min: Option<i64>,
    /// Inclusive upper age bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_max: Option<i64>,
    /// Case-insensitive substring of `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_part: Option<String>,
}

impl QueryParams {
    pub fn is_empty(&self) -> bool {
        self.major.is_none()
            && self.gender.is_none()
            && self.age_min.is_none()
            && self.age_max.is_none()
            && self.name_part.is_none()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(major) = &self.major {
            parts.push(format!("major: {}", major));
        }
        if let Some(gender) = &self.gender {
            parts.push(format!("gender: {}", gender));
        }
        if let Some(age_min) = self.age_min {
            parts.push(format!("age_min: {}", age_min));
        }
        if let Some(age_max) = self.age_max {
            parts.push(format!("age_max: {}", age_max));
        }
        if let Some(name_part) = &self.name_part {
            parts.push(format!("name_part: {}", name_part));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// The agent could not extract any usable parameter from the text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct QueryParseError(pub String);

/// Converts natural-language text into [`QueryParams`].
pub trait QueryAgent: Send + Sync {
    /// Agent name for logs.
    fn name(&self) -> &str;

    /// Fails when nothing recognizable can be extracted from `text`.
    fn parse(&self, text: &str) -> Result<QueryParams, QueryParseError>;
}
