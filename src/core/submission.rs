//! Survey submissions and their identifiers
//!
//! A submission is the flat answer map the survey front-end produces: one
//! entry per field key across all steps. Keys shared by several steps (such
//! as `totalStaff`) hold a single answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

use crate::core::role::Role;

/// Key of the step 3 answer carrying the respondent's role
pub const ROLE_KEY: &str = "currentPosition";

/// Key of the step 1 answer carrying the institution name
pub const ORG_NAME_KEY: &str = "orgName";

const ID_PREFIX: &str = "SUB";

/// A unique submission identifier: `SUB-<ulid>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(Ulid);

impl SubmissionId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Get the ULID component
    pub fn ulid(&self) -> Ulid {
        self.0
    }

    /// Parse a SubmissionId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", ID_PREFIX, self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        if prefix != ID_PREFIX {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }

        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self(ulid))
    }
}

impl Serialize for SubmissionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SubmissionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing submission IDs
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("invalid submission prefix: '{0}' (expected SUB)")]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in submission ID: '{0}'")]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    InvalidUlid(String, String),
}

/// One respondent's answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: SubmissionId,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub answers: Map<String, Value>,
}

impl Submission {
    /// Start an empty submission stamped with a new id and the current time
    pub fn new() -> Self {
        Self {
            id: SubmissionId::new(),
            created: Utc::now(),
            answers: Map::new(),
        }
    }

    /// Wrap an existing answer map
    pub fn from_answers(answers: Map<String, Value>) -> Self {
        Self {
            answers,
            ..Self::new()
        }
    }

    /// Build a submission from a parsed document
    ///
    /// Accepts either the full `{id, created, answers}` shape or a bare answer
    /// map as exported by the survey front-end.
    pub fn from_document(doc: Value) -> Option<Self> {
        let Value::Object(map) = doc else {
            return None;
        };

        if map.get("answers").is_some_and(Value::is_object) {
            if let Ok(submission) = serde_json::from_value::<Submission>(Value::Object(map.clone())) {
                return Some(submission);
            }
        }

        Some(Self::from_answers(map))
    }

    /// Record an answer
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.answers.insert(key.into(), value);
    }

    /// Look up an answer
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.answers.get(key)
    }

    /// The respondent's role, derived from `currentPosition`
    pub fn role(&self) -> Role {
        role_of(&self.answers)
    }
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the role from an answer map
pub fn role_of(answers: &Map<String, Value>) -> Role {
    answers
        .get(ROLE_KEY)
        .and_then(Value::as_str)
        .map(Role::from_value)
        .unwrap_or_default()
}
