//! Raw profile records
//!
//! A [`ProfileRecord`] is one person row as the backend stores it: a loose
//! JSON object whose shape depends on which intake channel created it.
//! Nothing here is guaranteed present, so every accessor returns `Option`.

use crate::path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Raw person record
///
/// # Invariants
/// - Always a JSON object at the top level
/// - Never mutated in place by this workspace; updates produce a new record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileRecord(Map<String, Value>);

impl ProfileRecord {
    /// Create an empty record
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from an arbitrary JSON value
    ///
    /// # Errors
    /// Returns [`RecordError::NotAnObject`] unless `value` is a JSON object
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RecordError::NotAnObject(json_kind(&other))),
        }
    }

    /// Parse a record from JSON text
    ///
    /// # Errors
    /// Returns error if the text is not valid JSON or not an object
    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Top-level value
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Read a nested value
    ///
    /// A missing or non-container intermediate short-circuits to `None`.
    /// Numeric segments index into arrays (`documents.0.url`).
    #[must_use]
    pub fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.iter();
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Nested object under a top-level key, if that key holds an object
    #[inline]
    #[must_use]
    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Return a new record with the given top-level keys replaced
    #[must_use]
    pub fn with_fields(&self, fields: &Map<String, Value>) -> Self {
        let mut next = self.0.clone();
        for (key, value) in fields {
            next.insert(key.clone(), value.clone());
        }
        Self(next)
    }

    /// Declared role, if recognizable
    #[must_use]
    pub fn profile_type(&self) -> Option<ProfileType> {
        self.get("role")
            .and_then(Value::as_str)
            .and_then(|role| role.parse().ok())
    }

    /// Uploaded documents, skipping malformed entries
    #[must_use]
    pub fn documents(&self) -> Vec<FileRecord> {
        self.get("documents")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Borrow the underlying map
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying map
    #[inline]
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Number of top-level keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the record has no keys
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ProfileRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ProfileRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Which kind of person a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    /// Intended parent(s)
    Parent,
    /// Gestational surrogate
    Surrogate,
}

impl ProfileType {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Parent => "parent",
            ProfileType::Surrogate => "surrogate",
        }
    }
}

impl Display for ProfileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parent" | "parents" | "intended_parent" | "intended-parent" => Ok(Self::Parent),
            "surrogate" => Ok(Self::Surrogate),
            _ => Err(RecordError::UnknownProfileType(s.to_string())),
        }
    }
}

/// Uploaded document entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Display name
    pub name: String,
    /// Storage URL
    #[serde(default)]
    pub url: Option<String>,
    /// Document category (`"medical"`, `"id"`, ...)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Upload timestamp as stored
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// Errors related to profile records
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Top-level JSON was not an object
    #[error("profile record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Malformed JSON text
    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Unrecognized profile type name
    #[error("unknown profile type: {0}")]
    UnknownProfileType(String),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
