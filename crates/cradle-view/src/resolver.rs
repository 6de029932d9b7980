//! Field resolution over candidate paths
//!
//! One canonical field can live in many places depending on which intake
//! channel wrote the record. A resolver walks an ordered list of
//! [`Candidate`]s and returns the first present, non-empty rendering.
//!
//! # Absence
//! `null`, missing keys, `""`, whitespace-only strings, objects, and joins
//! that produce nothing are all absent. Resolution never panics.

use crate::derive::join_present;
use cradle_record::{FieldPath, ProfileRecord};
use serde_json::Value;

/// Separator used when a list is rendered without an explicit join
pub const DEFAULT_LIST_SEPARATOR: &str = ", ";

/// How a raw value becomes display text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transform {
    /// Scalars as text, lists joined with `", "`
    #[default]
    Text,
    /// Lists joined with the given separator, scalars as text
    Join(&'static str),
}

impl Transform {
    /// Render a raw value, `None` when the result is absent
    #[must_use]
    pub fn render(self, value: &Value) -> Option<String> {
        match self {
            Transform::Text => render_value(value, DEFAULT_LIST_SEPARATOR),
            Transform::Join(separator) => render_value(value, separator),
        }
    }
}

/// One place a canonical field might live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Read a single path and transform it
    Path {
        /// Location in the record
        path: FieldPath,
        /// Rendering applied to the raw value
        transform: Transform,
    },
    /// Read several paths and join the present ones
    Combine {
        /// Locations, in output order
        parts: Vec<FieldPath>,
        /// Joiner between present parts
        separator: &'static str,
    },
}

impl Candidate {
    /// Plain path candidate
    #[must_use]
    pub fn path(segments: &[&str]) -> Self {
        Self::Path {
            path: FieldPath::of(segments),
            transform: Transform::Text,
        }
    }

    /// Path candidate whose list value is joined with `separator`
    #[must_use]
    pub fn joined(segments: &[&str], separator: &'static str) -> Self {
        Self::Path {
            path: FieldPath::of(segments),
            transform: Transform::Join(separator),
        }
    }

    /// Multi-source candidate joining present parts with `separator`
    #[must_use]
    pub fn combine(parts: &[&[&str]], separator: &'static str) -> Self {
        Self::Combine {
            parts: parts.iter().map(|p| FieldPath::of(p)).collect(),
            separator,
        }
    }

    /// Evaluate this candidate alone
    #[must_use]
    pub fn evaluate(&self, record: &ProfileRecord) -> Option<String> {
        match self {
            Candidate::Path { path, transform } => {
                record.lookup(path).and_then(|value| transform.render(value))
            }
            Candidate::Combine { parts, separator } => {
                let rendered: Vec<Option<String>> = parts
                    .iter()
                    .map(|path| record.lookup(path).and_then(|v| Transform::Text.render(v)))
                    .collect();
                join_present(rendered, separator)
            }
        }
    }
}

/// First present value among `candidates`, in order
#[must_use]
pub fn resolve(record: &ProfileRecord, candidates: &[Candidate]) -> Option<String> {
    candidates.iter().find_map(|candidate| candidate.evaluate(record))
}

/// Render a raw JSON value as display text
///
/// Booleans become `"Yes"`/`"No"`, numbers keep their JSON form, arrays
/// are rendered element-wise with empty elements dropped.
#[must_use]
pub fn render_value(value: &Value, separator: &str) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::Bool(true) => Some("Yes".to_string()),
        Value::Bool(false) => Some("No".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => non_blank(s),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| render_value(item, separator))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(separator))
            }
        }
    }
}

/// Trimmed text, or `None` when nothing is left
#[inline]
#[must_use]
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
