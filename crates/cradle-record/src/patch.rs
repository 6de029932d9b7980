//! Partial-update patches for profile records
//!
//! Provides [`Patch`] for turning one edited field into the minimal update
//! body the backend accepts.

use crate::path::{FieldPath, PathError};
use crate::record::ProfileRecord;
use serde_json::{Map, Value};

/// Deepest nesting a patch field may have (`top.nested`)
pub const MAX_PATCH_DEPTH: usize = 1;

/// Partial update for one edited field
///
/// # Invariants
/// - `payload` has exactly one key, `field.first()`
/// - For a nested field, the payload object carries every sibling key the
///   record held under that top-level key when the patch was built
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Field the user edited
    field: FieldPath,

    /// Update body, keyed by top-level record key
    payload: Map<String, Value>,
}

impl Patch {
    /// Build a patch for `field_name` against the current record
    ///
    /// - `bio` → `{ "bio": value }`
    /// - `form2Data.fertility` → `{ "form2Data": { ...current.form2Data, "fertility": value } }`
    ///
    /// A missing or non-object container starts from `{}`.
    ///
    /// # Errors
    /// - [`PatchError::Path`] for an empty name or empty segment
    /// - [`PatchError::TooDeep`] for more than one level of nesting
    pub fn build(
        field_name: &str,
        value: Value,
        current: &ProfileRecord,
    ) -> Result<Self, PatchError> {
        let field: FieldPath = field_name.parse()?;
        if field.depth() > MAX_PATCH_DEPTH {
            return Err(PatchError::TooDeep {
                field: field_name.to_string(),
                depth: field.depth(),
            });
        }

        let segments = field.segments();
        let top = segments[0].clone();
        let mut payload = Map::new();

        match segments.get(1) {
            None => {
                payload.insert(top, value);
            }
            Some(nested) => {
                let mut container = current.object(&top).cloned().unwrap_or_default();
                container.insert(nested.clone(), value);
                payload.insert(top, Value::Object(container));
            }
        }

        Ok(Self { field, payload })
    }

    /// Edited field
    #[inline]
    #[must_use]
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    /// Top-level key this patch replaces
    #[inline]
    #[must_use]
    pub fn top_key(&self) -> &str {
        &self.field.segments()[0]
    }

    /// Update body
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Consume into the update body
    #[inline]
    #[must_use]
    pub fn into_payload(self) -> Map<String, Value> {
        self.payload
    }

    /// Apply to a record, producing the optimistic next record
    #[inline]
    #[must_use]
    pub fn apply(&self, record: &ProfileRecord) -> ProfileRecord {
        record.with_fields(&self.payload)
    }
}

/// Build a patch; see [`Patch::build`]
///
/// # Errors
/// Same as [`Patch::build`]
#[inline]
pub fn build_patch(
    field_name: &str,
    value: Value,
    current: &ProfileRecord,
) -> Result<Patch, PatchError> {
    Patch::build(field_name, value, current)
}

/// Errors building patches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Field name could not be parsed
    #[error("invalid field name: {0}")]
    Path(#[from] PathError),

    /// Field nests deeper than `top.nested`
    #[error("field '{field}' nests {depth} levels deep; at most one level is supported")]
    TooDeep { field: String, depth: usize },
}
