//! Core types for Cradle Sync
//!
//! Defines the identifiers, change events and local snapshots the feed
//! listener and coordinator exchange.

use cradle_record::ProfileRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Row id of a person record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wrap a row id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Row-level operation behind a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Whole-record change notification
///
/// Always a full snapshot of the row, never a diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Row the event is about
    pub entity_id: EntityId,
    /// Operation type
    #[serde(rename = "eventType")]
    pub kind: ChangeKind,
    /// Row contents after the change
    pub new_record: ProfileRecord,
}

impl ChangeEvent {
    /// Update event carrying `record`
    #[inline]
    #[must_use]
    pub fn update(entity_id: EntityId, record: ProfileRecord) -> Self {
        Self {
            entity_id,
            kind: ChangeKind::Update,
            new_record: record,
        }
    }
}

/// Why the local record last changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotOrigin {
    /// Loaded on mount
    Initial,
    /// Optimistic local edit
    LocalEdit,
    /// Change feed event
    Remote,
    /// Restored after a failed write
    Rollback,
}

/// One immutable version of the in-memory record
///
/// Replaced wholesale on every change; `revision` increases by one each time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Monotonic local version
    pub revision: u64,
    /// Record contents
    pub record: Arc<ProfileRecord>,
    /// What produced this version
    pub origin: SnapshotOrigin,
}

impl Snapshot {
    /// First snapshot for a freshly loaded record
    #[inline]
    #[must_use]
    pub fn initial(record: ProfileRecord) -> Self {
        Self {
            revision: 0,
            record: Arc::new(record),
            origin: SnapshotOrigin::Initial,
        }
    }
}
