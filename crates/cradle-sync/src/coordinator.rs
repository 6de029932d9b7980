//! Optimistic update coordinator
//!
//! Owns the one in-memory record for an entity. Local edits replace it
//! immediately and are written to the backend in the background; change
//! feed events replace it unconditionally once they arrive.
//!
//! # Ordering
//! Events are applied in delivery order with no deduplication. A feed
//! event always wins over an unconfirmed local edit made before it arrived.

use crate::error::{SyncError, WriteError};
use crate::notify::{Notice, Notifier};
use crate::store::ProfileStore;
use crate::types::{ChangeEvent, EntityId, Snapshot, SnapshotOrigin};
use chrono::{DateTime, Utc};
use cradle_record::{Patch, PatchError, PathError, ProfileRecord, ProfileType};
use cradle_view::{build_profile_view, ProfileView};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Receiver of change feed events
pub trait EventSink: Send + Sync {
    /// Apply one event; called in delivery order
    fn deliver(&self, event: ChangeEvent);
}

/// Background backend write started by an edit
///
/// Dropping it does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    revision: u64,
    task: JoinHandle<Result<(), WriteError>>,
}

impl PendingWrite {
    /// Local revision the optimistic edit produced
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Check if the write has completed
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the backend's answer
    ///
    /// # Errors
    /// Returns the write error, or [`WriteError::Cancelled`] if the task died
    pub async fn outcome(self) -> Result<(), WriteError> {
        self.task.await.unwrap_or(Err(WriteError::Cancelled))
    }
}

struct Inner {
    entity_id: EntityId,
    store: Arc<dyn ProfileStore>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<Snapshot>,
    rollback_on_write_failure: bool,
    detached: AtomicBool,
}

/// Optimistic edits and feed reconciliation for one entity
#[derive(Clone)]
pub struct OptimisticCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for OptimisticCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticCoordinator")
            .field("entity_id", &self.inner.entity_id)
            .field("revision", &self.inner.state.borrow().revision)
            .field("rollback_on_write_failure", &self.inner.rollback_on_write_failure)
            .field("detached", &self.is_detached())
            .finish_non_exhaustive()
    }
}

impl OptimisticCoordinator {
    /// Create coordinator around an already loaded record
    #[must_use]
    pub fn new(
        entity_id: EntityId,
        record: ProfileRecord,
        store: Arc<dyn ProfileStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(Snapshot::initial(record));
        Self {
            inner: Arc::new(Inner {
                entity_id,
                store,
                notifier,
                state,
                rollback_on_write_failure: false,
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// With rollback of failed edits
    ///
    /// Must be called before the coordinator is shared.
    #[must_use]
    pub fn with_rollback(self, enabled: bool) -> Self {
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.rollback_on_write_failure = enabled;
                Self {
                    inner: Arc::new(inner),
                }
            }
            Err(shared) => {
                tracing::warn!(entity_id = %shared.entity_id, "rollback setting ignored: coordinator already shared");
                Self { inner: shared }
            }
        }
    }

    /// Entity this coordinator owns
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.inner.entity_id
    }

    /// Current snapshot
    #[must_use]
    pub fn current(&self) -> Snapshot {
        self.inner.state.borrow().clone()
    }

    /// Current record
    #[must_use]
    pub fn record(&self) -> Arc<ProfileRecord> {
        Arc::clone(&self.inner.state.borrow().record)
    }

    /// Receive every replacement of the local record
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.state.subscribe()
    }

    /// Build the profile view from the current record
    #[must_use]
    pub fn view(&self, profile_type: ProfileType, now: DateTime<Utc>) -> ProfileView {
        build_profile_view(&self.record(), profile_type, now)
    }

    /// Edit one field
    ///
    /// 1. builds a patch against the current record
    /// 2. replaces the local record with the patched one
    /// 3. writes the patch to the backend in the background
    ///
    /// Write failures are reported through the notifier.
    ///
    /// # Errors
    /// Returns [`SyncError::Patch`] if `field` is not a valid patch target
    /// and [`SyncError::NoRuntime`] outside a tokio runtime; nothing is
    /// applied or written in either case.
    pub fn apply_edit(&self, field: &str, value: Value) -> Result<PendingWrite, SyncError> {
        let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;

        // Always overwritten; the closure runs exactly once.
        let mut outcome: Result<(Patch, Arc<ProfileRecord>, u64), PatchError> =
            Err(PathError::Empty.into());
        self.inner.state.send_if_modified(|snapshot| {
            outcome = Patch::build(field, value, &snapshot.record).map(|patch| {
                let previous = Arc::clone(&snapshot.record);
                snapshot.record = Arc::new(patch.apply(&previous));
                snapshot.revision += 1;
                snapshot.origin = SnapshotOrigin::LocalEdit;
                (patch, previous, snapshot.revision)
            });
            outcome.is_ok()
        });
        let (patch, previous, revision) = outcome?;

        tracing::debug!(
            entity_id = %self.inner.entity_id,
            field,
            revision,
            "optimistic edit applied"
        );

        let inner = Arc::clone(&self.inner);
        let field = field.to_string();
        let task = runtime.spawn(async move {
            let result = inner.store.update(&inner.entity_id, patch.payload()).await;
            if let Err(err) = &result {
                inner.on_write_failure(&field, err, previous, revision);
            }
            result
        });

        Ok(PendingWrite { revision, task })
    }

    /// Replace the local record with a feed event's record
    ///
    /// Events for other entities are ignored.
    pub fn apply_change(&self, event: ChangeEvent) {
        if event.entity_id != self.inner.entity_id {
            tracing::debug!(
                entity_id = %self.inner.entity_id,
                other = %event.entity_id,
                "ignoring change event for another entity"
            );
            return;
        }

        let record = Arc::new(event.new_record);
        self.inner.state.send_modify(|snapshot| {
            snapshot.record = record;
            snapshot.revision += 1;
            snapshot.origin = SnapshotOrigin::Remote;
        });
        tracing::trace!(entity_id = %self.inner.entity_id, kind = ?event.kind, "remote record applied");
    }

    /// Stop reporting write outcomes; pending writes still finish server-side
    pub fn detach(&self) {
        self.inner.detached.store(true, Ordering::Release);
    }

    /// Check if the owning view has gone away
    #[inline]
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.inner.detached.load(Ordering::Acquire)
    }
}

impl EventSink for OptimisticCoordinator {
    fn deliver(&self, event: ChangeEvent) {
        self.apply_change(event);
    }
}

impl Inner {
    fn on_write_failure(
        &self,
        field: &str,
        err: &WriteError,
        previous: Arc<ProfileRecord>,
        revision: u64,
    ) {
        if self.detached.load(Ordering::Acquire) {
            tracing::debug!(entity_id = %self.entity_id, field, error = %err, "write failed after detach");
            return;
        }

        tracing::warn!(entity_id = %self.entity_id, field, error = %err, "profile write failed");
        self.notifier.notify(
            Notice::error(format!("Could not save {field}: {err}"))
                .for_entity(&self.entity_id)
                .for_field(field),
        );

        if !self.rollback_on_write_failure {
            return;
        }

        // Only undo if nothing newer replaced the optimistic record.
        let rolled_back = self.state.send_if_modified(|snapshot| {
            if snapshot.revision != revision {
                return false;
            }
            snapshot.record = previous;
            snapshot.revision += 1;
            snapshot.origin = SnapshotOrigin::Rollback;
            true
        });
        tracing::debug!(entity_id = %self.entity_id, field, rolled_back, "rollback evaluated");
    }
}
