//! Profile session
//!
//! Ties the coordinator and the feed listener to the lifetime of one open
//! profile page: load the record, subscribe, edit, close.

use crate::config::SyncConfig;
use crate::coordinator::{OptimisticCoordinator, PendingWrite};
use crate::error::SyncError;
use crate::feed::{FeedHandle, FeedListener};
use crate::notify::Notifier;
use crate::state::FeedState;
use crate::store::ProfileStore;
use crate::types::{EntityId, Snapshot};
use chrono::{DateTime, Utc};
use cradle_record::{ProfileRecord, ProfileType};
use cradle_view::ProfileView;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// One open profile with live updates
#[derive(Debug)]
pub struct ProfileSession {
    coordinator: OptimisticCoordinator,
    feed: FeedHandle,
}

impl ProfileSession {
    /// Fetch the record and start listening for changes
    ///
    /// Changes committed between the fetch and the subscription are not
    /// replayed; the next change brings the record up to date.
    ///
    /// # Errors
    /// Returns error if the config is invalid or the initial read fails
    pub async fn open(
        store: Arc<dyn ProfileStore>,
        entity_id: EntityId,
        notifier: Arc<dyn Notifier>,
        config: &SyncConfig,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        let record = store.fetch(&entity_id).await?;
        tracing::info!(%entity_id, fields = record.len(), "profile loaded");
        Ok(Self::open_with_record(store, entity_id, record, notifier, config))
    }

    /// Start a session around a record the caller already has
    #[must_use]
    pub fn open_with_record(
        store: Arc<dyn ProfileStore>,
        entity_id: EntityId,
        record: ProfileRecord,
        notifier: Arc<dyn Notifier>,
        config: &SyncConfig,
    ) -> Self {
        let coordinator =
            OptimisticCoordinator::new(entity_id.clone(), record, Arc::clone(&store), notifier)
                .with_rollback(config.rollback_on_write_failure);
        let feed = FeedListener::new(store, entity_id, Arc::new(coordinator.clone()))
            .with_retry(config.retry)
            .spawn();
        Self { coordinator, feed }
    }

    /// Entity this session shows
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        self.coordinator.entity_id()
    }

    /// Optimistically edit one field
    ///
    /// # Errors
    /// Returns [`SyncError::Patch`] if `field` is not a valid patch target,
    /// [`SyncError::NoRuntime`] outside a tokio runtime
    pub fn apply_edit(&self, field: &str, value: Value) -> Result<PendingWrite, SyncError> {
        self.coordinator.apply_edit(field, value)
    }

    /// Current snapshot
    #[must_use]
    pub fn current(&self) -> Snapshot {
        self.coordinator.current()
    }

    /// Current record
    #[must_use]
    pub fn record(&self) -> Arc<ProfileRecord> {
        self.coordinator.record()
    }

    /// Receive every record replacement
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.coordinator.subscribe()
    }

    /// Build the view for the current record
    #[must_use]
    pub fn view(&self, profile_type: ProfileType, now: DateTime<Utc>) -> ProfileView {
        self.coordinator.view(profile_type, now)
    }

    /// Feed lifecycle state
    #[must_use]
    pub fn feed_state(&self) -> FeedState {
        self.feed.state()
    }

    /// Watch feed lifecycle transitions
    #[must_use]
    pub fn feed_state_changes(&self) -> watch::Receiver<FeedState> {
        self.feed.state_changes()
    }

    /// Underlying coordinator
    #[inline]
    #[must_use]
    pub fn coordinator(&self) -> &OptimisticCoordinator {
        &self.coordinator
    }

    /// Stop the feed and stop reporting write outcomes
    ///
    /// Writes already sent still complete on the backend.
    pub fn close(&self) {
        self.feed.close();
        self.coordinator.detach();
        tracing::debug!(entity_id = %self.entity_id(), "profile session closed");
    }

    /// Close and wait for the feed task to stop
    pub async fn shutdown(mut self) {
        self.close();
        self.feed.join().await;
    }
}

impl Drop for ProfileSession {
    fn drop(&mut self) {
        self.feed.close();
        self.coordinator.detach();
    }
}
