//! Cradle Sync - live profile synchronization
//!
//! Keeps one in-memory profile record consistent with the backend while an
//! admin views and edits it:
//! - Optimistic single-field edits written in the background
//! - Whole-record replacement from the row-level change feed
//! - Write failures surfaced through a notifier side channel
//! - Feed lifecycle tracked as an explicit state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use cradle_sync::{EntityId, ProfileSession, SyncConfig, TracingNotifier};
//! use std::sync::Arc;
//!
//! # async fn example(store: Arc<dyn cradle_sync::ProfileStore>) -> Result<(), cradle_sync::SyncError> {
//! let session = ProfileSession::open(
//!     store,
//!     EntityId::new("c0ffee"),
//!     Arc::new(TracingNotifier),
//!     &SyncConfig::new(),
//! )
//! .await?;
//!
//! session.apply_edit("about.bio", serde_json::json!("We love hiking"))?;
//! session.shutdown().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod feed;
pub mod notify;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::{RetryPolicy, SyncConfig};
pub use coordinator::{EventSink, OptimisticCoordinator, PendingWrite};
pub use error::{ConfigError, FeedError, StoreError, SyncError, WriteError};
pub use feed::{FeedHandle, FeedListener};
pub use notify::{ChannelNotifier, Notice, Notifier, TracingNotifier};
pub use session::ProfileSession;
pub use state::{allowed_transitions, validate_transition, FeedState};
pub use store::{ChangeStream, ProfileStore};
pub use types::{ChangeEvent, ChangeKind, EntityId, Snapshot, SnapshotOrigin};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Cradle Sync
    pub use crate::{
        ChangeEvent, EntityId, FeedState, Notifier, OptimisticCoordinator, ProfileSession,
        ProfileStore, SyncConfig, SyncError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::store::mock::MockStore;
    use cradle_record::ProfileRecord;
    use futures::StreamExt;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn open_fetches_then_subscribes() {
        let mut store = MockStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_fetch()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ProfileRecord::from_value(json!({"about": {"bio": "hi"}})).unwrap()));
        store
            .expect_subscribe()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(futures::stream::pending::<Result<ChangeEvent, FeedError>>().boxed()));

        let session = ProfileSession::open(
            Arc::new(store),
            EntityId::new("p-1"),
            Arc::new(TracingNotifier),
            &SyncConfig::new(),
        )
        .await
        .unwrap();

        let mut states = session.feed_state_changes();
        states.wait_for(|s| *s == FeedState::Active).await.unwrap();
        assert_eq!(session.current().revision, 0);

        session.shutdown().await;
    }

    #[tokio::test]
    async fn open_surfaces_missing_profile() {
        let mut store = MockStore::new();
        store
            .expect_fetch()
            .returning(|id| Err(StoreError::NotFound(id.clone())));

        let err = ProfileSession::open(
            Arc::new(store),
            EntityId::new("ghost"),
            Arc::new(TracingNotifier),
            &SyncConfig::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::NotFound(_))));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn open_rejects_invalid_config() {
        let store = MockStore::new();
        let mut config = SyncConfig::new();
        config.retry.multiplier = 0;

        let err = ProfileSession::open(
            Arc::new(store),
            EntityId::new("p-1"),
            Arc::new(TracingNotifier),
            &config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SyncError::Config(ConfigError::Invalid(_))));
    }
}
