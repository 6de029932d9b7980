//! Functional tests for the change feed lifecycle.
//!
//! Core guarantees exercised here:
//! - Failed subscriptions are retried according to the retry policy.
//! - A dropped connection resubscribes and keeps delivering.
//! - Changes made while disconnected are re-read after resubscribing.
//! - When retries run out the last known record stays on screen.
//! - Undecodable notifications are skipped without closing the feed.

use cradle_record::FieldPath;
use cradle_sync::{
    EntityId, FeedState, ProfileSession, ProfileStore, RetryPolicy, SnapshotOrigin, SyncConfig,
    TracingNotifier,
};
use cradle_test_utils::{record, surrogate_record, MemoryStore};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn entity() -> EntityId {
    EntityId::new("surrogate-7")
}

async fn open(store: &Arc<MemoryStore>, retry: RetryPolicy) -> ProfileSession {
    let store: Arc<dyn ProfileStore> = store.clone();
    ProfileSession::open(
        store,
        entity(),
        Arc::new(TracingNotifier),
        &SyncConfig::new().with_retry(retry),
    )
    .await
    .unwrap()
}

async fn reach(session: &ProfileSession, state: FeedState) {
    let mut changes = session.feed_state_changes();
    tokio::time::timeout(WAIT, changes.wait_for(|s| *s == state))
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn subscribe_is_retried_until_it_succeeds() {
    let store = Arc::new(MemoryStore::with_record(entity(), surrogate_record()));
    store.fail_next_subscribes(2);

    let session = open(&store, RetryPolicy::immediate(3)).await;
    reach(&session, FeedState::Active).await;
    assert_eq!(store.subscribe_count(), 1);

    session.shutdown().await;
}

/// With retry disabled the feed stays in error and the page keeps the
/// record it loaded.
#[tokio::test]
async fn exhausted_retries_keep_last_record() {
    let store = Arc::new(MemoryStore::with_record(entity(), surrogate_record()));
    store.fail_next_subscribes(1);

    let session = open(&store, RetryPolicy::disabled()).await;
    reach(&session, FeedState::Error).await;

    assert_eq!(session.current().origin, SnapshotOrigin::Initial);
    assert_eq!(*session.record(), surrogate_record());
    assert_eq!(store.subscribe_count(), 0);

    session.shutdown().await;
}

#[tokio::test]
async fn disconnect_resubscribes_and_keeps_delivering() {
    let store = Arc::new(MemoryStore::with_record(entity(), surrogate_record()));
    let session = open(&store, RetryPolicy::immediate(2)).await;
    reach(&session, FeedState::Active).await;

    let mut states = session.feed_state_changes();
    store.disconnect(&entity());
    tokio::time::timeout(WAIT, states.wait_for(|s| *s == FeedState::Error))
        .await
        .unwrap()
        .unwrap();
    reach(&session, FeedState::Active).await;
    assert_eq!(store.subscribe_count(), 2);

    let mut snapshots = session.subscribe();
    store.push_external(entity(), record(json!({"status": "matched"})));
    let snapshot = tokio::time::timeout(
        WAIT,
        snapshots.wait_for(|s| {
            s.record.lookup(&FieldPath::single("status")) == Some(&json!("matched"))
        }),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(snapshot.origin, SnapshotOrigin::Remote);

    session.shutdown().await;
}

/// A change written while the feed was down shows up once it reconnects.
#[tokio::test]
async fn change_during_outage_is_picked_up_on_resubscribe() {
    let store = Arc::new(MemoryStore::with_record(entity(), surrogate_record()));
    let retry = RetryPolicy {
        max_attempts: 3,
        initial_backoff_ms: 100,
        max_backoff_ms: 100,
        multiplier: 1,
    };
    let session = open(&store, retry).await;
    reach(&session, FeedState::Active).await;

    let mut states = session.feed_state_changes();
    store.disconnect(&entity());
    tokio::time::timeout(WAIT, states.wait_for(|s| *s == FeedState::Error))
        .await
        .unwrap()
        .unwrap();

    // No subscriber is listening, so this change is never broadcast.
    assert_eq!(store.subscriber_count(&entity()), 0);
    store.push_external(entity(), record(json!({"status": "matched"})));

    let mut snapshots = session.subscribe();
    let snapshot = tokio::time::timeout(
        WAIT,
        snapshots.wait_for(|s| {
            s.record.lookup(&FieldPath::single("status")) == Some(&json!("matched"))
        }),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert_eq!(snapshot.origin, SnapshotOrigin::Remote);
    assert_eq!(*snapshot.record, store.record(&entity()).unwrap());
    assert_eq!(session.feed_state(), FeedState::Active);
    assert_eq!(store.subscribe_count(), 2);

    session.shutdown().await;
}

#[tokio::test]
async fn malformed_notification_is_skipped() {
    let store = Arc::new(MemoryStore::with_record(entity(), surrogate_record()));
    let session = open(&store, RetryPolicy::disabled()).await;
    reach(&session, FeedState::Active).await;
    let mut snapshots = session.subscribe();

    store.push_malformed(&entity());
    store.push_external(entity(), record(json!({"status": "paused"})));

    tokio::time::timeout(WAIT, snapshots.wait_for(|s| s.origin == SnapshotOrigin::Remote))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.feed_state(), FeedState::Active);
    assert_eq!(session.current().revision, 1);

    session.shutdown().await;
}

/// A feed the backend ends on its own is closed, not retried.
#[tokio::test]
async fn ended_feed_closes() {
    let store = Arc::new(MemoryStore::with_record(entity(), surrogate_record()));
    let session = open(&store, RetryPolicy::immediate(5)).await;
    reach(&session, FeedState::Active).await;

    store.end_feed(&entity());
    reach(&session, FeedState::Closed).await;
    assert_eq!(store.subscribe_count(), 1);

    session.shutdown().await;
}
