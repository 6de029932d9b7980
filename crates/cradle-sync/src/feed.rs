//! Change feed listener
//!
//! Subscribes to row-level change notifications for one entity and hands
//! every whole-record event to an [`EventSink`]. The subscription is tied
//! to a [`FeedHandle`]; closing or dropping the handle unsubscribes and no
//! event is delivered afterwards.

use crate::config::RetryPolicy;
use crate::coordinator::EventSink;
use crate::error::FeedError;
use crate::state::{validate_transition, FeedState};
use crate::store::ProfileStore;
use crate::types::{ChangeEvent, EntityId};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Listener configuration for one entity
pub struct FeedListener {
    store: Arc<dyn ProfileStore>,
    entity_id: EntityId,
    sink: Arc<dyn EventSink>,
    retry: RetryPolicy,
}

impl FeedListener {
    /// Create listener with the default retry policy
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>, entity_id: EntityId, sink: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            entity_id,
            sink,
            retry: RetryPolicy::default(),
        }
    }

    /// With retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Start listening on the current tokio runtime
    #[must_use]
    pub fn spawn(self) -> FeedHandle {
        let (changes, _) = watch::channel(FeedState::Idle);
        let shared = Arc::new(Shared {
            entity_id: self.entity_id.clone(),
            state: Mutex::new(FeedState::Idle),
            changes,
        });
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(Arc::clone(&shared), self, shutdown_rx));

        FeedHandle {
            shared,
            shutdown: Mutex::new(Some(shutdown_tx)),
            task: Some(task),
        }
    }
}

/// Live subscription; closes on drop
pub struct FeedHandle {
    shared: Arc<Shared>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    /// Entity being watched
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.shared.entity_id
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> FeedState {
        *self.shared.state.lock()
    }

    /// Watch lifecycle transitions
    #[must_use]
    pub fn state_changes(&self) -> watch::Receiver<FeedState> {
        self.shared.changes.subscribe()
    }

    /// Unsubscribe; idempotent
    ///
    /// Once this returns the sink receives no further events.
    pub fn close(&self) {
        self.shared.transition(FeedState::Closed);
        if let Some(tx) = self.shutdown.lock().take() {
            let _ = tx.send(());
        }
    }

    /// Unsubscribe and wait for the listener task to finish
    pub async fn shutdown(mut self) {
        self.close();
        self.join().await;
    }

    /// Wait for the listener task to finish without closing
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(entity_id = %self.shared.entity_id, error = %err, "feed task ended abnormally");
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for FeedHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedHandle")
            .field("entity_id", &self.shared.entity_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

struct Shared {
    entity_id: EntityId,
    state: Mutex<FeedState>,
    changes: watch::Sender<FeedState>,
}

impl Shared {
    /// Move to `to` if the lifecycle allows it
    fn transition(&self, to: FeedState) -> bool {
        let mut state = self.state.lock();
        let from = *state;
        if from == to {
            return false;
        }
        if let Err(err) = validate_transition(from, to) {
            tracing::trace!(entity_id = %self.entity_id, error = %err, "feed transition skipped");
            return false;
        }
        *state = to;
        self.changes.send_replace(to);
        tracing::debug!(entity_id = %self.entity_id, ?from, ?to, "feed state changed");
        true
    }

    /// Hand an event to the sink unless the feed has been closed
    fn deliver(&self, sink: &dyn EventSink, event: ChangeEvent) {
        // Held across delivery so close() cannot interleave with it.
        let state = self.state.lock();
        if *state != FeedState::Active {
            tracing::trace!(entity_id = %self.entity_id, state = ?*state, "dropping event");
            return;
        }
        sink.deliver(event);
    }

    fn fail(&self, err: &FeedError) {
        tracing::warn!(entity_id = %self.entity_id, error = %err, "change feed error");
        self.transition(FeedState::Error);
    }
}

async fn run(shared: Arc<Shared>, listener: FeedListener, mut shutdown: oneshot::Receiver<()>) {
    tokio::select! {
        _ = &mut shutdown => {
            tracing::debug!(entity_id = %shared.entity_id, "feed shutdown requested");
        }
        () = listen(&shared, &listener) => {}
    }
}

async fn listen(shared: &Shared, listener: &FeedListener) {
    let mut attempt: u32 = 0;

    loop {
        if !shared.transition(FeedState::Subscribing) {
            return;
        }

        match listener.store.subscribe(&listener.entity_id).await {
            Ok(mut stream) => {
                if !shared.transition(FeedState::Active) {
                    return;
                }
                tracing::info!(entity_id = %shared.entity_id, attempt, "change feed active");
                if attempt > 0 {
                    refresh(shared, listener).await;
                }
                attempt = 0;

                let failure = loop {
                    match stream.next().await {
                        Some(Ok(event)) => shared.deliver(listener.sink.as_ref(), event),
                        Some(Err(err)) if !err.is_retryable() => {
                            tracing::warn!(entity_id = %shared.entity_id, error = %err, "skipping change event");
                        }
                        Some(Err(err)) => break err,
                        None => {
                            tracing::info!(entity_id = %shared.entity_id, "change feed ended");
                            shared.transition(FeedState::Closed);
                            return;
                        }
                    }
                };
                shared.fail(&failure);
            }
            Err(err) => shared.fail(&err),
        }

        attempt += 1;
        let Some(delay) = listener.retry.delay_for(attempt) else {
            tracing::warn!(
                entity_id = %shared.entity_id,
                attempts = attempt - 1,
                "giving up on change feed; keeping last known record"
            );
            return;
        };
        tracing::debug!(entity_id = %shared.entity_id, attempt, ?delay, "resubscribing");
        tokio::time::sleep(delay).await;
    }
}

/// Re-read the row after a gap in the feed
///
/// Changes made while the feed was down are never replayed, so the fresh
/// row is handed to the sink as a whole-record replacement.
async fn refresh(shared: &Shared, listener: &FeedListener) {
    match listener.store.fetch(&listener.entity_id).await {
        Ok(record) => {
            tracing::debug!(entity_id = %shared.entity_id, "record refreshed after resubscribe");
            shared.deliver(
                listener.sink.as_ref(),
                ChangeEvent::update(listener.entity_id.clone(), record),
            );
        }
        Err(err) => {
            tracing::warn!(entity_id = %shared.entity_id, error = %err, "cannot refresh record after resubscribe");
        }
    }
}
