//! Testing utilities for Cradle workspace
//!
//! Shared fixtures and an in-memory [`ProfileStore`] with failure injection.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use cradle_record::ProfileRecord;
use cradle_sync::{
    ChangeEvent, ChangeStream, EntityId, FeedError, ProfileStore, StoreError, WriteError,
};
use dashmap::DashMap;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

const FEED_CAPACITY: usize = 64;

/// Clock used by fixtures: 2024-06-01T00:00:00Z
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

pub fn record(value: Value) -> ProfileRecord {
    ProfileRecord::from_value(value).unwrap()
}

/// Parent created through the contact form, with a partly filled questionnaire
pub fn parent_record() -> ProfileRecord {
    record(json!({
        "role": "parent",
        "status": "matching",
        "about": {"bio": "We met in college and love the outdoors."},
        "formData": {
            "firstName": "Jane",
            "lastName": "Doe",
            "city": "Austin",
            "state": "TX",
            "whenToStart": "ASAP"
        },
        "parent1": {"name": "Jane Doe", "age": 38, "occupation": "Engineer"},
        "parent2": {"name": "Sam Doe", "age": 40, "occupation": "Teacher"},
        "form2Data": {
            "fertility": "IVF complete",
            "religion": "Christian",
            "hobbies": "Hiking, Cooking"
        },
        "profileCompleted": true,
        "form2Completed": false
    }))
}

/// Surrogate who applied through the mobile app
pub fn surrogate_record() -> ProfileRecord {
    record(json!({
        "role": "surrogate",
        "status": "active",
        "profileImageUrl": "https://cdn.example/s.jpg",
        "formData": {"firstName": "Maria", "lastName": "Lopez", "city": "Denver", "state": "CO"},
        "form2": {
            "app": {
                "aboutMe": {"bio": "Mom of two who loves hiking."},
                "personal": {"dateOfBirth": "1994-03-15"},
                "background": {"occupation": "Nurse", "educationLevel": "BSN"},
                "lifestyle": {"hobbies": ["Hiking", "Baking"]},
                "medical": {"amh": "Normal"},
                "preferences": {"secondCycle": true}
            }
        },
        "documents": [{"name": "id.pdf", "url": "https://cdn.example/id.pdf", "type": "application/pdf"}],
        "form2Completed": true
    }))
}

/// In-memory backend
///
/// `update` merges top-level keys and broadcasts the whole row to every
/// subscriber of that entity, the way a hosted row-change feed does.
#[derive(Debug)]
pub struct MemoryStore {
    records: DashMap<EntityId, ProfileRecord>,
    feeds: DashMap<EntityId, broadcast::Sender<Result<ChangeEvent, FeedError>>>,
    write_failures: Mutex<VecDeque<WriteError>>,
    subscribe_failures: AtomicUsize,
    writes: Mutex<Vec<(EntityId, Map<String, Value>)>>,
    subscribes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            feeds: DashMap::new(),
            write_failures: Mutex::new(VecDeque::new()),
            subscribe_failures: AtomicUsize::new(0),
            writes: Mutex::new(Vec::new()),
            subscribes: AtomicUsize::new(0),
        }
    }

    /// Store seeded with one row
    pub fn with_record(entity_id: impl Into<EntityId>, record: ProfileRecord) -> Self {
        let store = Self::new();
        store.insert(entity_id, record);
        store
    }

    /// Put a row without notifying subscribers
    pub fn insert(&self, entity_id: impl Into<EntityId>, record: ProfileRecord) {
        self.records.insert(entity_id.into(), record);
    }

    /// Row as the backend currently has it
    pub fn record(&self, entity_id: &EntityId) -> Option<ProfileRecord> {
        self.records.get(entity_id).map(|r| r.value().clone())
    }

    /// Every partial update received, in order
    pub fn writes(&self) -> Vec<(EntityId, Map<String, Value>)> {
        self.writes.lock().clone()
    }

    /// Number of successful subscribe calls
    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    /// Fail the next update with `err`
    pub fn fail_next_write(&self, err: WriteError) {
        self.write_failures.lock().push_back(err);
    }

    /// Fail the next `n` subscribe calls
    pub fn fail_next_subscribes(&self, n: usize) {
        self.subscribe_failures.store(n, Ordering::SeqCst);
    }

    /// Change the row as another user would and broadcast it
    pub fn push_external(&self, entity_id: impl Into<EntityId>, record: ProfileRecord) {
        let entity_id = entity_id.into();
        self.records.insert(entity_id.clone(), record.clone());
        self.broadcast(&entity_id, Ok(ChangeEvent::update(entity_id.clone(), record)));
    }

    /// Send an undecodable notification
    pub fn push_malformed(&self, entity_id: &EntityId) {
        self.broadcast(
            entity_id,
            Err(FeedError::Malformed("payload is not an object".into())),
        );
    }

    /// Drop every open subscription for the entity with an error
    pub fn disconnect(&self, entity_id: &EntityId) {
        self.broadcast(entity_id, Err(FeedError::Disconnected("socket closed".into())));
    }

    /// End every open subscription for the entity normally
    pub fn end_feed(&self, entity_id: &EntityId) {
        self.feeds.remove(entity_id);
    }

    /// Live receivers for the entity
    pub fn subscriber_count(&self, entity_id: &EntityId) -> usize {
        self.feeds
            .get(entity_id)
            .map_or(0, |tx| tx.receiver_count())
    }

    fn broadcast(&self, entity_id: &EntityId, item: Result<ChangeEvent, FeedError>) {
        if let Some(tx) = self.feeds.get(entity_id) {
            // No receivers is fine.
            let _ = tx.send(item);
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch(&self, entity_id: &EntityId) -> Result<ProfileRecord, StoreError> {
        self.record(entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.clone()))
    }

    async fn update(
        &self,
        entity_id: &EntityId,
        partial: &Map<String, Value>,
    ) -> Result<(), WriteError> {
        if let Some(err) = self.write_failures.lock().pop_front() {
            return Err(err);
        }

        let updated = {
            let mut row = self
                .records
                .get_mut(entity_id)
                .ok_or_else(|| WriteError::Rejected(format!("no row {entity_id}")))?;
            let merged = row.with_fields(partial);
            *row = merged.clone();
            merged
        };
        self.writes.lock().push((entity_id.clone(), partial.clone()));
        self.broadcast(entity_id, Ok(ChangeEvent::update(entity_id.clone(), updated)));
        Ok(())
    }

    async fn subscribe(&self, entity_id: &EntityId) -> Result<ChangeStream, FeedError> {
        let failing = self
            .subscribe_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FeedError::SubscribeFailed("channel join timed out".into()));
        }

        let rx = self
            .feeds
            .entry(entity_id.clone())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe();
        self.subscribes.fetch_add(1, Ordering::SeqCst);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(item) => return Some((item, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "test feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_merges_top_level_keys() {
        let id = EntityId::new("p-1");
        let store = MemoryStore::with_record(id.clone(), parent_record());

        let mut partial = Map::new();
        partial.insert("status".into(), json!("matched"));
        store.update(&id, &partial).await.unwrap();

        let row = store.record(&id).unwrap();
        assert_eq!(row.get("status"), Some(&json!("matched")));
        assert!(row.get("formData").is_some());
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_whole_rows() {
        let id = EntityId::new("p-1");
        let store = MemoryStore::with_record(id.clone(), parent_record());
        let mut stream = store.subscribe(&id).await.unwrap();

        let mut partial = Map::new();
        partial.insert("status".into(), json!("matched"));
        store.update(&id, &partial).await.unwrap();

        let event = stream.next().await.unwrap().unwrap();
        assert_eq!(event.new_record.get("status"), Some(&json!("matched")));
        assert!(event.new_record.get("parent1").is_some());
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let id = EntityId::new("p-1");
        let store = MemoryStore::with_record(id.clone(), parent_record());
        store.fail_next_subscribes(1);
        store.fail_next_write(WriteError::Rejected("denied".into()));

        assert!(store.subscribe(&id).await.is_err());
        assert!(store.subscribe(&id).await.is_ok());
        assert!(store.update(&id, &Map::new()).await.is_err());
        assert!(store.update(&id, &Map::new()).await.is_ok());
    }

    #[tokio::test]
    async fn end_feed_closes_streams() {
        let id = EntityId::new("p-1");
        let store = MemoryStore::with_record(id.clone(), parent_record());
        let mut stream = store.subscribe(&id).await.unwrap();

        store.end_feed(&id);
        assert!(stream.next().await.is_none());
    }
}
