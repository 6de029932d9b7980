//! Persistence collaborator interface
//!
//! The hosted backend is reached only through [`ProfileStore`]. Transport,
//! auth and retries inside a single call are the implementation's business.

use crate::error::{FeedError, StoreError, WriteError};
use crate::types::{ChangeEvent, EntityId};
use async_trait::async_trait;
use cradle_record::ProfileRecord;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Stream of whole-record change events for one entity
///
/// Dropping the stream unsubscribes.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, FeedError>>;

/// Backend access for profile rows
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Read the current row
    async fn fetch(&self, entity_id: &EntityId) -> Result<ProfileRecord, StoreError>;

    /// Replace the given top-level keys of the row
    async fn update(
        &self,
        entity_id: &EntityId,
        partial: &Map<String, Value>,
    ) -> Result<(), WriteError>;

    /// Open a row-level change subscription
    async fn subscribe(&self, entity_id: &EntityId) -> Result<ChangeStream, FeedError>;
}

#[async_trait]
impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    async fn fetch(&self, entity_id: &EntityId) -> Result<ProfileRecord, StoreError> {
        (**self).fetch(entity_id).await
    }

    async fn update(
        &self,
        entity_id: &EntityId,
        partial: &Map<String, Value>,
    ) -> Result<(), WriteError> {
        (**self).update(entity_id, partial).await
    }

    async fn subscribe(&self, entity_id: &EntityId) -> Result<ChangeStream, FeedError> {
        (**self).subscribe(entity_id).await
    }
}
