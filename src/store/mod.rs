

pub mod memory;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::core::events::{Event, EventKey};

pub use memory::InMemoryEventStore;


pub const MAX_DELETE_BATCH: usize = 25;


#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Read failed: {0}")]
    Read(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Delete batch of {0} keys exceeds limit of {1}")]
    BatchTooLarge(usize, usize),
}


/// Pending events keyed by (project, time), in no guaranteed order. Deleting an
/// absent key is not an error; `delete_batch` takes at most [`MAX_DELETE_BATCH`] keys.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn append(&self, event: &Event) -> Result<(), StoreError>;

    async fn query_all(&self, project_key: &str) -> Result<Vec<Event>, StoreError>;

    async fn delete_batch(&self, keys: &[EventKey]) -> Result<(), StoreError>;
}


#[async_trait]
impl<S: EventStore + ?Sized> EventStore for Arc<S> {
    async fn append(&self, event: &Event) -> Result<(), StoreError> {
        (**self).append(event).await
    }

    async fn query_all(&self, project_key: &str) -> Result<Vec<Event>, StoreError> {
        (**self).query_all(project_key).await
    }

    async fn delete_batch(&self, keys: &[EventKey]) -> Result<(), StoreError> {
        (**self).delete_batch(keys).await
    }
}
