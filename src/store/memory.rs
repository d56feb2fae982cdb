

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{EventStore, MAX_DELETE_BATCH, StoreError};
use crate::core::events::{Event, EventKey};


type ProjectEvents = BTreeMap<(i64, String), Event>;


#[derive(Default)]
pub struct InMemoryEventStore {
    projects: RwLock<HashMap<String, ProjectEvents>>,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projects(&self) -> Vec<String> {
        let projects = self.projects.read();
        let mut keys: Vec<String> = projects
            .iter()
            .filter(|(_, events)| !events.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn pending_count(&self, project_key: &str) -> usize {
        self.projects
            .read()
            .get(project_key)
            .map_or(0, BTreeMap::len)
    }

    pub fn total_pending(&self) -> usize {
        self.projects.read().values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: &Event) -> Result<(), StoreError> {
        let mut projects = self.projects.write();
        projects
            .entry(event.project_key.clone())
            .or_default()
            .insert((event.occurred_at, event.id.clone()), event.clone());

        debug!("Stored event {} for {}", event.id, event.project_key);
        Ok(())
    }

    async fn query_all(&self, project_key: &str) -> Result<Vec<Event>, StoreError> {
        let projects = self.projects.read();
        Ok(projects
            .get(project_key)
            .map(|events| events.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_batch(&self, keys: &[EventKey]) -> Result<(), StoreError> {
        if keys.len() > MAX_DELETE_BATCH {
            return Err(StoreError::BatchTooLarge(keys.len(), MAX_DELETE_BATCH));
        }

        let mut projects = self.projects.write();
        for key in keys {
            if let Some(events) = projects.get_mut(&key.project_key) {
                events.remove(&(key.occurred_at, key.id.clone()));
            }
        }
        projects.retain(|_, events| !events.is_empty());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::EventSource;
    use serde_json::json;

    fn event(project: &str, id: &str, at: i64) -> Event {
        Event::new(project, EventSource::Github, json!({"title": id}))
            .with_id(id)
            .with_occurred_at(at)
    }

    #[tokio::test]
    async fn test_query_all_is_chronological() {
        let store = InMemoryEventStore::new();
        store.append(&event("apollo", "c", 30)).await.unwrap();
        store.append(&event("apollo", "a", 10)).await.unwrap();
        store.append(&event("apollo", "b", 20)).await.unwrap();
        store.append(&event("zeus", "z", 5)).await.unwrap();

        let ids: Vec<_> = store
            .query_all("apollo")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.projects(), vec!["apollo", "zeus"]);
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_noop() {
        let store = InMemoryEventStore::new();
        let kept = event("apollo", "a", 10);
        store.append(&kept).await.unwrap();

        let ghost = event("apollo", "ghost", 99).key();
        store.delete_batch(&[ghost.clone()]).await.unwrap();
        store.delete_batch(&[ghost]).await.unwrap();

        assert_eq!(store.pending_count("apollo"), 1);

        store.delete_batch(&[kept.key()]).await.unwrap();
        assert_eq!(store.pending_count("apollo"), 0);
        assert!(store.projects().is_empty());
    }

    #[tokio::test]
    async fn test_delete_batch_enforces_limit() {
        let store = InMemoryEventStore::new();
        let keys: Vec<_> = (0..26).map(|i| event("apollo", &i.to_string(), i).key()).collect();

        let err = store.delete_batch(&keys).await.unwrap_err();
        assert!(matches!(err, StoreError::BatchTooLarge(26, 25)));
    }
}
