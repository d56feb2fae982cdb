

use std::collections::{BTreeMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use crate::core::events::{Event, EventKey, EventSource};
use crate::llm::models::SummaryDocument;
use crate::llm::summarizer::{ConsolidationError, Summarizer, SummarizerError};
use crate::notify::{ChannelRouter, DeliveryError, Notifier, RichMessage};
use crate::store::{EventStore, InMemoryEventStore, StoreError};
use crate::llm::providers::base::LlmProviderError;

pub const BASE_TS: i64 = 1_700_000_000;


pub fn events(project_key: &str, count: usize) -> Vec<Event> {
    (0..count)
        .map(|i| {
            Event::new(project_key, EventSource::Github, json!({"text": format!("event {i}")}))
                .with_id(format!("{project_key}-{i:03}"))
                .with_occurred_at(BASE_TS + i as i64)
        })
        .collect()
}


pub fn router() -> ChannelRouter {
    let routes: BTreeMap<String, String> = [("apollo", "C-APOLLO"), ("zeus", "C-ZEUS")]
        .into_iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect();
    ChannelRouter::new(routes).unwrap()
}


pub struct RecordingStore {
    pub inner: InMemoryEventStore,
    delete_calls: Mutex<Vec<Vec<EventKey>>>,
    query_calls: Mutex<usize>,
    fail_delete_call: Option<usize>,
    newest_first: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryEventStore::new(),
            delete_calls: Mutex::new(Vec::new()),
            query_calls: Mutex::new(0),
            fail_delete_call: None,
            newest_first: false,
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// 1-based index of the `delete_batch` call that fails.
    pub fn fail_delete_call(mut self, call: usize) -> Self {
        self.fail_delete_call = Some(call);
        self
    }

    pub async fn seed(&self, events: Vec<Event>) -> Vec<Event> {
        for event in &events {
            self.inner.append(event).await.unwrap();
        }
        events
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.lock().len()
    }

    pub fn delete_call_sizes(&self) -> Vec<usize> {
        self.delete_calls.lock().iter().map(Vec::len).collect()
    }

    pub fn deleted_keys(&self) -> Vec<EventKey> {
        self.delete_calls.lock().concat()
    }

    pub fn query_calls(&self) -> usize {
        *self.query_calls.lock()
    }
}

#[async_trait]
impl EventStore for RecordingStore {
    async fn append(&self, event: &Event) -> Result<(), StoreError> {
        self.inner.append(event).await
    }

    async fn query_all(&self, project_key: &str) -> Result<Vec<Event>, StoreError> {
        *self.query_calls.lock() += 1;
        let mut events = self.inner.query_all(project_key).await?;
        if self.newest_first {
            events.reverse();
        }
        Ok(events)
    }

    async fn delete_batch(&self, keys: &[EventKey]) -> Result<(), StoreError> {
        let call = {
            let mut calls = self.delete_calls.lock();
            calls.push(keys.to_vec());
            calls.len()
        };
        if self.fail_delete_call == Some(call) {
            return Err(StoreError::Delete("throttled".to_string()));
        }
        self.inner.delete_batch(keys).await
    }
}


pub struct RecordingNotifier {
    fail: bool,
    deliveries: Mutex<Vec<(String, RichMessage)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            fail: false,
            deliveries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn delivery_count(&self) -> usize {
        self.deliveries.lock().len()
    }

    pub fn deliveries(&self) -> Vec<(String, RichMessage)> {
        self.deliveries.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, channel: &str, message: &RichMessage) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Rejected("channel_not_found".to_string()));
        }
        self.deliveries
            .lock()
            .push((channel.to_string(), message.clone()));
        Ok(())
    }
}


pub struct ScriptedSummarizer {
    chunk_script: Mutex<VecDeque<bool>>,
    fail_consolidation: bool,
    chunk_calls: Mutex<Vec<Vec<String>>>,
    consolidate_calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedSummarizer {
    pub fn new() -> Self {
        Self {
            chunk_script: Mutex::new(VecDeque::new()),
            fail_consolidation: false,
            chunk_calls: Mutex::new(Vec::new()),
            consolidate_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chunk_results(self, results: &[bool]) -> Self {
        *self.chunk_script.lock() = results.iter().copied().collect();
        self
    }

    pub fn failing_consolidation(mut self) -> Self {
        self.fail_consolidation = true;
        self
    }

    pub fn chunk_calls(&self) -> Vec<Vec<String>> {
        self.chunk_calls.lock().clone()
    }

    pub fn consolidate_calls(&self) -> Vec<Vec<String>> {
        self.consolidate_calls.lock().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.chunk_calls.lock().len() + self.consolidate_calls.lock().len()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize_chunk(
        &self,
        events: &[Event],
        project_key: &str,
    ) -> Result<SummaryDocument, SummarizerError> {
        let call = {
            let mut calls = self.chunk_calls.lock();
            calls.push(events.iter().map(|e| e.id.clone()).collect());
            calls.len()
        };

        if self.chunk_script.lock().pop_front() == Some(false) {
            return Err(SummarizerError::Provider(LlmProviderError::Provider(
                "503 from model".to_string(),
            )));
        }

        Ok(SummaryDocument::new(
            format!("{project_key} part {call}"),
            format!("{} events from {}", events.len(), events[0].id),
        ))
    }

    async fn consolidate(
        &self,
        partials: &[String],
        project_key: &str,
    ) -> Result<SummaryDocument, ConsolidationError> {
        self.consolidate_calls.lock().push(partials.to_vec());

        if self.fail_consolidation {
            return Err(ConsolidationError {
                partial_count: partials.len(),
                source: SummarizerError::InvalidResponse("not json".to_string()),
            });
        }

        Ok(SummaryDocument::new(
            format!("{project_key} digest"),
            format!("merged {} parts", partials.len()),
        ))
    }
}
