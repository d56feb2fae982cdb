

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::models::{BatchDeleteReport, DeleteBatchResult, FlushAction, FlushOutcome, FlushStats};
use crate::core::error::Result;
use crate::core::events::{Event, EventKey};
use crate::llm::models::SummaryDocument;
use crate::notify::{ChannelRouter, DeliveryError, Notifier, RichMessage};
use crate::store::{EventStore, MAX_DELETE_BATCH};


/// Deliver first, delete after. Nothing is deleted unless delivery succeeded.
pub struct FlushTransaction {
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
    router: Arc<ChannelRouter>,
}

impl FlushTransaction {
    pub fn new(
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
        router: Arc<ChannelRouter>,
    ) -> Self {
        Self {
            store,
            notifier,
            router,
        }
    }

    pub async fn commit(
        &self,
        project_key: &str,
        summary: &SummaryDocument,
        original_events: &[Event],
        stats: FlushStats,
    ) -> Result<FlushOutcome> {
        let channel = self
            .router
            .channel_for(project_key)
            .map_err(|_| DeliveryError::UnknownChannel(project_key.to_string()))?;

        let message = RichMessage::from_summary(summary, project_key, original_events.len());

        if let Err(e) = self.notifier.deliver(channel, &message).await {
            error!(
                "Delivery failed for {} ({} events kept for retry): {}",
                project_key,
                original_events.len(),
                e
            );
            return Err(e.into());
        }

        info!("Summary delivered for {} to {}", project_key, channel);

        let report = self.batch_delete(original_events).await;

        if !report.success {
            warn!(
                "Partial delete for {}: {}/{} batches failed, {} events remain and may be summarized again",
                project_key,
                report.failed_batches(),
                report.batches.len(),
                report.undeleted()
            );
        }

        Ok(FlushOutcome::with_stats(
            project_key,
            original_events.len(),
            FlushAction::SummarySent,
            stats,
        )
        .with_delete_report(report))
    }

    pub async fn batch_delete(&self, events: &[Event]) -> BatchDeleteReport {
        let mut seen = HashSet::with_capacity(events.len());
        let keys: Vec<EventKey> = events
            .iter()
            .map(Event::key)
            .filter(|key| seen.insert(key.clone()))
            .collect();

        let mut report = BatchDeleteReport {
            success: true,
            ..Default::default()
        };

        for (batch_num, batch) in keys.chunks(MAX_DELETE_BATCH).enumerate() {
            match self.store.delete_batch(batch).await {
                Ok(()) => {
                    debug!("Delete batch {} ok ({} keys)", batch_num + 1, batch.len());
                    report.deleted += batch.len();
                    report.batches.push(DeleteBatchResult {
                        keys: batch.len(),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("Delete batch {} failed ({} keys): {}", batch_num + 1, batch.len(), e);
                    report.success = false;
                    report.batches.push(DeleteBatchResult {
                        keys: batch.len(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        report
    }
}
