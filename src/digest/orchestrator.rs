

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::Sender;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::models::{FlushAction, FlushEvent, FlushOutcome, FlushStats};
use super::transaction::FlushTransaction;
use crate::batching::chunker::chunk_events;
use crate::core::config::HeraldConfig;
use crate::core::error::{HeraldError, Result};
use crate::core::events::Event;
use crate::llm::models::SummaryDocument;
use crate::llm::summarizer::Summarizer;
use crate::{DEFAULT_INTER_CHUNK_DELAY_MS, DEFAULT_MAX_CHUNK_SIZE};


pub struct SummaryOrchestrator {
    summarizer: Arc<dyn Summarizer>,
    transaction: FlushTransaction,
    max_chunk_size: usize,
    inter_chunk_delay: Duration,
    event_tx: Option<Sender<FlushEvent>>,
}

impl SummaryOrchestrator {
    pub fn new(summarizer: Arc<dyn Summarizer>, transaction: FlushTransaction) -> Self {
        Self {
            summarizer,
            transaction,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            inter_chunk_delay: Duration::from_millis(DEFAULT_INTER_CHUNK_DELAY_MS),
            event_tx: None,
        }
    }

    pub fn from_config(
        config: &HeraldConfig,
        summarizer: Arc<dyn Summarizer>,
        transaction: FlushTransaction,
    ) -> Result<Self> {
        Self::new(summarizer, transaction)
            .with_max_chunk_size(config.max_chunk_size)
            .map(|o| o.with_inter_chunk_delay(config.inter_chunk_delay()))
    }

    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Result<Self> {
        if max_chunk_size == 0 {
            return Err(HeraldError::config("max_chunk_size must be at least 1"));
        }
        self.max_chunk_size = max_chunk_size;
        Ok(self)
    }

    #[must_use]
    pub fn with_inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: Sender<FlushEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// `events` must be in chronological order; exactly this set is deleted
    /// after a successful delivery. `Err` means nothing was deleted.
    pub async fn flush(&self, project_key: &str, events: Vec<Event>) -> Result<FlushOutcome> {
        if events.is_empty() {
            debug!("Nothing pending for {}", project_key);
            return Ok(FlushOutcome::no_action(project_key, 0));
        }

        let start_time = Instant::now();
        let chunks = chunk_events(&events, self.max_chunk_size)?;
        let chunk_count = chunks.len();

        info!(
            "Flushing {}: {} events in {} chunks",
            project_key,
            events.len(),
            chunk_count
        );

        self.emit_event(FlushEvent::Started {
            project_key: project_key.to_string(),
            event_count: events.len(),
            chunk_count,
        })
        .await;

        let mut partials: Vec<SummaryDocument> = Vec::with_capacity(chunk_count);
        let mut stats = FlushStats::default();

        for (index, chunk) in chunks.iter().enumerate() {
            if index > 0 && !self.inter_chunk_delay.is_zero() {
                sleep(self.inter_chunk_delay).await;
            }

            debug!(
                "Summarizing chunk {}/{} ({} events) for {}",
                index + 1,
                chunk_count,
                chunk.len(),
                project_key
            );

            match self.summarize_chunk(chunk, project_key).await {
                Ok(partial) => {
                    partials.push(partial);
                    self.emit_event(FlushEvent::ChunkSummarized {
                        project_key: project_key.to_string(),
                        index,
                        event_count: chunk.len(),
                    })
                    .await;
                }
                Err(e) => {
                    warn!(
                        "Chunk {}/{} failed for {}: {}",
                        index + 1,
                        chunk_count,
                        project_key,
                        e
                    );
                    stats.chunk_error_count += 1;
                    stats.dropped_event_count += chunk.len();
                    self.emit_event(FlushEvent::ChunkFailed {
                        project_key: project_key.to_string(),
                        index,
                        error: e.to_string(),
                    })
                    .await;
                }
            }
        }

        stats.partial_count = partials.len();

        if partials.is_empty() {
            warn!(
                "All {} chunks failed for {}, {} events kept for the next flush",
                chunk_count,
                project_key,
                events.len()
            );
            return Ok(self
                .finish(FlushOutcome::with_stats(
                    project_key,
                    events.len(),
                    FlushAction::AllChunksFailed,
                    stats,
                ))
                .await);
        }

        let summary = match self.final_summary(project_key, partials, chunk_count, &stats).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("{} for {}, {} events kept", e, project_key, events.len());
                return Ok(self
                    .finish(FlushOutcome::with_stats(
                        project_key,
                        events.len(),
                        FlushAction::ConsolidationFailed,
                        stats,
                    ))
                    .await);
            }
        };

        if stats.dropped_event_count > 0 {
            warn!(
                "{} events of {} were in failed chunks and are dropped with this flush",
                stats.dropped_event_count, project_key
            );
        }

        match self
            .transaction
            .commit(project_key, &summary, &events, stats)
            .await
        {
            Ok(outcome) => {
                info!(
                    "Flush complete for {}: {} events, {} partials, {} chunk errors ({:.0}ms)",
                    project_key,
                    outcome.event_count,
                    outcome.partial_count,
                    outcome.chunk_error_count,
                    start_time.elapsed().as_secs_f64() * 1000.0
                );
                Ok(self.finish(outcome).await)
            }
            Err(e) => {
                self.emit_event(FlushEvent::Failed {
                    project_key: project_key.to_string(),
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn summarize_chunk(&self, chunk: &[Event], project_key: &str) -> Result<SummaryDocument> {
        Ok(self.summarizer.summarize_chunk(chunk, project_key).await?)
    }

    async fn final_summary(
        &self,
        project_key: &str,
        mut partials: Vec<SummaryDocument>,
        chunk_count: usize,
        stats: &FlushStats,
    ) -> Result<SummaryDocument> {
        if chunk_count == 1 && stats.chunk_error_count == 0 {
            if let Some(summary) = partials.pop() {
                debug!("Single chunk for {}, using it as the final summary", project_key);
                return Ok(summary);
            }
        }

        if !self.inter_chunk_delay.is_zero() {
            sleep(self.inter_chunk_delay).await;
        }

        let texts: Vec<String> = partials.iter().map(SummaryDocument::partial_text).collect();
        Ok(self.summarizer.consolidate(&texts, project_key).await?)
    }

    async fn finish(&self, outcome: FlushOutcome) -> FlushOutcome {
        self.emit_event(FlushEvent::Completed(outcome.clone())).await;
        outcome
    }

    async fn emit_event(&self, event: FlushEvent) {
        if let Some(ref tx) = self.event_tx {
            if let Err(e) = tx.send(event).await {
                warn!("Failed to emit flush event: {}", e);
            }
        }
    }
}
