

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info};

use super::models::{FlushAction, FlushOutcome};
use super::orchestrator::SummaryOrchestrator;
use super::transaction::FlushTransaction;
use crate::batching::policy::{BatchPolicy, FlushContext};
use crate::core::config::HeraldConfig;
use crate::core::error::{HeraldError, Result};
use crate::core::events::Event;
use crate::llm::summarizer::Summarizer;
use crate::notify::{ChannelRouter, Notifier};
use crate::store::EventStore;


#[derive(Debug, Clone, Serialize, Default)]
pub struct SweepReport {
    pub outcomes: Vec<FlushOutcome>,
    pub failures: Vec<SweepFailure>,
    pub duration_ms: f64,
}

impl SweepReport {
    pub fn sent(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_sent()).count()
    }

    pub fn count(&self, action: FlushAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}


#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub project_key: String,
    pub error: String,
}


struct FlushGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    project_key: String,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.project_key);
    }
}


pub struct DigestPipeline {
    store: Arc<dyn EventStore>,
    router: Arc<ChannelRouter>,
    policy: BatchPolicy,
    orchestrator: SummaryOrchestrator,
    sweep_concurrency: usize,
    in_flight: Mutex<HashSet<String>>,
}

impl DigestPipeline {
    pub fn new(
        store: Arc<dyn EventStore>,
        router: Arc<ChannelRouter>,
        policy: BatchPolicy,
        orchestrator: SummaryOrchestrator,
    ) -> Self {
        Self {
            store,
            router,
            policy,
            orchestrator,
            sweep_concurrency: 1,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_config(
        config: &HeraldConfig,
        store: Arc<dyn EventStore>,
        summarizer: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;

        let router = Arc::new(ChannelRouter::from_config(config)?);
        let policy = BatchPolicy::from_config(config)?;
        let transaction = FlushTransaction::new(store.clone(), notifier, router.clone());
        let orchestrator = SummaryOrchestrator::from_config(config, summarizer, transaction)?;

        info!(
            "DigestPipeline initialized: {} projects, threshold={}, max_age={}s",
            router.len(),
            policy.count_threshold(),
            policy.max_age_secs()
        );

        Ok(Self::new(store, router, policy, orchestrator)
            .with_sweep_concurrency(config.sweep_concurrency))
    }

    #[must_use]
    pub fn with_sweep_concurrency(mut self, concurrency: usize) -> Self {
        self.sweep_concurrency = concurrency.max(1);
        self
    }

    pub fn orchestrator(&self) -> &SummaryOrchestrator {
        &self.orchestrator
    }

    pub async fn ingest(&self, event: Event) -> Result<FlushOutcome> {
        if !self.router.contains(&event.project_key) {
            return Err(HeraldError::config(format!(
                "project '{}' has no channel, event {} rejected",
                event.project_key, event.id
            )));
        }

        self.store.append(&event).await?;
        debug!("Ingested {} event {} for {}", event.source, event.id, event.project_key);

        self.check_project(&event.project_key, &FlushContext::event_triggered())
            .await
    }

    pub async fn check_project(&self, project_key: &str, ctx: &FlushContext) -> Result<FlushOutcome> {
        let Some(_guard) = self.try_begin(project_key) else {
            debug!("Flush already running for {}, skipping", project_key);
            return Ok(FlushOutcome::no_action(project_key, 0));
        };

        let mut events = self.store.query_all(project_key).await?;
        events.sort_by_key(|e| e.occurred_at);

        if !self.policy.should_flush(&events, ctx) {
            debug!(
                "No flush for {} ({} pending, trigger={})",
                project_key,
                events.len(),
                ctx.trigger
            );
            return Ok(FlushOutcome::no_action(project_key, events.len()));
        }

        self.orchestrator.flush(project_key, events).await
    }

    pub async fn sweep(&self) -> SweepReport {
        self.sweep_with(FlushContext::scheduled_sweep()).await
    }

    pub async fn sweep_with(&self, ctx: FlushContext) -> SweepReport {
        let start_time = Instant::now();
        let projects: Vec<String> = self.router.projects().map(str::to_string).collect();

        info!(
            "Sweep started over {} projects (concurrency={})",
            projects.len(),
            self.sweep_concurrency
        );

        let results: Vec<(String, Result<FlushOutcome>)> = stream::iter(projects)
            .map(|project_key| async move {
                let result = self.check_project(&project_key, &ctx).await;
                (project_key, result)
            })
            .buffer_unordered(self.sweep_concurrency)
            .collect()
            .await;

        let mut report = SweepReport::default();
        for (project_key, result) in results {
            match result {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    error!("Sweep failed for {}: {}", project_key, e);
                    report.failures.push(SweepFailure {
                        project_key,
                        error: e.to_string(),
                    });
                }
            }
        }
        report.outcomes.sort_by(|a, b| a.project_key.cmp(&b.project_key));
        report.failures.sort_by(|a, b| a.project_key.cmp(&b.project_key));
        report.duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        info!(
            "Sweep complete: {} sent, {} failed chunk sets, {} consolidation failures, {} errors ({:.0}ms)",
            report.sent(),
            report.count(FlushAction::AllChunksFailed),
            report.count(FlushAction::ConsolidationFailed),
            report.failures.len(),
            report.duration_ms
        );

        report
    }

    fn try_begin(&self, project_key: &str) -> Option<FlushGuard<'_>> {
        if !self.in_flight.lock().insert(project_key.to_string()) {
            return None;
        }
        Some(FlushGuard {
            in_flight: &self.in_flight,
            project_key: project_key.to_string(),
        })
    }
}
