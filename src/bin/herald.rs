

use std::path::PathBuf;
use std::sync::Arc;

use herald::llm::{LlmProviderFactory, LlmSummarizer};
use herald::notify::SlackNotifier;
use herald::{DigestPipeline, Event, EventSource, HeraldConfig, InMemoryEventStore};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};


#[derive(Debug, Deserialize)]
struct IncomingEvent {
    project_key: String,
    #[serde(default)]
    source: EventSource,
    id: Option<String>,
    occurred_at: Option<i64>,
    payload: Value,
}

impl From<IncomingEvent> for Event {
    fn from(incoming: IncomingEvent) -> Self {
        let mut event = Event::new(incoming.project_key, incoming.source, incoming.payload);
        if let Some(id) = incoming.id {
            event = event.with_id(id);
        }
        if let Some(at) = incoming.occurred_at {
            event = event.with_occurred_at(at);
        }
        event
    }
}


async fn ingest_line(pipeline: &DigestPipeline, line: &str) {
    let incoming: IncomingEvent = match serde_json::from_str(line) {
        Ok(incoming) => incoming,
        Err(e) => {
            warn!("Skipping malformed event line: {}", e);
            return;
        }
    };

    match pipeline.ingest(incoming.into()).await {
        Ok(outcome) if outcome.is_sent() => {
            info!("Flushed {} on ingest ({} events)", outcome.project_key, outcome.event_count)
        }
        Ok(_) => {}
        Err(e) => warn!("Ingest failed: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,herald=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HERALD_CONFIG").ok())
        .map(PathBuf::from);
    let config = HeraldConfig::load(config_path.as_deref())?;

    let provider = LlmProviderFactory::from_config(&config)?;
    let summarizer = Arc::new(LlmSummarizer::new(provider));
    let notifier = Arc::new(SlackNotifier::from_config(&config)?);
    let store = Arc::new(InMemoryEventStore::new());
    let pipeline = DigestPipeline::from_config(&config, store.clone(), summarizer, notifier)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(config.sweep_interval());
    ticker.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("herald running: reading events from stdin, sweeping every {:?}", config.sweep_interval());
    warn!("Pending events are held in memory only; anything not yet summarized is lost when herald stops");

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => ingest_line(&pipeline, &line).await,
                None => {
                    info!("stdin closed");
                    break;
                }
            },
            _ = ticker.tick() => {
                pipeline.sweep().await;
            }
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    let report = pipeline.sweep().await;
    info!("Final sweep: {} summaries sent", report.sent());

    let pending = store.total_pending();
    if pending > 0 {
        warn!(
            "{} events were never summarized and are discarded now: the in-memory store does not survive a restart",
            pending
        );
    }

    Ok(())
}
