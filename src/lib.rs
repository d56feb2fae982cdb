

pub mod batching;
pub mod core;
pub mod digest;
pub mod llm;
pub mod notify;
pub mod store;


pub use crate::core::config::HeraldConfig;
pub use crate::core::error::{HeraldError, Result};
pub use crate::core::events::{Event, EventKey, EventSource};
pub use digest::{DigestPipeline, FlushAction, FlushOutcome, SummaryOrchestrator};
pub use store::{EventStore, InMemoryEventStore};


pub const DEFAULT_COUNT_THRESHOLD: usize = 20;


pub const DEFAULT_MAX_AGE_SECS: i64 = 7200;


pub const DEFAULT_MAX_CHUNK_SIZE: usize = 15;


pub const DEFAULT_INTER_CHUNK_DELAY_MS: u64 = 1000;


pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
