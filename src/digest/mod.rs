

pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod transaction;

#[cfg(test)]
pub(crate) mod test_support;

pub use models::{BatchDeleteReport, FlushAction, FlushEvent, FlushOutcome, FlushStats};
pub use orchestrator::SummaryOrchestrator;
pub use pipeline::{DigestPipeline, SweepFailure, SweepReport};
pub use transaction::FlushTransaction;
