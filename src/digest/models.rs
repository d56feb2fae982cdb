

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlushAction {
    SummarySent,
    NoAction,
    AllChunksFailed,
    ConsolidationFailed,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBatchResult {
    pub keys: usize,
    pub error: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchDeleteReport {
    pub success: bool,
    pub deleted: usize,
    pub batches: Vec<DeleteBatchResult>,
}

impl BatchDeleteReport {
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| b.error.is_some()).count()
    }

    pub fn undeleted(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.error.is_some())
            .map(|b| b.keys)
            .sum()
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    pub partial_count: usize,
    pub chunk_error_count: usize,
    /// Events whose chunk failed; deleted with the batch without being summarized.
    pub dropped_event_count: usize,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushOutcome {
    pub project_key: String,
    pub event_count: usize,
    pub action: FlushAction,
    pub partial_count: usize,
    pub chunk_error_count: usize,
    pub dropped_event_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_report: Option<BatchDeleteReport>,
}

impl FlushOutcome {
    pub fn no_action(project_key: impl Into<String>, event_count: usize) -> Self {
        Self::with_stats(project_key, event_count, FlushAction::NoAction, FlushStats::default())
    }

    pub fn with_stats(
        project_key: impl Into<String>,
        event_count: usize,
        action: FlushAction,
        stats: FlushStats,
    ) -> Self {
        Self {
            project_key: project_key.into(),
            event_count,
            action,
            partial_count: stats.partial_count,
            chunk_error_count: stats.chunk_error_count,
            dropped_event_count: stats.dropped_event_count,
            delete_report: None,
        }
    }

    #[must_use]
    pub fn with_delete_report(mut self, report: BatchDeleteReport) -> Self {
        self.delete_report = Some(report);
        self
    }

    pub fn is_sent(&self) -> bool {
        self.action == FlushAction::SummarySent
    }
}


#[derive(Debug, Clone)]
pub enum FlushEvent {
    Started {
        project_key: String,
        event_count: usize,
        chunk_count: usize,
    },
    ChunkSummarized {
        project_key: String,
        index: usize,
        event_count: usize,
    },
    ChunkFailed {
        project_key: String,
        index: usize,
        error: String,
    },
    Completed(FlushOutcome),
    Failed {
        project_key: String,
        error: String,
    },
}
