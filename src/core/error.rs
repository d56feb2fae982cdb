

use thiserror::Error;

use crate::llm::summarizer::{ConsolidationError, SummarizerError};
use crate::notify::DeliveryError;
use crate::store::StoreError;


#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event store error: {0}")]
    Store(#[from] StoreError),

    #[error("Summarizer error: {0}")]
    Summarizer(#[from] SummarizerError),

    #[error("Consolidation error: {0}")]
    Consolidation(#[from] ConsolidationError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}

impl HeraldError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}


pub type Result<T> = std::result::Result<T, HeraldError>;
