

pub mod factory;
pub mod models;
pub mod prompt;
pub mod providers;
pub mod summarizer;

pub use factory::LlmProviderFactory;
pub use models::SummaryDocument;
pub use providers::{LlmProvider, LlmProviderError, OpenAiCompatProvider};
pub use summarizer::{ConsolidationError, LlmSummarizer, Summarizer, SummarizerError};
