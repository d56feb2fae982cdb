

pub mod base;
pub mod openai;

pub use base::{Completion, LlmProvider, LlmProviderError, Prompt, TokenUsage};
pub use openai::OpenAiCompatProvider;
