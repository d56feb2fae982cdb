

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::SummaryDocument;
use super::prompt::{
    CHUNK_SYSTEM_PROMPT, CONSOLIDATION_SYSTEM_PROMPT, build_chunk_prompt,
    build_consolidation_prompt, truncate_chars,
};
use super::providers::base::{LlmProvider, LlmProviderError, Prompt};
use crate::core::events::Event;


#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("LLM provider failed: {0}")]
    Provider(#[from] LlmProviderError),

    #[error("Unusable model response: {0}")]
    InvalidResponse(String),

    #[error("Nothing to summarize")]
    EmptyInput,
}


#[derive(Error, Debug)]
#[error("Merging {partial_count} partial summaries failed: {source}")]
pub struct ConsolidationError {
    pub partial_count: usize,
    #[source]
    pub source: SummarizerError,
}


#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize_chunk(
        &self,
        events: &[Event],
        project_key: &str,
    ) -> Result<SummaryDocument, SummarizerError>;

    async fn consolidate(
        &self,
        partials: &[String],
        project_key: &str,
    ) -> Result<SummaryDocument, ConsolidationError>;
}


pub struct LlmSummarizer<P: LlmProvider> {
    provider: P,
}

impl<P: LlmProvider> LlmSummarizer<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        info!(
            "LlmSummarizer initialized: provider={}, model={}",
            provider.provider_name(),
            provider.model_name()
        );
        Self { provider }
    }

    async fn generate(&self, system: &str, user: String) -> Result<SummaryDocument, SummarizerError> {
        let completion = self.provider.complete(&Prompt::json(system, user)).await?;
        parse_document(&completion.content)
    }
}


pub fn parse_document(raw: &str) -> Result<SummaryDocument, SummarizerError> {
    let trimmed = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let document: SummaryDocument = serde_json::from_str(trimmed).map_err(|e| {
        warn!("Response was: {}", truncate_chars(raw, 200));
        SummarizerError::InvalidResponse(e.to_string())
    })?;

    if document.is_incomplete() {
        return Err(SummarizerError::InvalidResponse(
            "headline or summary is empty".to_string(),
        ));
    }

    Ok(document)
}

#[async_trait]
impl<P: LlmProvider> Summarizer for LlmSummarizer<P> {
    async fn summarize_chunk(
        &self,
        events: &[Event],
        project_key: &str,
    ) -> Result<SummaryDocument, SummarizerError> {
        if events.is_empty() {
            return Err(SummarizerError::EmptyInput);
        }

        debug!("Summarizing {} events for {}", events.len(), project_key);
        self.generate(CHUNK_SYSTEM_PROMPT, build_chunk_prompt(events, project_key))
            .await
    }

    async fn consolidate(
        &self,
        partials: &[String],
        project_key: &str,
    ) -> Result<SummaryDocument, ConsolidationError> {
        let failed = |source| ConsolidationError {
            partial_count: partials.len(),
            source,
        };

        if partials.is_empty() {
            return Err(failed(SummarizerError::EmptyInput));
        }

        debug!("Consolidating {} partial summaries for {}", partials.len(), project_key);
        self.generate(
            CONSOLIDATION_SYSTEM_PROMPT,
            build_consolidation_prompt(partials, project_key),
        )
        .await
        .map_err(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::HeraldError;
    use crate::core::events::EventSource;
    use crate::llm::providers::base::Completion;
    use parking_lot::Mutex;
    use serde_json::json;

    struct CannedProvider {
        reply: Result<String, String>,
        prompts: Mutex<Vec<Prompt>>,
    }

    impl CannedProvider {
        fn new(reply: Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(&self, prompt: &Prompt) -> Result<Completion, LlmProviderError> {
            self.prompts.lock().push(prompt.clone());
            match &self.reply {
                Ok(content) => Ok(Completion {
                    content: content.clone(),
                    model: "canned".to_string(),
                    usage: None,
                }),
                Err(e) => Err(LlmProviderError::Provider(e.clone())),
            }
        }

        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn events() -> Vec<Event> {
        vec![Event::new("apollo", EventSource::Github, json!({"text": "PR #1 merged"}))]
    }

    #[tokio::test]
    async fn test_summarize_chunk_parses_json() {
        let summarizer = LlmSummarizer::new(CannedProvider::new(Ok(
            r#"{"headline":"PR merged","summary":"PR #1 landed.","highlights":["PR #1"]}"#,
        )));

        let doc = summarizer.summarize_chunk(&events(), "apollo").await.unwrap();

        assert_eq!(doc.headline, "PR merged");
        assert_eq!(doc.highlights, vec!["PR #1"]);
        let prompts = summarizer.provider.prompts.lock();
        assert!(prompts[0].json_response);
        assert!(prompts[0].user.contains("PR #1 merged"));
    }

    #[tokio::test]
    async fn test_consolidate_uses_consolidation_prompt() {
        let summarizer =
            LlmSummarizer::new(CannedProvider::new(Ok(r#"{"headline":"h","summary":"s"}"#)));

        summarizer
            .consolidate(&["a".to_string(), "b".to_string()], "apollo")
            .await
            .unwrap();

        let prompts = summarizer.provider.prompts.lock();
        assert_eq!(prompts[0].system, CONSOLIDATION_SYSTEM_PROMPT);
        assert!(prompts[0].user.contains("--- Part 2 ---\nb"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_summarizer_error() {
        let summarizer = LlmSummarizer::new(CannedProvider::new(Err("rate limited")));
        let err = summarizer.summarize_chunk(&events(), "apollo").await.unwrap_err();
        assert!(matches!(err, SummarizerError::Provider(_)));
    }

    #[tokio::test]
    async fn test_consolidation_failure_is_consolidation_error() {
        let summarizer = LlmSummarizer::new(CannedProvider::new(Ok("not json at all")));

        let err = summarizer
            .consolidate(&["a".to_string(), "b".to_string()], "apollo")
            .await
            .unwrap_err();

        assert_eq!(err.partial_count, 2);
        assert!(matches!(err.source, SummarizerError::InvalidResponse(_)));
        assert!(matches!(HeraldError::from(err), HeraldError::Consolidation(_)));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_call() {
        let summarizer = LlmSummarizer::new(CannedProvider::new(Ok("{}")));
        assert!(matches!(
            summarizer.summarize_chunk(&[], "apollo").await,
            Err(SummarizerError::EmptyInput)
        ));
        assert!(summarizer.provider.prompts.lock().is_empty());
    }

    #[test]
    fn test_parse_document_strips_code_fence() {
        let doc = parse_document("```json\n{\"headline\":\"h\",\"summary\":\"s\"}\n```").unwrap();
        assert_eq!(doc.text, "s");
    }

    #[test]
    fn test_parse_document_rejects_prose_and_blank() {
        assert!(parse_document("Here is your summary").is_err());
        assert!(parse_document(r#"{"headline":" ","summary":""}"#).is_err());
    }

    #[test]
    fn test_parse_document_rejects_half_empty_documents() {
        assert!(matches!(
            parse_document(r#"{"headline":"PR merged","summary":""}"#),
            Err(SummarizerError::InvalidResponse(_))
        ));
        assert!(parse_document(r#"{"headline":"","summary":"PR #1 landed."}"#).is_err());
    }
}
