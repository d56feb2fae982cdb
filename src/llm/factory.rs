

use std::sync::Arc;

use tracing::info;

use super::providers::base::LlmProvider;
use super::providers::openai::OpenAiCompatProvider;
use crate::core::config::HeraldConfig;
use crate::core::error::{HeraldError, Result};

const OPENAI_URL: &str = "https://api.openai.com/v1";
const CEREBRAS_URL: &str = "https://api.cerebras.ai/v1";
const OLLAMA_URL: &str = "http://localhost:11434/v1";


pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Providers differ only in their default endpoint; an explicit
    /// `llm_base_url` other than the OpenAI default always wins.
    pub fn from_config(config: &HeraldConfig) -> Result<Arc<dyn LlmProvider>> {
        let default_url = match config.llm_provider.as_str() {
            "openai" => OPENAI_URL,
            "cerebras" => CEREBRAS_URL,
            "ollama" => OLLAMA_URL,
            other => {
                return Err(HeraldError::config(format!(
                    "unknown llm_provider '{other}'. Supported: openai, cerebras, ollama"
                )));
            }
        };

        let base_url = if config.llm_base_url.trim_end_matches('/') == OPENAI_URL {
            default_url
        } else {
            config.llm_base_url.as_str()
        };

        if config.llm_api_key.is_none() && config.llm_provider != "ollama" {
            return Err(HeraldError::config(format!(
                "llm_api_key is required for provider '{}'",
                config.llm_provider
            )));
        }

        let provider = OpenAiCompatProvider::new(
            base_url,
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            config.llm_temperature,
            config.llm_timeout(),
        )
        .map_err(|e| HeraldError::config(format!("failed to build LLM client: {e}")))?;

        info!(
            "LLM provider ready: {} ({}) at {}",
            config.llm_provider, config.llm_model, base_url
        );

        Ok(Arc::new(provider))
    }
}
