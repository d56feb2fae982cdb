

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::error::{HeraldError, Result};
use crate::{
    DEFAULT_COUNT_THRESHOLD, DEFAULT_INTER_CHUNK_DELAY_MS, DEFAULT_MAX_AGE_SECS,
    DEFAULT_MAX_CHUNK_SIZE, DEFAULT_SLACK_API_URL,
};


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub count_threshold: usize,
    pub max_age_seconds: i64,
    pub max_chunk_size: usize,
    pub inter_chunk_delay_ms: u64,

    pub sweep_interval_seconds: u64,
    pub sweep_concurrency: usize,

    pub llm_provider: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_temperature: f64,
    pub llm_timeout_seconds: u64,

    pub slack_bot_token: Option<String>,
    pub slack_api_url: String,

    pub channels: BTreeMap<String, String>,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            count_threshold: DEFAULT_COUNT_THRESHOLD,
            max_age_seconds: DEFAULT_MAX_AGE_SECS,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            inter_chunk_delay_ms: DEFAULT_INTER_CHUNK_DELAY_MS,

            sweep_interval_seconds: 900,
            sweep_concurrency: 1,

            llm_provider: "openai".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            llm_api_key: None,
            llm_base_url: "https://api.openai.com/v1".to_string(),
            llm_temperature: 0.3,
            llm_timeout_seconds: 60,

            slack_bot_token: None,
            slack_api_url: DEFAULT_SLACK_API_URL.to_string(),

            channels: BTreeMap::new(),
        }
    }
}

impl HeraldConfig {
    /// File (if given) first, then `HERALD_*` environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            debug!("Loading config file: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(Environment::with_prefix("HERALD").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| HeraldError::config(e.to_string()))?;

        config.validate()?;

        info!(
            "Config loaded: count_threshold={}, max_age={}s, max_chunk_size={}, projects={}",
            config.count_threshold,
            config.max_age_seconds,
            config.max_chunk_size,
            config.channels.len()
        );

        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    pub fn with_channel(mut self, project_key: impl Into<String>, channel: impl Into<String>) -> Self {
        self.channels.insert(project_key.into(), channel.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.count_threshold == 0 {
            return Err(HeraldError::config("count_threshold must be at least 1"));
        }
        if self.max_chunk_size == 0 {
            return Err(HeraldError::config("max_chunk_size must be at least 1"));
        }
        if self.max_age_seconds < 0 {
            return Err(HeraldError::config("max_age_seconds must not be negative"));
        }
        if self.sweep_concurrency == 0 {
            return Err(HeraldError::config("sweep_concurrency must be at least 1"));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(HeraldError::config("sweep_interval_seconds must be at least 1"));
        }
        if !self.sweep_outpaces_max_age() {
            warn!(
                "sweep_interval_seconds ({}) >= max_age_seconds ({}): stale events may wait up to {}s",
                self.sweep_interval_seconds,
                self.max_age_seconds,
                self.max_staleness_secs()
            );
        }
        if self.channels.is_empty() {
            return Err(HeraldError::config("no project channels configured"));
        }
        if let Some((project, _)) = self.channels.iter().find(|(_, c)| c.trim().is_empty()) {
            return Err(HeraldError::config(format!(
                "project '{project}' has an empty channel"
            )));
        }
        Url::parse(&self.llm_base_url)
            .map_err(|e| HeraldError::config(format!("invalid llm_base_url: {e}")))?;
        Url::parse(&self.slack_api_url)
            .map_err(|e| HeraldError::config(format!("invalid slack_api_url: {e}")))?;

        Ok(())
    }

    pub fn sweep_outpaces_max_age(&self) -> bool {
        i64::try_from(self.sweep_interval_seconds).is_ok_and(|interval| interval < self.max_age_seconds)
    }

    pub fn max_staleness_secs(&self) -> u64 {
        u64::try_from(self.max_age_seconds)
            .unwrap_or(0)
            .saturating_add(self.sweep_interval_seconds)
    }

    pub fn inter_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.inter_chunk_delay_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_seconds)
    }
}
