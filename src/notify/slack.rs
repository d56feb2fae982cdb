

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::message::RichMessage;
use super::{DeliveryError, Notifier};
use crate::core::config::HeraldConfig;
use crate::core::error::{HeraldError, Result};

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    blocks: &'a [Value],
    unfurl_links: bool,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}


pub struct SlackNotifier {
    api_url: String,
    token: String,
    client: Client,
}

impl SlackNotifier {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HeraldError::config(format!("failed to build Slack client: {e}")))?;

        info!("SlackNotifier initialized for {}", api_url);

        Ok(Self {
            api_url,
            token: token.into(),
            client,
        })
    }

    pub fn from_config(config: &HeraldConfig) -> Result<Self> {
        let token = config
            .slack_bot_token
            .clone()
            .ok_or_else(|| HeraldError::config("slack_bot_token is required"))?;
        Self::new(config.slack_api_url.clone(), token)
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn deliver(&self, channel: &str, message: &RichMessage) -> std::result::Result<(), DeliveryError> {
        let request = PostMessageRequest {
            channel,
            text: &message.text,
            blocks: &message.blocks,
            unfurl_links: false,
        };

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<SlackResponse>()
            .await?;

        if !response.ok {
            return Err(DeliveryError::Rejected(
                response.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        debug!("Delivered message to {}", channel);
        Ok(())
    }
}
