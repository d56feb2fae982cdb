

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventSource {
    Github,
    Trello,
    #[default]
    Generic,
}


#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub project_key: String,
    pub occurred_at: i64,
    pub id: String,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    pub project_key: String,

    pub occurred_at: i64,

    #[serde(default)]
    pub source: EventSource,

    pub payload: Value,
}

impl Event {
    #[must_use]
    pub fn new(project_key: impl Into<String>, source: EventSource, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            project_key: project_key.into(),
            occurred_at: Utc::now().timestamp(),
            source,
            payload,
        }
    }

    #[must_use]
    pub fn with_occurred_at(mut self, occurred_at: i64) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            project_key: self.project_key.clone(),
            occurred_at: self.occurred_at,
            id: self.id.clone(),
        }
    }

    pub fn age_secs(&self, now: i64) -> i64 {
        now.saturating_sub(self.occurred_at)
    }

}
