

use std::collections::BTreeMap;

use tracing::info;

use crate::core::config::HeraldConfig;
use crate::core::error::{HeraldError, Result};


#[derive(Debug, Clone)]
pub struct ChannelRouter {
    routes: BTreeMap<String, String>,
}

impl ChannelRouter {
    pub fn new(routes: BTreeMap<String, String>) -> Result<Self> {
        if routes.is_empty() {
            return Err(HeraldError::config("no project channels configured"));
        }
        for (project, channel) in &routes {
            if project.trim().is_empty() {
                return Err(HeraldError::config("empty project key in channel map"));
            }
            if channel.trim().is_empty() {
                return Err(HeraldError::config(format!(
                    "project '{project}' has an empty channel"
                )));
            }
        }

        info!("ChannelRouter initialized with {} projects", routes.len());
        Ok(Self { routes })
    }

    pub fn from_config(config: &HeraldConfig) -> Result<Self> {
        Self::new(config.channels.clone())
    }

    pub fn channel_for(&self, project_key: &str) -> Result<&str> {
        self.routes
            .get(project_key)
            .map(String::as_str)
            .ok_or_else(|| HeraldError::config(format!("project '{project_key}' has no channel")))
    }

    pub fn contains(&self, project_key: &str) -> bool {
        self.routes.contains_key(project_key)
    }

    pub fn projects(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
