

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use tracing::debug;

use crate::core::config::HeraldConfig;
use crate::core::error::{HeraldError, Result};
use crate::core::events::Event;
use crate::{DEFAULT_COUNT_THRESHOLD, DEFAULT_MAX_AGE_SECS};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FlushTrigger {
    Event,
    ScheduledSweep,
}


#[derive(Debug, Clone, Copy)]
pub struct FlushContext {
    pub trigger: FlushTrigger,
    pub now: i64,
}

impl FlushContext {
    pub fn event_triggered() -> Self {
        Self {
            trigger: FlushTrigger::Event,
            now: Utc::now().timestamp(),
        }
    }

    pub fn scheduled_sweep() -> Self {
        Self {
            trigger: FlushTrigger::ScheduledSweep,
            now: Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn at(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    pub fn is_scheduled_sweep(&self) -> bool {
        self.trigger == FlushTrigger::ScheduledSweep
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlushReason {
    CountThreshold,
    MaxAge,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    count_threshold: usize,
    max_age_secs: i64,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            count_threshold: DEFAULT_COUNT_THRESHOLD,
            max_age_secs: DEFAULT_MAX_AGE_SECS,
        }
    }
}

impl BatchPolicy {
    pub fn new(count_threshold: usize, max_age_secs: i64) -> Result<Self> {
        if count_threshold == 0 {
            return Err(HeraldError::config("count_threshold must be at least 1"));
        }
        if max_age_secs < 0 {
            return Err(HeraldError::config("max_age_seconds must not be negative"));
        }
        Ok(Self {
            count_threshold,
            max_age_secs,
        })
    }

    pub fn from_config(config: &HeraldConfig) -> Result<Self> {
        Self::new(config.count_threshold, config.max_age_seconds)
    }

    pub fn count_threshold(&self) -> usize {
        self.count_threshold
    }

    pub fn max_age_secs(&self) -> i64 {
        self.max_age_secs
    }

    /// Event-triggered checks flush only on the count threshold; the age bound is
    /// enforced by scheduled sweeps alone.
    pub fn evaluate(&self, events: &[Event], ctx: &FlushContext) -> Option<FlushReason> {
        if events.is_empty() {
            return None;
        }

        if events.len() >= self.count_threshold {
            debug!(
                "Flush due: {} events >= threshold {} ({})",
                events.len(),
                self.count_threshold,
                ctx.trigger
            );
            return Some(FlushReason::CountThreshold);
        }

        if !ctx.is_scheduled_sweep() {
            return None;
        }

        let age = events.iter().min_by_key(|e| e.occurred_at)?.age_secs(ctx.now);
        if age >= self.max_age_secs {
            debug!("Flush due: oldest event is {}s old (max {}s)", age, self.max_age_secs);
            return Some(FlushReason::MaxAge);
        }

        None
    }

    pub fn should_flush(&self, events: &[Event], ctx: &FlushContext) -> bool {
        self.evaluate(events, ctx).is_some()
    }
}
