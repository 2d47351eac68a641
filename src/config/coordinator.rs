use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Debounce policy of the update coordinator
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CoordinatorConfig {
    /// Debounce delay for an isolated request
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Debounce delay for a request that is part of a burst
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Requests closer together than this are treated as a burst
    #[serde(default = "default_burst_threshold_ms")]
    pub burst_threshold_ms: u64,

    /// Anti-starvation ceiling: coalesced requests before a pass is forced
    #[serde(default = "default_max_coalesced")]
    pub max_coalesced: usize,

    /// Floor between the starts of two recomputation passes
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            burst_threshold_ms: default_burst_threshold_ms(),
            max_coalesced: default_max_coalesced(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl CoordinatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_delay_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "coordinator.min_delay_ms must be at least 1ms".into(),
            )));
        }

        if self.min_delay_ms > self.max_delay_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "coordinator.min_delay_ms {}ms exceeds max_delay_ms {}ms",
                self.min_delay_ms, self.max_delay_ms
            ))));
        }

        if self.max_coalesced == 0 {
            return Err(Error::Config(ConfigError::Message(
                "coordinator.max_coalesced must be > 0".into(),
            )));
        }

        Ok(())
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn burst_threshold(&self) -> Duration {
        Duration::from_millis(self.burst_threshold_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

fn default_min_delay_ms() -> u64 {
    50
}
fn default_max_delay_ms() -> u64 {
    150
}
fn default_burst_threshold_ms() -> u64 {
    100
}
fn default_max_coalesced() -> usize {
    3
}
fn default_min_interval_ms() -> u64 {
    500
}
