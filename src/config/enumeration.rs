use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::AppId;
use crate::Error;
use crate::Result;

const MAX_ENUMERATION_TIMEOUT_MS: u64 = 60_000;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnumerationConfig {
    /// Upper bound on one raw window query; a slower app counts as windowless
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum concurrent enumerations per pass, 0 means one per application
    #[serde(default)]
    pub max_concurrency: usize,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_concurrency: 0,
        }
    }
}

impl EnumerationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 || self.timeout_ms > MAX_ENUMERATION_TIMEOUT_MS {
            return Err(Error::Config(ConfigError::Message(format!(
                "enumeration.timeout_ms {} out of range 1..={}",
                self.timeout_ms, MAX_ENUMERATION_TIMEOUT_MS
            ))));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    3000
}

/// Window validity policy applied after every successful enumeration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilterConfig {
    #[serde(default = "default_min_dimension")]
    pub min_width: f64,

    #[serde(default = "default_min_dimension")]
    pub min_height: f64,

    /// Window levels treated as standard application levels
    #[serde(default = "default_allowed_levels")]
    pub allowed_levels: Vec<i32>,

    /// Applications known to break window conventions; they skip both filters
    #[serde(default)]
    pub bypass_apps: Vec<AppId>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_dimension(),
            min_height: default_min_dimension(),
            allowed_levels: default_allowed_levels(),
            bypass_apps: Vec::new(),
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_width >= 0.0 && self.min_height >= 0.0) {
            return Err(Error::Config(ConfigError::Message(format!(
                "filter minimum size {}x{} must be non-negative",
                self.min_width, self.min_height
            ))));
        }
        if self.allowed_levels.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "filter.allowed_levels must contain at least one level".into(),
            )));
        }
        Ok(())
    }
}

fn default_min_dimension() -> f64 {
    50.0
}
fn default_allowed_levels() -> Vec<i32> {
    vec![0]
}
