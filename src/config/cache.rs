use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Age after which a cached window list is no longer served
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Period of the background eviction of expired entries
    #[serde(default = "default_purge_interval_ms")]
    pub purge_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            purge_interval_ms: default_purge_interval_ms(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ttl_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache.ttl_ms must be > 0".into(),
            )));
        }
        if self.purge_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache.purge_interval_ms must be > 0".into(),
            )));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_millis(self.purge_interval_ms)
    }
}

fn default_ttl_ms() -> u64 {
    1000
}
fn default_purge_interval_ms() -> u64 {
    5000
}
