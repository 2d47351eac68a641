//! Configuration management for the dock core.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`WINDOCK__` prefix)
//! - Section-wise validation
mod cache;
mod coordinator;
mod enumeration;
mod log;
pub use cache::*;
pub use coordinator::*;
pub use enumeration::*;
pub use log::*;


use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

pub(crate) const ENV_PREFIX: &str = "WINDOCK";

/// Main configuration container for the dock core components
///
/// Combines all section configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct DockConfig {
    /// Debounce, ceiling and floor of the update coordinator
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
    /// Snapshot cache lifetime
    #[serde(default)]
    pub cache: CacheConfig,
    /// Per-application window enumeration
    #[serde(default)]
    pub enumeration: EnumerationConfig,
    /// Window validity policy
    #[serde(default)]
    pub filter: FilterConfig,
    /// Log file location for the binary
    #[serde(default)]
    pub log: LogConfig,
}

impl Debug for DockConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("DockConfig")
            .field("coordinator", &self.coordinator)
            .field("cache", &self.cache)
            .field("enumeration", &self.enumeration)
            .field("filter", &self.filter)
            .field("log", &self.log)
            .finish()
    }
}

impl DockConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Later sources override earlier ones:
    /// 1. Type defaults
    /// 2. Configuration file from `CONFIG_PATH` (if set)
    /// 3. Environment variables with `WINDOCK__` prefix
    ///
    /// Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("WINDOCK__COORDINATOR__MAX_COALESCED", "5");
    /// let cfg = DockConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Environment variables are re-applied on top of the file.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.coordinator.validate()?;
        self.cache.validate()?;
        self.enumeration.validate()?;
        self.filter.validate()?;
        self.log.validate()?;
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("filter.bypass_apps")
        .with_list_parse_key("filter.allowed_levels")
}
