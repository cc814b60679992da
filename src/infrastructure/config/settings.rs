//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Every section is optional; secrets are read from the environment by
//! [`Credentials`](super::credentials::Credentials), never from the file.
//!
//! # Example
//!
//! ```no_run
//! use ndvi_retriever::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::cache::CacheConfig;
use super::logging::LoggingConfig;
use super::store::{FallbackConfig, StoreBackend, StoreConfig};
use crate::adapter::outbound::appeears::AppeearsConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote extraction service.
    #[serde(default)]
    pub appeears: AppeearsConfig,

    /// Fallback store backend and connection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Proximity lookup tunables.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Local artifact cache.
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load from `path` if it exists, otherwise use defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or is invalid.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let appeears = &self.appeears;
        if appeears.api_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "appeears.api_url" }.into());
        }
        if url::Url::parse(&appeears.api_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "appeears.api_url",
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }
        if appeears.product.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "appeears.product" }.into());
        }
        if appeears.layer.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "appeears.layer" }.into());
        }
        if appeears.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "appeears.poll_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if appeears.max_wait_secs < appeears.poll_interval_secs {
            return Err(ConfigError::InvalidValue {
                field: "appeears.max_wait_secs",
                reason: "must be >= poll_interval_secs".to_string(),
            }
            .into());
        }
        if appeears.max_poll_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "appeears.max_poll_failures",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.store.backend == StoreBackend::Elastic {
            if self.store.elastic.url.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "store.url" }.into());
            }
            if self.store.elastic.index.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "store.index" }.into());
            }
        }

        let radius = self.fallback.radius_km;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "fallback.radius_km",
                reason: "must be a positive number of kilometres".to_string(),
            }
            .into());
        }

        if self.cache.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
