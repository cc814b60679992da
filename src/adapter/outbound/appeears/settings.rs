//! AppEEARS connection and task configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::application::extraction::ExtractionSettings;
use crate::port::ProductLayer;

/// `[appeears]` section of the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppeearsConfig {
    /// API root, e.g. `https://appeears.earthdatacloud.nasa.gov/api/`.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_product")]
    pub product: String,
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default = "default_task_name")]
    pub task_name: String,
    /// Seconds between status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Give up on a task after this many seconds.
    #[serde(default = "default_max_wait_secs")]
    pub max_wait_secs: u64,
    /// Consecutive failed status calls tolerated.
    #[serde(default = "default_max_poll_failures")]
    pub max_poll_failures: u32,
    /// Per-request timeout in milliseconds. Downloads are exempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_api_url() -> String {
    "https://appeears.earthdatacloud.nasa.gov/api/".into()
}

fn default_product() -> String {
    "MOD13A3.061".into()
}

fn default_layer() -> String {
    "_1_km_monthly_NDVI".into()
}

fn default_task_name() -> String {
    "NDVI_Multi_Point_Extract".into()
}

const fn default_poll_interval_secs() -> u64 {
    5
}

const fn default_max_wait_secs() -> u64 {
    30 * 60
}

const fn default_max_poll_failures() -> u32 {
    3
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for AppeearsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            product: default_product(),
            layer: default_layer(),
            task_name: default_task_name(),
            poll_interval_secs: default_poll_interval_secs(),
            max_wait_secs: default_max_wait_secs(),
            max_poll_failures: default_max_poll_failures(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl AppeearsConfig {
    /// Task lifecycle settings derived from this section.
    #[must_use]
    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            task_name: self.task_name.clone(),
            product: ProductLayer {
                product: self.product.clone(),
                layer: self.layer.clone(),
            },
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
            max_poll_failures: self.max_poll_failures,
        }
    }
}

/// NASA Earthdata login, resolved from the environment at startup.
#[derive(Clone)]
pub struct EarthdataCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for EarthdataCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EarthdataCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config: AppeearsConfig = toml::from_str("").unwrap();
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.product, "MOD13A3.061");

        let settings = config.extraction_settings();
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.product.layer, "_1_km_monthly_NDVI");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = EarthdataCredentials {
            username: "user".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }
}
