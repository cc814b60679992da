//! Elasticsearch connection configuration.

use serde::Deserialize;

/// Connection settings for the Elasticsearch result store.
#[derive(Debug, Clone, Deserialize)]
pub struct ElasticConfig {
    /// Cluster URL, e.g. `http://localhost:9200`.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_url() -> String {
    "http://localhost:9200".into()
}

fn default_index() -> String {
    "ndvi_results".into()
}

const fn default_timeout_ms() -> u64 {
    5_000
}

const fn default_connect_timeout_ms() -> u64 {
    2_000
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
