//! Fallback store selection and lookup settings.

use serde::Deserialize;

use crate::adapter::outbound::elastic::ElasticConfig;
use crate::application::RetrievalSettings;

/// Which [`ResultStore`](crate::port::ResultStore) backs the fallback tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Elastic,
    /// Process-local; results do not survive a restart.
    Memory,
}

/// `[store]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(flatten)]
    pub elastic: ElasticConfig,
}

/// `[fallback]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct FallbackConfig {
    /// Search radius around the query point, in kilometres.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    /// Only accept stored results whose date range covers the query start.
    #[serde(default = "default_match_date")]
    pub match_date: bool,
}

const fn default_radius_km() -> f64 {
    100.0
}

const fn default_match_date() -> bool {
    true
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
            match_date: default_match_date(),
        }
    }
}

impl FallbackConfig {
    #[must_use]
    pub fn retrieval_settings(&self) -> RetrievalSettings {
        RetrievalSettings {
            radius_km: self.radius_km,
            match_date: self.match_date,
        }
    }
}
