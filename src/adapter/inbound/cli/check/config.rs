use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::credentials::{
    APPEEARS_PASSWORD, APPEEARS_USERNAME, ELASTIC_API_KEY,
};
use crate::infrastructure::config::store::StoreBackend;
use crate::infrastructure::config::{Config, Credentials};

/// What `check config` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCheckReport {
    pub api_url: String,
    pub product: String,
    pub store: String,
    pub artifact_dir: String,
    pub cache_capacity: usize,
    pub missing_credentials: Vec<&'static str>,
    pub elastic_api_key: bool,
}

impl ConfigCheckReport {
    #[must_use]
    pub fn new(config: &Config, credentials: &Credentials) -> Self {
        let mut missing = Vec::new();
        if credentials.username.is_none() {
            missing.push(APPEEARS_USERNAME);
        }
        if credentials.password.is_none() {
            missing.push(APPEEARS_PASSWORD);
        }

        let store = match config.store.backend {
            StoreBackend::Elastic => format!(
                "elastic ({}/{})",
                config.store.elastic.url.trim_end_matches('/'),
                config.store.elastic.index
            ),
            StoreBackend::Memory => "memory".to_string(),
        };

        Self {
            api_url: config.appeears.api_url.clone(),
            product: format!("{} / {}", config.appeears.product, config.appeears.layer),
            store,
            artifact_dir: config.cache.artifact_dir().display().to_string(),
            cache_capacity: config.cache.capacity,
            missing_credentials: missing,
            elastic_api_key: credentials.elastic_api_key.is_some(),
        }
    }
}

/// Validate the configuration file and report which credentials are set.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;
    let report = ConfigCheckReport::new(&config, &Credentials::from_env());

    if output::is_json() {
        output::json_output(json!({
            "command": "check.config",
            "config": path.display().to_string(),
            "valid": true,
            "api_url": report.api_url,
            "product": report.product,
            "store": report.store,
            "artifact_dir": report.artifact_dir,
            "cache_capacity": report.cache_capacity,
            "missing_credentials": report.missing_credentials,
            "elastic_api_key": report.elastic_api_key,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("AppEEARS", &report.api_url);
    output::field("Product", &report.product);
    output::field("Store", &report.store);
    output::field("Artifacts", &report.artifact_dir);
    output::field("Cache size", report.cache_capacity);

    if report.missing_credentials.is_empty() {
        output::success("Earthdata credentials detected");
    } else {
        output::warning("Earthdata credentials incomplete (fetch will prompt or fail)");
        for var in &report.missing_credentials {
            output::field("Missing", var);
        }
    }
    if config.store.backend == StoreBackend::Elastic && !report.elastic_api_key {
        output::note(&format!("{ELASTIC_API_KEY} not set, connecting without authentication"));
    }

    output::success("Configuration check complete");
    Ok(())
}
