//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::outbound::appeears::AppeearsClient;
use crate::adapter::outbound::elastic::ElasticStore;
use crate::adapter::outbound::memory::MemoryStore;
use crate::application::cache::ArtifactCache;
use crate::application::extraction::TaskRunner;
use crate::application::Retriever;
use crate::error::Result;
use crate::infrastructure::config::store::StoreBackend;
use crate::infrastructure::config::{Config, Credentials};
use crate::port::{ExtractionService, ResultStore};

/// Build the configured fallback store and prepare its index.
///
/// An unreachable store is logged and still returned; lookups against it
/// degrade to misses.
///
/// # Errors
///
/// Returns an error if the store URL is invalid.
pub async fn build_store(config: &Config, credentials: &Credentials) -> Result<Arc<dyn ResultStore>> {
    let store: Arc<dyn ResultStore> = match config.store.backend {
        StoreBackend::Elastic => Arc::new(ElasticStore::from_config(
            &config.store.elastic,
            credentials.elastic_api_key.clone(),
        )?),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    match store.ensure_ready().await {
        Ok(()) => info!(store = store.store_name(), "Fallback store ready"),
        Err(e) => warn!(
            store = store.store_name(),
            error = %e,
            "Fallback store not ready, continuing without it"
        ),
    }
    Ok(store)
}

/// Build the extraction service client.
///
/// # Errors
///
/// Returns an error if Earthdata credentials are missing or the API URL is
/// invalid.
pub fn build_extraction(
    config: &Config,
    credentials: &Credentials,
) -> Result<Arc<dyn ExtractionService>> {
    let client = AppeearsClient::from_config(&config.appeears, credentials.earthdata()?)?;
    Ok(Arc::new(client))
}

/// Wire a [`Retriever`] from configuration and environment credentials.
///
/// # Errors
///
/// Returns an error if credentials are missing, a URL is invalid or the
/// artifact directory cannot be prepared.
pub async fn build_retriever(config: &Config, shutdown: watch::Receiver<bool>) -> Result<Retriever> {
    build_retriever_with(config, &Credentials::from_env(), shutdown).await
}

/// [`build_retriever`] with explicit credentials.
///
/// # Errors
///
/// See [`build_retriever`].
pub async fn build_retriever_with(
    config: &Config,
    credentials: &Credentials,
    shutdown: watch::Receiver<bool>,
) -> Result<Retriever> {
    let extraction = build_extraction(config, credentials)?;
    let store = build_store(config, credentials).await?;
    assemble(config, extraction, store, shutdown)
}

/// Assemble a [`Retriever`] around already-built collaborators.
///
/// # Errors
///
/// Returns an error if the artifact directory cannot be created or swept.
pub fn assemble(
    config: &Config,
    extraction: Arc<dyn ExtractionService>,
    store: Arc<dyn ResultStore>,
    shutdown: watch::Receiver<bool>,
) -> Result<Retriever> {
    let artifact_dir = config.cache.artifact_dir();
    let cache = Arc::new(ArtifactCache::open(&artifact_dir, config.cache.capacity)?);
    info!(
        dir = %artifact_dir.display(),
        capacity = config.cache.capacity,
        "Artifact cache ready"
    );

    let runner = TaskRunner::new(
        extraction,
        config.appeears.extraction_settings(),
        artifact_dir,
        shutdown,
    );
    Ok(Retriever::new(
        cache,
        store,
        runner,
        config.fallback.retrieval_settings(),
    ))
}
