//! Retrieval coordination: cache, then fallback store, then remote extraction.
//!
//! Concurrent requests for the same key are serialized on a per-key lock so
//! they share one remote task; the waiter finds the first request's artifact
//! in the cache.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::cache::{Artifact, ArtifactCache};
use super::extraction::TaskRunner;
use super::materialize::materialize;
use crate::domain::{CacheKey, Coordinate, Query, ResultRecord, StoredResult, TaskId};
use crate::error::Result;
use crate::port::{ProximityQuery, ResultStore};

/// Message returned when a request produced no records.
pub const NO_DATA_MESSAGE: &str = "No data fetched";

/// Which tier answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Store,
    Remote,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Store => write!(f, "store"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// A successful retrieval.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub source: Source,
    pub key: CacheKey,
    /// Remote task that produced the record, for [`Source::Remote`].
    pub task_id: Option<TaskId>,
    pub record: ResultRecord,
}

/// What the inbound side receives for a query: records, or a message.
#[derive(Debug, Clone)]
pub enum Answer {
    Data(Retrieval),
    NoData { message: String },
}

/// Fallback lookup tunables.
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub radius_km: f64,
    /// Require stored results to cover the query's start date.
    pub match_date: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            radius_km: 100.0,
            match_date: true,
        }
    }
}

/// Answers NDVI queries from the cheapest tier that has them.
pub struct Retriever {
    cache: Arc<ArtifactCache>,
    store: Arc<dyn ResultStore>,
    runner: TaskRunner,
    settings: RetrievalSettings,
    in_flight: DashMap<CacheKey, Arc<Mutex<()>>>,
}

impl Retriever {
    #[must_use]
    pub fn new(
        cache: Arc<ArtifactCache>,
        store: Arc<dyn ResultStore>,
        runner: TaskRunner,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            cache,
            store,
            runner,
            settings,
            in_flight: DashMap::new(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    #[must_use]
    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Resolve `query` through cache, fallback store and remote extraction.
    ///
    /// # Errors
    ///
    /// Returns the remote failure when neither local tier has the data.
    pub async fn retrieve(&self, query: &Query) -> Result<Retrieval> {
        let key = query.cache_key();
        let span = info_span!("retrieve", request_id = %Uuid::new_v4(), key = %key);
        self.resolve(query, key).instrument(span).await
    }

    /// Like [`Self::retrieve`], folding failures into [`Answer::NoData`].
    pub async fn answer(&self, query: &Query) -> Answer {
        match self.retrieve(query).await {
            Ok(retrieval) if retrieval.record.is_empty() => Answer::NoData {
                message: NO_DATA_MESSAGE.into(),
            },
            Ok(retrieval) => Answer::Data(retrieval),
            Err(e) => {
                warn!(error = %e, "Retrieval failed");
                Answer::NoData {
                    message: format!("{NO_DATA_MESSAGE}: {e}"),
                }
            }
        }
    }

    /// Nearest stored result within the configured radius.
    ///
    /// Store failures are logged and reported as a miss.
    pub async fn lookup(&self, center: Coordinate, date: Option<NaiveDate>) -> Option<StoredResult> {
        let query = ProximityQuery {
            center,
            radius_km: self.settings.radius_km,
            date,
        };
        nearest_or_miss(self.store.as_ref(), &query).await
    }

    async fn resolve(&self, query: &Query, key: CacheKey) -> Result<Retrieval> {
        if let Some(hit) = self.from_cache(query, &key) {
            return Ok(hit);
        }
        if let Some(hit) = self.from_store(query, &key).await {
            return Ok(hit);
        }

        let flight = Flight::join(&self.in_flight, &key);
        let _turn = flight.lock.lock().await;
        // An earlier holder of this key may have filled the cache.
        if let Some(hit) = self.from_cache(query, &key) {
            return Ok(hit);
        }
        self.fetch_remote(query, key).await
    }

    fn from_cache(&self, query: &Query, key: &CacheKey) -> Option<Retrieval> {
        let artifact = self.cache.get(key)?;
        match materialize(artifact.path(), query.coordinate()) {
            Ok(record) => {
                info!(rows = record.len(), "Cache hit");
                Some(Retrieval {
                    source: Source::Cache,
                    key: key.clone(),
                    task_id: None,
                    record,
                })
            }
            Err(e) => {
                warn!(
                    path = %artifact.path().display(),
                    error = %e,
                    "Cached artifact unreadable, dropping entry"
                );
                self.cache.invalidate(key);
                None
            }
        }
    }

    async fn from_store(&self, query: &Query, key: &CacheKey) -> Option<Retrieval> {
        let date = self.settings.match_date.then(|| query.date_start());
        let hit = self.lookup(query.coordinate(), date).await?;
        Some(Retrieval {
            source: Source::Store,
            key: key.clone(),
            task_id: None,
            record: hit.record,
        })
    }

    async fn fetch_remote(&self, query: &Query, key: CacheKey) -> Result<Retrieval> {
        info!("No local data, requesting remote extraction");
        let downloaded = self.runner.run(query).await?;

        // Owned from here on: the file goes away with the handle on any error.
        let artifact = Artifact::adopt(&downloaded.path);
        let record = materialize(artifact.path(), query.coordinate())?;

        if let Some(displaced) = self.cache.insert(key.clone(), artifact) {
            debug!(path = %displaced.display(), "Evicted artifact");
        }

        let stored = StoredResult::new(query, record.clone());
        if let Err(e) = self.store.upsert(&stored).await {
            warn!(
                store = self.store.store_name(),
                error = %e,
                "Failed to persist result to fallback store"
            );
        }

        info!(
            task_id = %downloaded.task_id,
            rows = record.len(),
            "Remote extraction complete"
        );
        Ok(Retrieval {
            source: Source::Remote,
            key,
            task_id: Some(downloaded.task_id),
            record,
        })
    }
}

/// Membership in the set of requests for one key.
///
/// The map entry is removed by the last member to leave.
struct Flight<'a> {
    map: &'a DashMap<CacheKey, Arc<Mutex<()>>>,
    key: CacheKey,
    lock: Arc<Mutex<()>>,
}

impl<'a> Flight<'a> {
    fn join(map: &'a DashMap<CacheKey, Arc<Mutex<()>>>, key: &CacheKey) -> Self {
        let lock = Arc::clone(map.entry(key.clone()).or_default().value());
        Self {
            map,
            key: key.clone(),
            lock,
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        // Two references left means only this member and the map hold it.
        self.map
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

/// Nearest stored result for `query`, with store failures logged and
/// reported as a miss.
pub async fn nearest_or_miss(store: &dyn ResultStore, query: &ProximityQuery) -> Option<StoredResult> {
    match store.nearest(query).await {
        Ok(Some(hit)) => {
            info!(
                store = store.store_name(),
                key = %hit.key,
                distance_km = query.center.distance_km(&hit.location.coordinate()),
                "Fallback store hit"
            );
            Some(hit)
        }
        Ok(None) => {
            debug!(store = store.store_name(), "Fallback store miss");
            None
        }
        Err(e) => {
            warn!(
                store = store.store_name(),
                error = %e,
                "Fallback store lookup failed, treating as miss"
            );
            None
        }
    }
}
