//! In-memory result store.
//!
//! Used in tests and when no search cluster is configured. Results live only
//! as long as the process.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{BoundingBox, CacheKey, StoredResult};
use crate::error::Result;
use crate::port::{ProximityQuery, ResultStore};

/// In-memory [`ResultStore`] ranking hits by great-circle distance.
#[derive(Debug, Default)]
pub struct MemoryStore {
    results: RwLock<HashMap<CacheKey, StoredResult>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<StoredResult> {
        self.results.read().get(key).cloned()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, result: &StoredResult) -> Result<()> {
        self.results
            .write()
            .insert(result.key.clone(), result.clone());
        Ok(())
    }

    async fn nearest(&self, query: &ProximityQuery) -> Result<Option<StoredResult>> {
        let bbox = BoundingBox::around(&query.center, query.radius_km);
        let results = self.results.read();

        let best = results
            .values()
            .filter(|r| query.date.map_or(true, |d| r.covers(d)))
            .filter(|r| bbox.contains(&r.location.coordinate()))
            .map(|r| (query.center.distance_km(&r.location.coordinate()), r))
            .filter(|(distance, _)| *distance <= query.radius_km)
            .min_by(|(a, ka), (b, kb)| a.total_cmp(b).then_with(|| ka.key.cmp(&kb.key)))
            .map(|(_, r)| r.clone());

        Ok(best)
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
