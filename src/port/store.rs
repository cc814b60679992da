//! Fallback store port: persisted results queryable by proximity.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Coordinate, StoredResult};
use crate::error::Result;

/// A proximity lookup against the fallback store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityQuery {
    pub center: Coordinate,
    pub radius_km: f64,
    /// When set, only results whose date range covers this date match.
    pub date: Option<NaiveDate>,
}

/// Persisted collection of past results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Prepare the backing collection (index, mapping). Idempotent.
    async fn ensure_ready(&self) -> Result<()>;

    /// Insert or replace the result stored under `result.key`.
    async fn upsert(&self, result: &StoredResult) -> Result<()>;

    /// Highest-ranked (nearest) stored result within the radius.
    async fn nearest(&self, query: &ProximityQuery) -> Result<Option<StoredResult>>;

    /// Name used in logs.
    fn store_name(&self) -> &'static str;
}
