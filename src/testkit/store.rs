//! [`ResultStore`] doubles.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::domain::StoredResult;
use crate::error::{Result, StoreError};
use crate::port::{ProximityQuery, ResultStore};

/// A store that is always unreachable.
#[derive(Debug, Default)]
pub struct UnreachableStore {
    calls: AtomicU32,
}

impl UnreachableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("connection refused".into()).into())
    }
}

#[async_trait]
impl ResultStore for UnreachableStore {
    async fn ensure_ready(&self) -> Result<()> {
        self.fail()
    }

    async fn upsert(&self, _result: &StoredResult) -> Result<()> {
        self.fail()
    }

    async fn nearest(&self, _query: &ProximityQuery) -> Result<Option<StoredResult>> {
        self.fail()
    }

    fn store_name(&self) -> &'static str {
        "unreachable"
    }
}
