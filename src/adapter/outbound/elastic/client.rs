//! Elasticsearch-backed result store.
//!
//! Results are indexed under their cache key, so re-storing the same query
//! replaces the earlier document. Lookups run a `geo_distance` filter sorted
//! by distance from the query point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use super::dto::{index_mapping, nearest_query, ErrorResponse, SearchResponse, INDEX_EXISTS};
use super::settings::ElasticConfig;
use crate::domain::{CacheKey, StoredResult};
use crate::error::{Result, StoreError};
use crate::port::{ProximityQuery, ResultStore};

/// HTTP client for one Elasticsearch index.
pub struct ElasticStore {
    http: HttpClient,
    base_url: Url,
    index: String,
    api_key: Option<String>,
}

impl ElasticStore {
    /// Build a store from its connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid base URL.
    pub fn from_config(config: &ElasticConfig, api_key: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        let base_url = Url::parse(&config.url)?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!("not a base URL: {}", config.url)).into());
        }

        Ok(Self {
            http,
            base_url,
            index: config.index.clone(),
            api_key,
        })
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    /// URL of `segments` under the index, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Unavailable("store URL cannot hold a path".into()))?
            .pop_if_empty()
            .push(&self.index)
            .extend(segments);
        Ok(url)
    }

    fn document_url(&self, key: &CacheKey) -> Result<Url> {
        self.url(&["_doc", key.as_str()])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("ApiKey {key}")),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()).into())
    }
}

async fn rejected(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Rejected { status, body }
}

fn already_exists(body: &str) -> bool {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.kind == INDEX_EXISTS)
        .unwrap_or(false)
}

#[async_trait]
impl ResultStore for ElasticStore {
    async fn ensure_ready(&self) -> Result<()> {
        let url = self.url(&[])?;
        let response = self
            .send(self.request(Method::PUT, url).json(&index_mapping()))
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(index = %self.index, "Created result index");
            return Ok(());
        }
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if already_exists(&body) {
                debug!(index = %self.index, "Result index already exists");
                return Ok(());
            }
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        Err(rejected(response).await.into())
    }

    async fn upsert(&self, result: &StoredResult) -> Result<()> {
        let url = self.document_url(&result.key)?;
        let response = self.send(self.request(Method::PUT, url).json(result)).await?;
        if !response.status().is_success() {
            return Err(rejected(response).await.into());
        }
        debug!(index = %self.index, key = %result.key, "Stored result");
        Ok(())
    }

    async fn nearest(&self, query: &ProximityQuery) -> Result<Option<StoredResult>> {
        let url = self.url(&["_search"])?;
        let response = self
            .send(self.request(Method::POST, url).json(&nearest_query(query)))
            .await?;
        if !response.status().is_success() {
            return Err(rejected(response).await.into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        let parsed: SearchResponse =
            serde_json::from_value(body).map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(parsed.into_nearest())
    }

    fn store_name(&self) -> &'static str {
        "elasticsearch"
    }
}
