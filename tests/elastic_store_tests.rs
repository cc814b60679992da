//! Elasticsearch store behaviour against a local stub cluster.

mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use ndvi_retriever::adapter::outbound::elastic::{ElasticConfig, ElasticStore};
use ndvi_retriever::domain::StoredResult;
use ndvi_retriever::error::{Error, StoreError};
use ndvi_retriever::port::{ProximityQuery, ResultStore};
use ndvi_retriever::testkit::fixtures::{coordinate, record_at, year_query};
use parking_lot::Mutex;
use serde_json::json;
use support::http::{Request, Response, StubServer};

fn store(server: &StubServer, api_key: Option<&str>) -> ElasticStore {
    let config = ElasticConfig {
        url: server.origin.clone(),
        index: "ndvi_test".into(),
        ..ElasticConfig::default()
    };
    ElasticStore::from_config(&config, api_key.map(str::to_string)).unwrap()
}

fn stored() -> StoredResult {
    let query = year_query(-3.45, -60.12, 2022);
    StoredResult::new(&query, record_at(query.coordinate()))
}

#[tokio::test]
async fn existing_index_counts_as_ready() {
    let server = StubServer::start(|req| {
        assert_eq!((req.method.as_str(), req.path.as_str()), ("PUT", "/ndvi_test"));
        Response::json(
            400,
            json!({
                "error": { "type": "resource_already_exists_exception", "reason": "exists" },
                "status": 400
            }),
        )
    })
    .await;

    store(&server, None).ensure_ready().await.unwrap();
}

#[tokio::test]
async fn other_index_errors_are_rejections() {
    let server = StubServer::start(|_| {
        Response::json(400, json!({ "error": { "type": "mapper_parsing_exception" } }))
    })
    .await;

    let err = store(&server, None).ensure_ready().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Store(StoreError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn upsert_puts_document_under_cache_key() {
    let seen: Arc<Mutex<Vec<Request>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let server = StubServer::start(move |req| {
        log.lock().push(req.clone());
        Response::json(201, json!({ "result": "created" }))
    })
    .await;

    let result = stored();
    store(&server, Some("secret")).upsert(&result).await.unwrap();

    let requests = seen.lock();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, "PUT");
    assert!(req.path.starts_with("/ndvi_test/_doc/"));
    assert_eq!(req.header("authorization"), Some("ApiKey secret"));
    assert_eq!(req.json()["key"], result.key.as_str());
    assert_eq!(req.json()["location"], json!([-60.12, -3.45]));
}

#[tokio::test]
async fn nearest_returns_first_hit() {
    let result = stored();
    let source = serde_json::to_value(&result).unwrap();
    let server = StubServer::start(move |req| {
        assert_eq!((req.method.as_str(), req.path.as_str()), ("POST", "/ndvi_test/_search"));
        let body = req.json();
        assert_eq!(body["size"], 1);
        assert_eq!(body["query"]["bool"]["filter"][0]["geo_distance"]["distance"], "50km");
        assert_eq!(body["query"]["bool"]["filter"][1]["range"]["date_start"]["lte"], "2022-06-01");
        Response::json(200, json!({ "hits": { "hits": [{ "_id": "a", "_source": source }] } }))
    })
    .await;

    let found = store(&server, None)
        .nearest(&ProximityQuery {
            center: coordinate(-3.5, -60.0),
            radius_km: 50.0,
            date: NaiveDate::from_ymd_opt(2022, 6, 1),
        })
        .await
        .unwrap();

    assert_eq!(found, Some(result));
}

#[tokio::test]
async fn garbled_search_response_is_malformed() {
    let server = StubServer::start(|_| Response::json(200, json!({ "took": 1 }))).await;

    let err = store(&server, None)
        .nearest(&ProximityQuery {
            center: coordinate(0.0, 0.0),
            radius_km: 10.0,
            date: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Malformed(_))));
}

#[tokio::test]
async fn unreachable_cluster_is_unavailable() {
    // Bind and immediately release a port so nothing is listening on it.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ElasticConfig {
        url: format!("http://127.0.0.1:{port}"),
        ..ElasticConfig::default()
    };
    let store = ElasticStore::from_config(&config, None).unwrap();

    let err = store.upsert(&stored()).await.unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Unavailable(_))));
}
