mod support;

use std::sync::Arc;
use std::time::Duration;

use ndvi_retriever::adapter::outbound::memory::MemoryStore;
use ndvi_retriever::application::extraction::ExtractionSettings;
use ndvi_retriever::application::{Answer, Source};
use ndvi_retriever::domain::{Query, StoredResult, TaskStatus};
use ndvi_retriever::error::{Error, RetrievalError};
use ndvi_retriever::port::ResultStore;
use ndvi_retriever::testkit::extraction::ScriptedExtraction;
use ndvi_retriever::testkit::fixtures::{coordinate, offset_north, record_at, year_query};
use ndvi_retriever::testkit::store::UnreachableStore;

use support::{retriever, retriever_with};

#[tokio::test]
async fn cold_query_runs_remote_task_and_persists_everywhere() {
    let store = Arc::new(MemoryStore::new());
    let t = retriever(
        ScriptedExtraction::new().with_statuses(&[TaskStatus::Pending, TaskStatus::Done]),
        store.clone(),
        5,
    );
    let query = year_query(-3.45, -60.12, 2022);

    let retrieval = t.retriever.retrieve(&query).await.unwrap();

    assert_eq!(retrieval.source, Source::Remote);
    assert_eq!(retrieval.record.len(), 3);
    assert_eq!(retrieval.record.location.coordinate(), coordinate(-3.45, -60.12));
    assert_eq!(t.service.submit_count(), 1);
    assert_eq!(t.service.status_count(), 2);
    assert_eq!(t.service.download_count(), 1);

    assert_eq!(t.retriever.cache().len(), 1);
    assert_eq!(t.artifact_files(), 1);
    let stored = store.get(&query.cache_key()).unwrap();
    assert_eq!(stored.record, retrieval.record);
}

#[tokio::test]
async fn repeated_query_is_served_from_cache() {
    let t = retriever(ScriptedExtraction::new(), Arc::new(MemoryStore::new()), 5);
    let query = year_query(12.5, 7.25, 2023);

    let first = t.retriever.retrieve(&query).await.unwrap();
    let calls = t.service.call_count();
    let second = t.retriever.retrieve(&query).await.unwrap();

    assert_eq!(second.source, Source::Cache);
    assert_eq!(second.record, first.record);
    assert_eq!(t.service.call_count(), calls);
}

#[tokio::test]
async fn cached_artifacts_survive_a_restart() {
    let first = retriever(ScriptedExtraction::new(), Arc::new(MemoryStore::new()), 5);
    let query = year_query(12.5, 7.25, 2023);
    let own_file = first.artifact_dir().join("my_own_data.csv");
    std::fs::write(&own_file, "keep me").unwrap();

    let cold = first.retriever.retrieve(&query).await.unwrap();
    assert_eq!(cold.source, Source::Remote);

    let second = first.restart(ScriptedExtraction::new(), Arc::new(MemoryStore::new()), 5);
    let warm = second.retriever.retrieve(&query).await.unwrap();

    assert_eq!(warm.source, Source::Cache);
    assert_eq!(warm.record, cold.record);
    assert_eq!(second.service.call_count(), 0);
    assert_eq!(std::fs::read_to_string(&own_file).unwrap(), "keep me");
}

#[tokio::test]
async fn nearby_point_is_served_from_store() {
    let store = Arc::new(MemoryStore::new());
    let original = year_query(-3.45, -60.12, 2022);
    let stored = StoredResult::new(&original, record_at(original.coordinate()));
    store.upsert(&stored).await.unwrap();

    let t = retriever(ScriptedExtraction::new(), store.clone(), 5);
    let nearby = Query::try_new(
        offset_north(original.coordinate(), 0.2),
        original.date_start(),
        original.date_end(),
    )
    .unwrap();

    let retrieval = t.retriever.retrieve(&nearby).await.unwrap();

    assert_eq!(retrieval.source, Source::Store);
    assert_eq!(retrieval.record, stored.record);
    assert_eq!(t.service.call_count(), 0);
    assert!(t.retriever.cache().is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn failed_task_returns_failure_and_changes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let t = retriever(
        ScriptedExtraction::new().with_statuses(&[TaskStatus::Processing, TaskStatus::Failed]),
        store.clone(),
        5,
    );

    let err = t
        .retriever
        .retrieve(&year_query(40.0, -3.7, 2022))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Retrieval(RetrievalError::TaskFailed { .. })
    ));
    assert_eq!(t.service.download_count(), 0);
    assert!(t.retriever.cache().is_empty());
    assert!(store.is_empty());
    assert_eq!(t.artifact_files(), 0);
}

#[tokio::test]
async fn failure_answer_carries_message() {
    let t = retriever(
        ScriptedExtraction::new().with_statuses(&[TaskStatus::Error]),
        Arc::new(MemoryStore::new()),
        5,
    );

    match t.retriever.answer(&year_query(40.0, -3.7, 2022)).await {
        Answer::NoData { message } => assert!(message.contains("No data fetched")),
        Answer::Data(r) => panic!("expected no data, got {:?}", r.source),
    }
}

#[tokio::test]
async fn download_failure_leaves_no_artifact() {
    let store = Arc::new(MemoryStore::new());
    let t = retriever(
        ScriptedExtraction::new().failing_download("HTTP 500"),
        store.clone(),
        5,
    );

    let err = t
        .retriever
        .retrieve(&year_query(1.0, 1.0, 2022))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Retrieval(RetrievalError::Download(_))));
    assert_eq!(t.artifact_files(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn unreachable_store_degrades_to_remote() {
    let store = Arc::new(UnreachableStore::new());
    let t = retriever(ScriptedExtraction::new(), store.clone(), 5);

    let retrieval = t
        .retriever
        .retrieve(&year_query(1.0, 1.0, 2022))
        .await
        .unwrap();

    assert_eq!(retrieval.source, Source::Remote);
    assert_eq!(t.retriever.cache().len(), 1);
    assert!(store.call_count() >= 2);
}

#[tokio::test]
async fn cache_eviction_removes_oldest_artifact() {
    let t = retriever(ScriptedExtraction::new(), Arc::new(MemoryStore::new()), 2);
    // Far enough apart that the store never answers for a neighbour.
    let a = year_query(10.0, 10.0, 2022);
    let b = year_query(20.0, 20.0, 2022);
    let c = year_query(30.0, 30.0, 2022);

    t.retriever.retrieve(&a).await.unwrap();
    t.retriever.retrieve(&b).await.unwrap();
    assert_eq!(t.artifact_files(), 2);

    t.retriever.retrieve(&c).await.unwrap();
    assert_eq!(t.retriever.cache().len(), 2);
    assert_eq!(t.artifact_files(), 2);
    assert!(t.retriever.cache().get(&a.cache_key()).is_none());

    // `a` is still in the store, so it no longer needs the remote service.
    let again = t.retriever.retrieve(&a).await.unwrap();
    assert_eq!(again.source, Source::Store);
    assert_eq!(t.service.submit_count(), 3);
}

#[tokio::test]
async fn polling_gives_up_after_max_wait() {
    let settings = ExtractionSettings {
        poll_interval: Duration::from_millis(2),
        max_wait: Duration::from_millis(30),
        ..ExtractionSettings::default()
    };
    let t = retriever_with(
        ScriptedExtraction::new().with_statuses(&[TaskStatus::Processing]),
        Arc::new(MemoryStore::new()),
        5,
        settings,
    );

    let err = t
        .retriever
        .retrieve(&year_query(0.5, 0.5, 2022))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Retrieval(RetrievalError::Timeout { .. })));
    assert!(t.retriever.cache().is_empty());
}

#[tokio::test]
async fn shutdown_cancels_waiting_request() {
    let settings = ExtractionSettings {
        poll_interval: Duration::from_millis(5),
        max_wait: Duration::from_secs(60),
        ..ExtractionSettings::default()
    };
    let t = retriever_with(
        ScriptedExtraction::new().with_statuses(&[TaskStatus::Processing]),
        Arc::new(MemoryStore::new()),
        5,
        settings,
    );

    let retriever = Arc::clone(&t.retriever);
    let pending = tokio::spawn(async move {
        retriever.retrieve(&year_query(0.5, 0.5, 2022)).await
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    t.shutdown.send(true).unwrap();

    let err = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("retrieval should stop promptly")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::Retrieval(RetrievalError::Cancelled { .. })));
    assert!(t.retriever.cache().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn identical_concurrent_queries_submit_once() {
    let t = retriever(
        ScriptedExtraction::new().with_statuses(&[
            TaskStatus::Pending,
            TaskStatus::Processing,
            TaskStatus::Done,
        ]),
        Arc::new(MemoryStore::new()),
        5,
    );
    let query = year_query(-15.8, -47.9, 2021);

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let retriever = Arc::clone(&t.retriever);
            tokio::spawn(async move { retriever.retrieve(&query).await })
        })
        .collect();

    for handle in handles {
        let retrieval = handle.await.unwrap().unwrap();
        assert_eq!(retrieval.record.len(), 3);
    }
    assert_eq!(t.service.submit_count(), 1);
    assert_eq!(t.artifact_files(), 1);
}
