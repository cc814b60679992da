#![allow(dead_code)]

pub mod architecture;
pub mod http;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use ndvi_retriever::application::cache::ArtifactCache;
use ndvi_retriever::application::extraction::{ExtractionSettings, TaskRunner};
use ndvi_retriever::application::{RetrievalSettings, Retriever};
use ndvi_retriever::port::ResultStore;
use ndvi_retriever::testkit::extraction::ScriptedExtraction;

/// A retriever over a scripted extraction service and a temp artifact dir.
pub struct TestRetriever {
    pub retriever: Arc<Retriever>,
    pub service: Arc<ScriptedExtraction>,
    pub shutdown: watch::Sender<bool>,
    pub dir: tempfile::TempDir,
}

impl TestRetriever {
    pub fn artifact_dir(&self) -> &Path {
        self.dir.path()
    }

    /// CSV files currently on disk in the artifact directory.
    pub fn artifact_files(&self) -> usize {
        std::fs::read_dir(self.dir.path())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Drop this retriever and start a new one over the same artifact
    /// directory, as a second process would.
    pub fn restart(
        self,
        service: ScriptedExtraction,
        store: Arc<dyn ResultStore>,
        capacity: usize,
    ) -> TestRetriever {
        let TestRetriever { retriever, dir, .. } = self;
        drop(retriever);
        build(dir, service, store, capacity, fast_settings())
    }
}

pub fn fast_settings() -> ExtractionSettings {
    ExtractionSettings {
        poll_interval: Duration::from_millis(1),
        max_wait: Duration::from_secs(5),
        ..ExtractionSettings::default()
    }
}

pub fn retriever(
    service: ScriptedExtraction,
    store: Arc<dyn ResultStore>,
    capacity: usize,
) -> TestRetriever {
    retriever_with(service, store, capacity, fast_settings())
}

pub fn retriever_with(
    service: ScriptedExtraction,
    store: Arc<dyn ResultStore>,
    capacity: usize,
    settings: ExtractionSettings,
) -> TestRetriever {
    build(tempfile::tempdir().expect("temp dir"), service, store, capacity, settings)
}

fn build(
    dir: tempfile::TempDir,
    service: ScriptedExtraction,
    store: Arc<dyn ResultStore>,
    capacity: usize,
    settings: ExtractionSettings,
) -> TestRetriever {
    let service = Arc::new(service);
    let (shutdown, rx) = watch::channel(false);
    let cache = Arc::new(ArtifactCache::open(dir.path(), capacity).expect("open cache"));
    let runner = TaskRunner::new(service.clone(), settings, dir.path(), rx);
    let retriever = Retriever::new(cache, store, runner, RetrievalSettings::default());

    TestRetriever {
        retriever: Arc::new(retriever),
        service,
        shutdown,
        dir,
    }
}
