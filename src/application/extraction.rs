//! Remote extraction lifecycle: submit → poll → download.
//!
//! Polling is bounded by [`ExtractionSettings::max_wait`] and every wait
//! (sleep, status call, download) races the shutdown signal, so an abandoned
//! request never leaves a polling loop behind. The remote task itself needs
//! no cleanup; the service forgets it on its own.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::application::cache::is_plain_file_name;
use crate::domain::{BundleFile, ExtractionTask, FileId, Query, TaskId};
use crate::error::{Error, Result, RetrievalError};
use crate::port::{ExtractionService, ProductLayer, TaskRequest};

/// Tunables for one extraction.
#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub task_name: String,
    pub product: ProductLayer,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    /// Consecutive failed status calls tolerated before giving up.
    pub max_poll_failures: u32,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            task_name: "NDVI_Multi_Point_Extract".into(),
            product: ProductLayer::default(),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(30 * 60),
            max_poll_failures: 3,
        }
    }
}

/// A CSV artifact written to local storage by a finished task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub task_id: TaskId,
    pub file_id: FileId,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Drives a single extraction task to a downloaded artifact.
pub struct TaskRunner {
    service: Arc<dyn ExtractionService>,
    settings: ExtractionSettings,
    artifact_dir: PathBuf,
    shutdown: watch::Receiver<bool>,
}

impl TaskRunner {
    #[must_use]
    pub fn new(
        service: Arc<dyn ExtractionService>,
        settings: ExtractionSettings,
        artifact_dir: impl Into<PathBuf>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            settings,
            artifact_dir: artifact_dir.into(),
            shutdown,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Submit an extraction for `query`, wait for it and download its CSV.
    pub async fn run(&self, query: &Query) -> Result<DownloadedArtifact> {
        let request = TaskRequest::point(query, &self.settings.task_name, &self.settings.product);
        let task_id = self.submit(&request).await?;
        self.await_completion(&task_id).await?;
        self.download(&task_id).await
    }

    /// Submit a task. Any failure to obtain a task id is a submission failure.
    pub async fn submit(&self, request: &TaskRequest) -> Result<TaskId> {
        match self.service.submit(request).await {
            Ok(task_id) => {
                info!(
                    service = self.service.service_name(),
                    task_id = %task_id,
                    "Extraction task submitted"
                );
                Ok(task_id)
            }
            Err(Error::Retrieval(e)) => Err(e.into()),
            Err(e) => Err(RetrievalError::Submission(e.to_string()).into()),
        }
    }

    /// Poll until the task reaches a terminal state.
    ///
    /// Returns the final observation for `done`; `failed`/`error` become
    /// [`RetrievalError::TaskFailed`].
    pub async fn await_completion(&self, task_id: &TaskId) -> Result<ExtractionTask> {
        let started = Instant::now();
        let mut shutdown = self.shutdown.clone();
        let mut failures = 0u32;

        info!(task_id = %task_id, "Waiting for task to process");

        loop {
            if *shutdown.borrow() {
                return Err(cancelled(task_id));
            }

            tokio::select! {
                () = sleep(self.settings.poll_interval) => {}
                () = shutdown_signalled(&mut shutdown) => return Err(cancelled(task_id)),
            }

            let observed = tokio::select! {
                result = self.service.status(task_id) => result,
                () = shutdown_signalled(&mut shutdown) => return Err(cancelled(task_id)),
            };

            match observed {
                Ok(task) => {
                    failures = 0;
                    info!(
                        task_id = %task_id,
                        status = %task.status,
                        progress = task.progress,
                        "Task status"
                    );
                    if task.status.is_terminal() {
                        return finish(task);
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        task_id = %task_id,
                        error = %e,
                        failures,
                        max = self.settings.max_poll_failures,
                        "Status request failed"
                    );
                    if failures >= self.settings.max_poll_failures.max(1) {
                        return Err(e);
                    }
                }
            }

            let waited = started.elapsed();
            if waited >= self.settings.max_wait {
                warn!(task_id = %task_id, waited_secs = waited.as_secs(), "Task timed out");
                return Err(RetrievalError::Timeout {
                    task_id: task_id.clone(),
                    waited_secs: waited.as_secs(),
                }
                .into());
            }
        }
    }

    /// Fetch the manifest of a finished task and stream its CSV output.
    pub async fn download(&self, task_id: &TaskId) -> Result<DownloadedArtifact> {
        info!(task_id = %task_id, "Task done, retrieving file manifest");
        let files = self
            .service
            .bundle(task_id)
            .await
            .map_err(as_download_error)?;

        let csv = BundleFile::find_csv(&files).ok_or_else(|| {
            RetrievalError::Download(format!(
                "no CSV output in bundle for task {task_id} ({} files)",
                files.len()
            ))
        })?;

        // The id names a local file; it must not reach outside the artifact dir.
        if !is_plain_file_name(csv.file_id.as_str()) {
            warn!(task_id = %task_id, file_id = %csv.file_id, "Rejecting unsafe file id");
            return Err(RetrievalError::Download(format!(
                "unsafe file id {:?} in bundle for task {task_id}",
                csv.file_id.as_str()
            ))
            .into());
        }

        tokio::fs::create_dir_all(&self.artifact_dir).await?;
        let dest = self.artifact_dir.join(format!("{}.csv", csv.file_id));
        debug!(task_id = %task_id, file = %csv.file_name, dest = %dest.display(), "Starting download");

        let mut shutdown = self.shutdown.clone();
        let bytes = tokio::select! {
            result = self.service.download(task_id, &csv.file_id, &dest) => {
                result.map_err(as_download_error)?
            }
            () = shutdown_signalled(&mut shutdown) => return Err(cancelled(task_id)),
        };

        info!(task_id = %task_id, path = %dest.display(), bytes, "Download complete");
        Ok(DownloadedArtifact {
            task_id: task_id.clone(),
            file_id: csv.file_id.clone(),
            path: dest,
            bytes,
        })
    }
}

fn finish(task: ExtractionTask) -> Result<ExtractionTask> {
    if task.status.is_success() {
        return Ok(task);
    }
    warn!(task_id = %task.task_id, status = %task.status, "Task ended without output");
    Err(RetrievalError::TaskFailed {
        task_id: task.task_id,
        status: task.status.to_string(),
    }
    .into())
}

fn cancelled(task_id: &TaskId) -> Error {
    info!(task_id = %task_id, "Abandoning task on shutdown");
    RetrievalError::Cancelled {
        task_id: task_id.clone(),
    }
    .into()
}

fn as_download_error(err: Error) -> Error {
    match err {
        Error::Retrieval(e) => e.into(),
        other => RetrievalError::Download(other.to_string()).into(),
    }
}

/// Resolves once shutdown is signalled. Never resolves if the sender is gone.
async fn shutdown_signalled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
