//! Scripted [`ExtractionService`] for exercising the task lifecycle offline.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::fixtures;
use crate::domain::{BundleFile, Coordinate, ExtractionTask, FileId, TaskId, TaskStatus};
use crate::error::{Error, Result, RetrievalError};
use crate::port::{ExtractionService, TaskRequest};

/// An extraction service that replays a fixed status script.
///
/// Every task walks the same script; once it is exhausted the last status
/// repeats. Downloads write a small NDVI CSV for the submitted coordinate.
pub struct ScriptedExtraction {
    script: Vec<TaskStatus>,
    progress: Mutex<VecDeque<TaskStatus>>,
    status_failures: AtomicU32,
    submit_error: Option<String>,
    download_error: Option<String>,
    csv_output: bool,
    result_file_id: Option<String>,
    last_coordinate: Mutex<Option<Coordinate>>,
    submits: AtomicU32,
    statuses: AtomicU32,
    bundles: AtomicU32,
    downloads: AtomicU32,
}

impl ScriptedExtraction {
    /// A service whose tasks finish on the first poll.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: vec![TaskStatus::Done],
            progress: Mutex::new(VecDeque::new()),
            status_failures: AtomicU32::new(0),
            submit_error: None,
            download_error: None,
            csv_output: true,
            result_file_id: None,
            last_coordinate: Mutex::new(None),
            submits: AtomicU32::new(0),
            statuses: AtomicU32::new(0),
            bundles: AtomicU32::new(0),
            downloads: AtomicU32::new(0),
        }
    }

    /// Statuses reported by successive polls of each task.
    #[must_use]
    pub fn with_statuses(mut self, statuses: &[TaskStatus]) -> Self {
        if !statuses.is_empty() {
            self.script = statuses.to_vec();
        }
        self
    }

    /// Fail the next `n` status calls with a transport error.
    #[must_use]
    pub fn with_status_failures(self, n: u32) -> Self {
        self.status_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Reject submissions with `reason`.
    #[must_use]
    pub fn failing_submit(mut self, reason: &str) -> Self {
        self.submit_error = Some(reason.to_string());
        self
    }

    /// Fail the file transfer with `reason`.
    #[must_use]
    pub fn failing_download(mut self, reason: &str) -> Self {
        self.download_error = Some(reason.to_string());
        self
    }

    /// Produce a bundle with no CSV entry.
    #[must_use]
    pub fn without_csv_output(mut self) -> Self {
        self.csv_output = false;
        self
    }

    /// Advertise the CSV output under `file_id` instead of a generated id.
    #[must_use]
    pub fn with_result_file_id(mut self, file_id: &str) -> Self {
        self.result_file_id = Some(file_id.to_string());
        self
    }

    #[must_use]
    pub fn submit_count(&self) -> u32 {
        self.submits.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn status_count(&self) -> u32 {
        self.statuses.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn download_count(&self) -> u32 {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.submit_count()
            + self.status_count()
            + self.bundles.load(Ordering::SeqCst)
            + self.download_count()
    }
}

impl Default for ScriptedExtraction {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionService for ScriptedExtraction {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId> {
        let n = self.submits.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(reason) = &self.submit_error {
            return Err(RetrievalError::Submission(reason.clone()).into());
        }

        let coordinate = request.params.coordinates.first().and_then(|p| {
            let lat = p.latitude.parse().ok()?;
            let lon = p.longitude.parse().ok()?;
            Coordinate::try_new(lat, lon).ok()
        });
        *self.last_coordinate.lock() = coordinate;
        *self.progress.lock() = self.script.iter().copied().collect();

        Ok(TaskId::new(format!("task-{n}")))
    }

    async fn status(&self, task_id: &TaskId) -> Result<ExtractionTask> {
        self.statuses.fetch_add(1, Ordering::SeqCst);

        let remaining = self.status_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.status_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Io(std::io::Error::other("connection reset")));
        }

        let mut progress = self.progress.lock();
        let status = if progress.len() > 1 {
            progress.pop_front()
        } else {
            progress.front().copied()
        }
        .unwrap_or(TaskStatus::Unknown);

        let percent = match status {
            TaskStatus::Done => 100,
            TaskStatus::Processing => 50,
            _ => 0,
        };
        Ok(ExtractionTask {
            task_id: task_id.clone(),
            status,
            progress: percent,
        })
    }

    async fn bundle(&self, task_id: &TaskId) -> Result<Vec<BundleFile>> {
        self.bundles.fetch_add(1, Ordering::SeqCst);
        let mut files = vec![BundleFile {
            file_id: FileId::new(format!("{task_id}-readme")),
            file_name: "README.md".into(),
            file_type: "txt".into(),
        }];
        if self.csv_output {
            files.push(BundleFile {
                file_id: FileId::new(
                    self.result_file_id
                        .clone()
                        .unwrap_or_else(|| format!("{task_id}-results")),
                ),
                file_name: "NDVI-Multi-Point-Extract-MOD13A3-061-results.csv".into(),
                file_type: "csv".into(),
            });
        }
        Ok(files)
    }

    async fn download(&self, _task_id: &TaskId, _file_id: &FileId, dest: &Path) -> Result<u64> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.download_error {
            return Err(RetrievalError::Download(reason.clone()).into());
        }

        let submitted = *self.last_coordinate.lock();
        let coordinate = submitted.unwrap_or_else(fixtures::default_coordinate);
        let body = fixtures::ndvi_csv(coordinate, 3);
        tokio::fs::write(dest, body.as_bytes()).await?;
        Ok(body.len() as u64)
    }

    fn service_name(&self) -> &'static str {
        "scripted"
    }
}
