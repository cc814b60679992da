//! AppEEARS API response types.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! responses is ignored.

use serde::Deserialize;

use crate::domain::{BundleFile, ExtractionTask, FileId, TaskId, TaskStatus};

/// `POST login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// `POST task`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub task_id: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
}

/// Progress is a bare percentage on some responses and an object with a
/// `summary` percentage on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProgressDto {
    Percent(f64),
    Detailed { summary: Option<f64> },
}

impl ProgressDto {
    fn percent(&self) -> u8 {
        let value = match self {
            Self::Percent(p) => *p,
            Self::Detailed { summary } => summary.unwrap_or(0.0),
        };
        value.clamp(0.0, 100.0).round() as u8
    }
}

/// `GET status/{task_id}`.
///
/// Once a task is done the service redirects this endpoint to the bundle
/// manifest, which carries `files` and no `status`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: Option<String>,
    pub progress: Option<ProgressDto>,
    pub files: Option<Vec<BundleFileDto>>,
}

impl StatusResponse {
    #[must_use]
    pub fn into_task(self, task_id: &TaskId) -> ExtractionTask {
        let status = match (&self.status, &self.files) {
            (Some(status), _) => TaskStatus::from_service(status),
            (None, Some(_)) => TaskStatus::Done,
            (None, None) => TaskStatus::Unknown,
        };
        let progress = match (&self.progress, status) {
            (Some(p), _) => p.percent(),
            (None, TaskStatus::Done) => 100,
            (None, _) => 0,
        };
        ExtractionTask {
            task_id: task_id.clone(),
            status,
            progress,
        }
    }
}

/// `GET bundle/{task_id}`.
#[derive(Debug, Deserialize)]
pub struct BundleResponse {
    #[serde(default)]
    pub files: Vec<BundleFileDto>,
}

#[derive(Debug, Deserialize)]
pub struct BundleFileDto {
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
}

impl From<BundleFileDto> for BundleFile {
    fn from(dto: BundleFileDto) -> Self {
        Self {
            file_id: FileId::new(dto.file_id),
            file_name: dto.file_name,
            file_type: dto.file_type,
        }
    }
}
