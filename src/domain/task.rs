//! Remote extraction task identifiers and lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the extraction service on submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of one output file in a finished task's bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Lifecycle state of an extraction task as reported by polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Done,
    Failed,
    Error,
    Unknown,
}

impl TaskStatus {
    /// Map the service's status string. Unrecognized values are `Unknown`.
    #[must_use]
    pub fn from_service(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "pending" | "queued" => Self::Pending,
            "processing" => Self::Processing,
            "done" => Self::Done,
            "failed" => Self::Failed,
            "error" => Self::Error,
            _ => Self::Unknown,
        }
    }

    /// Polling stops once a task reaches one of these states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Error)
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Error => "error",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One status observation of a submitted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionTask {
    pub task_id: TaskId,
    pub status: TaskStatus,
    /// Percent complete, 0-100.
    pub progress: u8,
}

/// Entry in a finished task's file manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub file_id: FileId,
    pub file_name: String,
    pub file_type: String,
}

impl BundleFile {
    /// First CSV entry of a manifest.
    #[must_use]
    pub fn find_csv(files: &[BundleFile]) -> Option<&BundleFile> {
        files
            .iter()
            .find(|f| f.file_type.eq_ignore_ascii_case("csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(TaskStatus::from_service("queued"), TaskStatus::Pending);
        assert_eq!(TaskStatus::from_service("Processing"), TaskStatus::Processing);
        assert_eq!(TaskStatus::from_service("done"), TaskStatus::Done);
        assert_eq!(TaskStatus::from_service("archived"), TaskStatus::Unknown);
    }

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Error.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Unknown.is_terminal());
    }

    #[test]
    fn find_csv_takes_first_match() {
        let files = vec![
            BundleFile {
                file_id: FileId::new("a"),
                file_name: "README.md".into(),
                file_type: "txt".into(),
            },
            BundleFile {
                file_id: FileId::new("b"),
                file_name: "results.csv".into(),
                file_type: "csv".into(),
            },
            BundleFile {
                file_id: FileId::new("c"),
                file_name: "other.csv".into(),
                file_type: "csv".into(),
            },
        ];
        assert_eq!(BundleFile::find_csv(&files).unwrap().file_id.as_str(), "b");
        assert!(BundleFile::find_csv(&files[..1]).is_none());
    }
}
