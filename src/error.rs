use thiserror::Error;

use crate::domain::error::QueryError;
use crate::domain::TaskId;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("missing credential: set {var}")]
    MissingCredential { var: &'static str },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures of the remote extraction path. Each one ends the request.
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("task submission failed: {0}")]
    Submission(String),

    #[error("task {task_id} ended with status {status}")]
    TaskFailed { task_id: TaskId, status: String },

    #[error("task {task_id} did not finish within {waited_secs}s")]
    Timeout { task_id: TaskId, waited_secs: u64 },

    #[error("task {task_id} was cancelled while waiting")]
    Cancelled { task_id: TaskId },

    #[error("download failed: {0}")]
    Download(String),

    #[error("failed to parse artifact: {0}")]
    Parse(String),
}

/// Fallback store failures. The retrieval path treats these as misses.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed store response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}
