//! AppEEARS REST API client.
//!
//! Authenticates with Earthdata credentials, caches the bearer token and
//! logs in again once when the service rejects it. Bundle files are streamed
//! to a `.part` sibling of the destination and renamed when complete.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};
use url::Url;

use super::dto::{BundleResponse, LoginResponse, StatusResponse, SubmitResponse};
use super::settings::{AppeearsConfig, EarthdataCredentials};
use crate::domain::{BundleFile, ExtractionTask, FileId, TaskId};
use crate::error::{Result, RetrievalError};
use crate::port::{ExtractionService, TaskRequest};

/// Disk write granularity for bundle downloads.
const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// HTTP client for the AppEEARS API.
pub struct AppeearsClient {
    http: HttpClient,
    base_url: Url,
    credentials: EarthdataCredentials,
    request_timeout: Duration,
    token: RwLock<Option<String>>,
}

impl AppeearsClient {
    /// Build a client from the `[appeears]` section.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not a valid URL.
    pub fn from_config(config: &AppeearsConfig, credentials: EarthdataCredentials) -> Result<Self> {
        // The request timeout is applied per call so downloads are not cut off.
        let http = HttpClient::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Ok(Self {
            http,
            base_url: api_root(&config.api_url)?,
            credentials,
            request_timeout: Duration::from_millis(config.timeout_ms),
            token: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Exchange credentials for a fresh token and cache it.
    async fn login(&self) -> Result<String> {
        let url = self.endpoint("login")?;
        debug!(url = %url, "Logging in to AppEEARS");

        let response = self
            .http
            .post(url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| RetrievalError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Auth(format!("HTTP {}: {}", status.as_u16(), body)).into());
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Auth(format!("unreadable login response: {e}")))?;

        *self.token.write() = Some(login.token.clone());
        info!(user = %self.credentials.username, "Authenticated with AppEEARS");
        Ok(login.token)
    }

    async fn token(&self) -> Result<String> {
        let cached = self.token.read().clone();
        match cached {
            Some(token) => Ok(token),
            None => self.login().await,
        }
    }

    /// Send a bearer-authenticated request, logging in again once on 401.
    async fn send_authorized<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&HttpClient) -> RequestBuilder + Send + Sync,
    {
        let token = self.token().await?;
        let response = build(&self.http).bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("AppEEARS rejected token, logging in again");
        *self.token.write() = None;
        let token = self.login().await?;
        let response = build(&self.http).bearer_auth(&token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(RetrievalError::Auth("token rejected after re-login".into()).into());
        }
        Ok(response)
    }
}

#[async_trait]
impl ExtractionService for AppeearsClient {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId> {
        let url = self.endpoint("task")?;
        let timeout = self.request_timeout;
        let response = self
            .send_authorized(|http| http.post(url.clone()).json(request).timeout(timeout))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                RetrievalError::Submission(format!("HTTP {}: {}", status.as_u16(), body)).into(),
            );
        }

        let submitted: SubmitResponse = response.json().await?;
        let task_id = submitted.task_id.ok_or_else(|| {
            RetrievalError::Submission(
                submitted
                    .message
                    .unwrap_or_else(|| "response carried no task_id".into()),
            )
        })?;

        info!(
            task_id = %task_id,
            status = submitted.status.as_deref().unwrap_or("unknown"),
            "Submitted extraction task"
        );
        Ok(TaskId::new(task_id))
    }

    async fn status(&self, task_id: &TaskId) -> Result<ExtractionTask> {
        let url = self.endpoint(&format!("status/{task_id}"))?;
        let timeout = self.request_timeout;
        let response = self
            .send_authorized(|http| http.get(url.clone()).timeout(timeout))
            .await?
            .error_for_status()?;

        let parsed: StatusResponse = response.json().await?;
        Ok(parsed.into_task(task_id))
    }

    async fn bundle(&self, task_id: &TaskId) -> Result<Vec<BundleFile>> {
        let url = self.endpoint(&format!("bundle/{task_id}"))?;
        let timeout = self.request_timeout;
        let response = self
            .send_authorized(|http| http.get(url.clone()).timeout(timeout))
            .await?
            .error_for_status()?;

        let bundle: BundleResponse = response.json().await?;
        debug!(task_id = %task_id, files = bundle.files.len(), "Fetched bundle manifest");
        Ok(bundle.files.into_iter().map(BundleFile::from).collect())
    }

    async fn download(&self, task_id: &TaskId, file_id: &FileId, dest: &Path) -> Result<u64> {
        let url = self.endpoint(&format!("bundle/{task_id}/{file_id}"))?;
        let mut response = self.send_authorized(|http| http.get(url.clone())).await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RetrievalError::Download(format!(
                "HTTP {} fetching file {file_id}",
                status.as_u16()
            ))
            .into());
        }

        let mut partial = PartialFile::create(dest).await?;
        while let Some(chunk) = response.chunk().await? {
            if chunk.is_empty() {
                continue;
            }
            partial.write(&chunk).await?;
        }
        let bytes = partial.commit().await?;

        info!(task_id = %task_id, file_id = %file_id, bytes, path = %dest.display(), "Downloaded bundle file");
        Ok(bytes)
    }

    fn service_name(&self) -> &'static str {
        "appeears"
    }
}

/// Normalize the API root so relative endpoints join beneath it.
fn api_root(raw: &str) -> Result<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

/// Path a download is written to before it is complete.
#[must_use]
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

/// A download in progress. Removed on drop unless committed.
struct PartialFile {
    part: PathBuf,
    dest: PathBuf,
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl PartialFile {
    async fn create(dest: &Path) -> Result<Self> {
        let part = partial_path(dest);
        let file = File::create(&part).await?;
        Ok(Self {
            part,
            dest: dest.to_path_buf(),
            writer: Some(BufWriter::with_capacity(DOWNLOAD_CHUNK_BYTES, file)),
            written: 0,
        })
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(bytes).await?;
            self.written += bytes.len() as u64;
        }
        Ok(())
    }

    /// Flush, close and move the file to its destination.
    async fn commit(mut self) -> Result<u64> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().await?;
            writer.into_inner().sync_all().await?;
        }
        tokio::fs::rename(&self.part, &self.dest).await?;
        // Nothing left at `part` for drop to clean up.
        self.part = PathBuf::new();
        Ok(self.written)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.part.as_os_str().is_empty() {
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.part) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.part.display(), error = %err, "Failed to remove partial download");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> AppeearsClient {
        let config = AppeearsConfig {
            api_url: api_url.into(),
            ..AppeearsConfig::default()
        };
        let credentials = EarthdataCredentials {
            username: "user".into(),
            password: "secret".into(),
        };
        AppeearsClient::from_config(&config, credentials).unwrap()
    }

    #[test]
    fn endpoints_join_under_api_root() {
        let with_slash = client("https://appeears.example.test/api/");
        let without_slash = client("https://appeears.example.test/api");

        for c in [with_slash, without_slash] {
            assert_eq!(
                c.endpoint("status/abc").unwrap().as_str(),
                "https://appeears.example.test/api/status/abc"
            );
        }
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let config = AppeearsConfig {
            api_url: "not a url".into(),
            ..AppeearsConfig::default()
        };
        let credentials = EarthdataCredentials {
            username: "u".into(),
            password: "p".into(),
        };
        assert!(AppeearsClient::from_config(&config, credentials).is_err());
    }

    #[test]
    fn partial_path_appends_suffix() {
        let part = partial_path(Path::new("/tmp/cache/abc.csv"));
        assert_eq!(part, PathBuf::from("/tmp/cache/abc.csv.part"));
    }

    #[tokio::test]
    async fn committed_download_lands_at_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.csv");

        let mut partial = PartialFile::create(&dest).await.unwrap();
        partial.write(b"a,b\n").await.unwrap();
        partial.write(b"1,2\n").await.unwrap();
        let bytes = partial.commit().await.unwrap();

        assert_eq!(bytes, 8);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "a,b\n1,2\n");
        assert!(!partial_path(&dest).exists());
    }

    #[tokio::test]
    async fn abandoned_download_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("file.csv");

        {
            let mut partial = PartialFile::create(&dest).await.unwrap();
            partial.write(b"half").await.unwrap();
            assert!(partial_path(&dest).exists());
        }

        assert!(!partial_path(&dest).exists());
        assert!(!dest.exists());
    }
}
