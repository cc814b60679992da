//! Extraction service port: the asynchronous remote processing service.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::query::INBOUND_DATE_FORMAT;
use crate::domain::{BundleFile, ExtractionTask, FileId, Query, TaskId};
use crate::error::Result;

/// Product and layer requested for every extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLayer {
    pub product: String,
    pub layer: String,
}

impl Default for ProductLayer {
    fn default() -> Self {
        Self {
            product: "MOD13A3.061".into(),
            layer: "_1_km_monthly_NDVI".into(),
        }
    }
}

/// Point-extraction task request, serialized as the service expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRequest {
    pub task_type: String,
    pub task_name: String,
    pub params: TaskParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskParams {
    pub dates: Vec<DateRange>,
    pub layers: Vec<LayerSpec>,
    pub output: OutputSpec,
    pub coordinates: Vec<PointSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSpec {
    pub layer: String,
    pub product: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpec {
    pub format: FormatSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatSpec {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSpec {
    pub latitude: String,
    pub longitude: String,
}

impl TaskRequest {
    /// Build a CSV point-extraction request for `query`.
    #[must_use]
    pub fn point(query: &Query, task_name: &str, product: &ProductLayer) -> Self {
        let coordinate = query.coordinate();
        Self {
            task_type: "point".into(),
            task_name: task_name.into(),
            params: TaskParams {
                dates: vec![DateRange {
                    start_date: service_date(query.date_start()),
                    end_date: service_date(query.date_end()),
                }],
                layers: vec![LayerSpec {
                    layer: product.layer.clone(),
                    product: product.product.clone(),
                }],
                output: OutputSpec {
                    format: FormatSpec { kind: "csv".into() },
                },
                coordinates: vec![PointSpec {
                    latitude: coordinate.lat().to_string(),
                    longitude: coordinate.lon().to_string(),
                }],
            },
        }
    }
}

fn service_date(date: NaiveDate) -> String {
    date.format(INBOUND_DATE_FORMAT).to_string()
}

/// Remote asynchronous extraction service.
///
/// Implementations own authentication; callers never see tokens.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Submit a task and return the identifier the service assigned.
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId>;

    /// Current status of a submitted task.
    async fn status(&self, task_id: &TaskId) -> Result<ExtractionTask>;

    /// File manifest of a finished task.
    async fn bundle(&self, task_id: &TaskId) -> Result<Vec<BundleFile>>;

    /// Stream one bundle file to `dest`, returning the number of bytes written.
    ///
    /// On error no file is left at `dest`.
    async fn download(&self, task_id: &TaskId, file_id: &FileId, dest: &Path) -> Result<u64>;

    /// Name used in logs.
    fn service_name(&self) -> &'static str;
}
