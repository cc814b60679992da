//! Materialized extraction results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;
use super::query::{CacheKey, Query};

/// Rows of an ingested CSV artifact plus the point they describe.
///
/// `rows[i][j]` is the value of column `columns[j]` in row `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub location: GeoPoint,
}

impl ResultRecord {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }

    /// Value of `column` in row `row`.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Rows as column → value JSON objects.
    #[must_use]
    pub fn to_json_rows(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(c, v)| (c.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect()
    }
}

/// A result as persisted in the fallback store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    pub key: CacheKey,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub location: GeoPoint,
    pub record: ResultRecord,
}

impl StoredResult {
    #[must_use]
    pub fn new(query: &Query, record: ResultRecord) -> Self {
        Self {
            key: query.cache_key(),
            date_start: query.date_start(),
            date_end: query.date_end(),
            location: record.location,
            record,
        }
    }

    /// Whether the stored date range covers `date`.
    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.date_start <= date && date <= self.date_end
    }
}
