//! Retrieval queries and their canonical cache keys.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::QueryError;
use super::geo::Coordinate;

/// Date format accepted at the inbound boundary and sent to AppEEARS.
pub const INBOUND_DATE_FORMAT: &str = "%m-%d-%Y";

/// ISO date format used for keys and store queries.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an `MM-DD-YYYY` date, returning `None` for anything else.
#[must_use]
pub fn parse_inbound_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), INBOUND_DATE_FORMAT).ok()
}

/// Convert an `MM-DD-YYYY` date to ISO `YYYY-MM-DD`.
///
/// Returns `None` when the input is not a valid calendar date in that form;
/// callers treat that as "no date filter usable".
#[must_use]
pub fn to_iso_date(date: &str) -> Option<String> {
    parse_inbound_date(date).map(|d| d.format(ISO_DATE_FORMAT).to_string())
}

/// An NDVI time-series request: one point and an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QueryFields")]
pub struct Query {
    coordinate: Coordinate,
    date_start: NaiveDate,
    date_end: NaiveDate,
}

#[derive(Deserialize)]
struct QueryFields {
    coordinate: Coordinate,
    date_start: NaiveDate,
    date_end: NaiveDate,
}

impl TryFrom<QueryFields> for Query {
    type Error = QueryError;

    fn try_from(fields: QueryFields) -> Result<Self, Self::Error> {
        Self::try_new(fields.coordinate, fields.date_start, fields.date_end)
    }
}

impl Query {
    /// Build a query, rejecting inverted date ranges.
    pub fn try_new(
        coordinate: Coordinate,
        date_start: NaiveDate,
        date_end: NaiveDate,
    ) -> Result<Self, QueryError> {
        if date_start > date_end {
            return Err(QueryError::InvalidRange {
                start: date_start.format(ISO_DATE_FORMAT).to_string(),
                end: date_end.format(ISO_DATE_FORMAT).to_string(),
            });
        }
        Ok(Self {
            coordinate,
            date_start,
            date_end,
        })
    }

    /// Parse a query from the string form the inbound interface receives.
    pub fn parse(
        latitude: &str,
        longitude: &str,
        date_start: &str,
        date_end: &str,
    ) -> Result<Self, QueryError> {
        let coordinate = Coordinate::parse(latitude, longitude)?;
        let start = parse_inbound_date(date_start).ok_or_else(|| QueryError::InvalidDate {
            field: "date_start",
            value: date_start.to_string(),
        })?;
        let end = parse_inbound_date(date_end).ok_or_else(|| QueryError::InvalidDate {
            field: "date_end",
            value: date_end.to_string(),
        })?;
        Self::try_new(coordinate, start, end)
    }

    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[must_use]
    pub const fn date_start(&self) -> NaiveDate {
        self.date_start
    }

    #[must_use]
    pub const fn date_end(&self) -> NaiveDate {
        self.date_end
    }

    /// Canonical key for this query.
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::from_query(self)
    }
}

/// Canonical encoding of a [`Query`] used for cache and store lookups.
///
/// Built from parsed values, so textual variants of the same coordinate
/// (`"-3.450"` vs `"-3.45"`) produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    fn from_query(query: &Query) -> Self {
        Self(format!(
            "lat={};lon={};start={};end={}",
            canonical_degrees(query.coordinate.lat()),
            canonical_degrees(query.coordinate.lon()),
            query.date_start.format(ISO_DATE_FORMAT),
            query.date_end.format(ISO_DATE_FORMAT),
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Shortest round-trip representation; folds -0.0 into 0.
fn canonical_degrees(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}
