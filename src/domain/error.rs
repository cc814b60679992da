//! Validation errors for inbound queries.
//!
//! Returned by the `try_new`/`parse` constructors in [`super::query`] and
//! [`super::geo`] when a request cannot be turned into a [`super::Query`].

use thiserror::Error;

/// Errors that occur when a query violates its construction invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// Latitude or longitude did not parse or is out of range.
    #[error("invalid {field}: {value:?}")]
    InvalidCoordinate {
        /// Which coordinate component was rejected.
        field: &'static str,
        /// The raw value supplied by the caller.
        value: String,
    },

    /// A date was not in `MM-DD-YYYY` form or is not a calendar date.
    #[error("invalid {field}: {value:?} (expected MM-DD-YYYY)")]
    InvalidDate {
        field: &'static str,
        value: String,
    },

    /// The start date falls after the end date.
    #[error("date range is inverted: {start} is after {end}")]
    InvalidRange { start: String, end: String },
}
