//! Domain types: queries, coordinates, extraction tasks and result records.
//!
//! Nothing in this module performs I/O.

pub mod error;
pub mod geo;
pub mod query;
pub mod record;
pub mod task;

pub use error::QueryError;
pub use geo::{BoundingBox, Coordinate, GeoPoint, EARTH_RADIUS_KM};
pub use query::{parse_inbound_date, to_iso_date, CacheKey, Query};
pub use record::{ResultRecord, StoredResult};
pub use task::{BundleFile, ExtractionTask, FileId, TaskId, TaskStatus};
