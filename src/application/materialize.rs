//! CSV artifact → [`ResultRecord`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::domain::{Coordinate, GeoPoint, ResultRecord};
use crate::error::{Result, RetrievalError};

const LATITUDE_COLUMN: &str = "Latitude";
const LONGITUDE_COLUMN: &str = "Longitude";

/// Parse the artifact at `path`.
///
/// The header row names the columns. The record's location comes from the
/// `Latitude`/`Longitude` columns of the first row, or `fallback` when those
/// are missing or unparsable.
pub fn materialize(path: &Path, fallback: Coordinate) -> Result<ResultRecord> {
    let file = File::open(path).map_err(|e| {
        let reason = if e.kind() == io::ErrorKind::NotFound {
            format!("artifact {} not found", path.display())
        } else {
            format!("cannot open {}: {e}", path.display())
        };
        RetrievalError::Parse(reason)
    })?;

    let record = parse_csv(file, fallback)?;
    debug!(
        path = %path.display(),
        rows = record.len(),
        columns = record.columns.len(),
        "Materialized artifact"
    );
    Ok(record)
}

/// Parse CSV from any reader. Used by [`materialize`] and tests.
pub fn parse_csv<R: Read>(reader: R, fallback: Coordinate) -> Result<ResultRecord> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = csv
        .headers()
        .map_err(|e| RetrievalError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err(RetrievalError::Parse("artifact has no header row".into()).into());
    }

    let mut rows = Vec::new();
    for row in csv.records() {
        let row = row.map_err(|e| RetrievalError::Parse(e.to_string()))?;
        rows.push(row.iter().map(str::to_string).collect::<Vec<_>>());
    }
    if rows.is_empty() {
        return Err(RetrievalError::Parse("artifact contains no data rows".into()).into());
    }

    let mut record = ResultRecord {
        columns,
        rows,
        location: GeoPoint::new(fallback),
    };
    if let Some(point) = derive_location(&record) {
        record.location = point;
    }
    Ok(record)
}

fn derive_location(record: &ResultRecord) -> Option<GeoPoint> {
    let lat = record.value(0, LATITUDE_COLUMN)?.parse::<f64>().ok()?;
    let lon = record.value(0, LONGITUDE_COLUMN)?.parse::<f64>().ok()?;
    Coordinate::try_new(lat, lon).ok().map(GeoPoint::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SAMPLE: &str = "\
ID,Category,Latitude,Longitude,Date,MOD13A3_061__1_km_monthly_NDVI
1,site,-3.4512,-60.1234,2022-01-01,0.8123
1,site,-3.4512,-60.1234,2022-02-01,0.7991
";

    fn origin() -> Coordinate {
        Coordinate::try_new(0.0, 0.0).unwrap()
    }

    #[test]
    fn parses_rows_and_location() {
        let record = parse_csv(SAMPLE.as_bytes(), origin()).unwrap();
        assert_eq!(record.columns.len(), 6);
        assert_eq!(record.len(), 2);
        assert_eq!(record.value(1, "MOD13A3_061__1_km_monthly_NDVI"), Some("0.7991"));
        assert_eq!(record.location.to_lon_lat(), [-60.1234, -3.4512]);
    }

    #[test]
    fn falls_back_to_query_coordinate() {
        let csv = "Date,NDVI\n2022-01-01,0.5\n";
        let fallback = Coordinate::try_new(10.0, 20.0).unwrap();
        let record = parse_csv(csv.as_bytes(), fallback).unwrap();
        assert_eq!(record.location.coordinate(), fallback);
    }

    #[test]
    fn header_only_is_a_parse_failure() {
        let err = parse_csv("ID,Latitude,Longitude\n".as_bytes(), origin()).unwrap_err();
        assert!(matches!(err, Error::Retrieval(RetrievalError::Parse(_))));
    }

    #[test]
    fn ragged_rows_are_a_parse_failure() {
        let err = parse_csv("a,b\n1,2,3\n".as_bytes(), origin()).unwrap_err();
        assert!(matches!(err, Error::Retrieval(RetrievalError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_parse_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = materialize(&dir.path().join("absent.csv"), origin()).unwrap_err();
        match err {
            Error::Retrieval(RetrievalError::Parse(msg)) => assert!(msg.contains("not found")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
