//! Builders for domain values and artifact contents.

use chrono::{Datelike, NaiveDate};

use crate::domain::{Coordinate, GeoPoint, Query, ResultRecord, EARTH_RADIUS_KM};

/// Coordinate used when a test does not care where it is.
#[must_use]
pub fn default_coordinate() -> Coordinate {
    coordinate(-3.45, -60.12)
}

/// Coordinate from literals known to be in range.
///
/// # Panics
///
/// Panics on out-of-range input.
#[must_use]
pub fn coordinate(lat: f64, lon: f64) -> Coordinate {
    Coordinate::try_new(lat, lon).expect("test coordinate in range")
}

/// Point `km` kilometres due north of `at` (negative for south).
///
/// # Panics
///
/// Panics if the move crosses a pole.
#[must_use]
pub fn offset_north(at: Coordinate, km: f64) -> Coordinate {
    coordinate(at.lat() + (km / EARTH_RADIUS_KM).to_degrees(), at.lon())
}

/// Query over a whole calendar year.
#[must_use]
pub fn year_query(lat: f64, lon: f64, year: i32) -> Query {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).expect("valid year");
    let end = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid year");
    Query::try_new(coordinate(lat, lon), start, end).expect("ordered range")
}

/// CSV in the layout of an AppEEARS point extraction, with `months` rows.
#[must_use]
pub fn ndvi_csv(at: Coordinate, months: u32) -> String {
    let mut body = String::from(
        "ID,Category,Latitude,Longitude,Date,MODIS_Tile,MOD13A3_061__1_km_monthly_NDVI\n",
    );
    for month in 0..months {
        let date = NaiveDate::from_ymd_opt(2022, month % 12 + 1, 1).expect("valid month");
        body.push_str(&format!(
            "1,point,{},{},{}-{:02}-01,h12v09,{:.4}\n",
            at.lat(),
            at.lon(),
            date.year(),
            date.month(),
            0.6 + f64::from(month) * 0.01,
        ));
    }
    body
}

/// Small record located at `at`.
#[must_use]
pub fn record_at(at: Coordinate) -> ResultRecord {
    ResultRecord {
        columns: vec!["Latitude".into(), "Longitude".into(), "NDVI".into()],
        rows: vec![vec![at.lat().to_string(), at.lon().to_string(), "0.71".into()]],
        location: GeoPoint::new(at),
    }
}
