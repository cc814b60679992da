//! Geographic primitives: coordinates, persisted geo-points and distance math.
//!
//! All distance math uses a spherical Earth of radius [`EARTH_RADIUS_KM`].
//! That is accurate to well under one percent at the scale the fallback
//! lookup works at (a few hundred kilometres at most).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::QueryError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateFields")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct CoordinateFields {
    lat: f64,
    lon: f64,
}

impl TryFrom<CoordinateFields> for Coordinate {
    type Error = QueryError;

    fn try_from(fields: CoordinateFields) -> Result<Self, Self::Error> {
        Self::try_new(fields.lat, fields.lon)
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn try_new(lat: f64, lon: f64) -> Result<Self, QueryError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(QueryError::InvalidCoordinate {
                field: "latitude",
                value: lat.to_string(),
            });
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(QueryError::InvalidCoordinate {
                field: "longitude",
                value: lon.to_string(),
            });
        }
        Ok(Self { lat, lon })
    }

    /// Parse a coordinate from the textual form the inbound interface accepts.
    pub fn parse(lat: &str, lon: &str) -> Result<Self, QueryError> {
        let parsed_lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| QueryError::InvalidCoordinate {
                field: "latitude",
                value: lat.to_string(),
            })?;
        let parsed_lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| QueryError::InvalidCoordinate {
                field: "longitude",
                value: lon.to_string(),
            })?;
        Self::try_new(parsed_lat, parsed_lon)
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    #[must_use]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

/// Geo-point as persisted in the fallback store.
///
/// Serialized in GeoJSON order, `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint(Coordinate);

impl GeoPoint {
    #[must_use]
    pub const fn new(coordinate: Coordinate) -> Self {
        Self(coordinate)
    }

    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.0
    }

    /// `[longitude, latitude]`.
    #[must_use]
    pub const fn to_lon_lat(&self) -> [f64; 2] {
        [self.0.lon, self.0.lat]
    }
}

impl From<Coordinate> for GeoPoint {
    fn from(coordinate: Coordinate) -> Self {
        Self(coordinate)
    }
}

impl Serialize for GeoPoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_lon_lat().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [lon, lat] = <[f64; 2]>::deserialize(deserializer)?;
        Coordinate::try_new(lat, lon)
            .map(GeoPoint)
            .map_err(serde::de::Error::custom)
    }
}

/// Axis-aligned box around a centre point, computed with a flat-Earth
/// approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Box of half-side `half_side_km` centred on `center`.
    ///
    /// The longitude half-width is widened by `1 / cos(latitude)` for
    /// meridian convergence. Near the poles the box spans every longitude.
    #[must_use]
    pub fn around(center: &Coordinate, half_side_km: f64) -> Self {
        let lat_delta = (half_side_km / EARTH_RADIUS_KM).to_degrees();
        let cos_lat = center.lat.to_radians().cos();
        let lon_delta = if cos_lat.abs() < 1e-12 {
            180.0
        } else {
            (half_side_km / (EARTH_RADIUS_KM * cos_lat)).to_degrees()
        };

        Self {
            min_lat: center.lat - lat_delta,
            max_lat: center.lat + lat_delta,
            min_lon: center.lon - lon_delta,
            max_lon: center.lon + lon_delta,
        }
    }

    /// Half-height of the box in degrees.
    #[must_use]
    pub fn lat_delta(&self) -> f64 {
        (self.max_lat - self.min_lat) / 2.0
    }

    /// Half-width of the box in degrees.
    #[must_use]
    pub fn lon_delta(&self) -> f64 {
        (self.max_lon - self.min_lon) / 2.0
    }

    /// Whether the box reaches past a pole.
    #[must_use]
    pub fn touches_pole(&self) -> bool {
        self.max_lat >= 90.0 || self.min_lat <= -90.0
    }

    /// Whether `point` falls inside the box. Handles boxes that cross the
    /// antimeridian.
    ///
    /// A box over a pole spans every longitude: the shortest path to a
    /// point on the far side runs across the pole.
    #[must_use]
    pub fn contains(&self, point: &Coordinate) -> bool {
        if point.lat < self.min_lat || point.lat > self.max_lat {
            return false;
        }
        if self.touches_pole() || self.max_lon - self.min_lon >= 360.0 {
            return true;
        }
        let lon = point.lon;
        let wrapped = [lon, lon - 360.0, lon + 360.0];
        wrapped
            .iter()
            .any(|l| *l >= self.min_lon && *l <= self.max_lon)
    }
}
