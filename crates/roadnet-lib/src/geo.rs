//! Geographic primitives shared by the graph store and the resolvers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A `(latitude, longitude)` pair in decimal degrees.
///
/// Serialises as a two-element array `[lat, lon]`, the shape returned to HTTP
/// callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn checked(lat: f64, lon: f64) -> Result<Self> {
        validate(lat, lon)?;
        Ok(Self { lat, lon })
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        haversine_m(self.lat, self.lon, other.lat, other.lon)
    }

    /// Position on the unit sphere, used as the KD-tree key.
    pub(crate) fn unit_vector(&self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from(value: [f64; 2]) -> Self {
        Self {
            lat: value[0],
            lon: value[1],
        }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.lat, value.lon]
    }
}

/// Check that a latitude/longitude pair is finite and in range.
pub fn validate(lat: f64, lon: f64) -> Result<()> {
    let valid = lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate { lat, lon })
    }
}

/// Haversine great-circle distance in metres.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}
