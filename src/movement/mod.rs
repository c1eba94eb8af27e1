//! GPS movement tracking.
//!
//! Players report raw coordinates; distance between reports accumulates
//! toward the next spawn check.

use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_METERS;

/// A WGS84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_meters(self.lat, self.lon, other.lat, other.lon)
    }
}

/// Great-circle distance between two coordinates, in meters
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Result of recording a new location for a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub location: GeoPoint,
    /// Distance from the previous report (0 for the first report)
    pub distance_traveled: f64,
    pub distance_since_last_spawn: f64,
}
