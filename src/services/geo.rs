// src/services/geo.rs
// DOCUMENTATION: Spherical geometry utilities
// PURPOSE: Distance and forward-projection math used by the grid planner

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Geographic point in decimal degrees
/// DOCUMENTATION: Latitude in [-90, 90], longitude in [-180, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<Coordinate> for geo_types::Point<f64> {
    fn from(coord: Coordinate) -> Self {
        geo_types::Point::new(coord.longitude, coord.latitude)
    }
}

/// Great-circle distance between two coordinates in meters
/// DOCUMENTATION: Haversine formula on a spherical Earth
///
/// h = sin²(Δlat/2) + cos(lat1)·cos(lat2)·sin²(Δlng/2)
/// c = 2·atan2(√h, √(1−h))
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Project a point at a given distance and compass bearing from an origin
/// DOCUMENTATION: Forward geodesic on a sphere (law-of-cosines form)
///
/// Bearing is in degrees, 0 = north, increasing clockwise.
pub fn point_at_distance_and_bearing(
    origin: Coordinate,
    distance_meters: f64,
    bearing_degrees: f64,
) -> Coordinate {
    let bearing = bearing_degrees.to_radians();
    let angular = distance_meters / EARTH_RADIUS_METERS;

    let lat1 = origin.latitude.to_radians();
    let lng1 = origin.longitude.to_radians();

    let lat2 =
        (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lng2 = lng1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Coordinate::new(lat2.to_degrees(), lng2.to_degrees())
}
