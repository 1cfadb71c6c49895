// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Great-circle distance with a GPS noise cutoff.

use geo::Point;

/// Coordinates closer than this on both axes are treated as the same spot.
///
/// One cell is roughly 291 ft x 231 ft.
pub const GPS_TOLERANCE_DEGREES: f64 = 0.0008;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const MILES_PER_KM: f64 = 0.621371;

/// Distance in miles between two points (x = longitude, y = latitude).
///
/// Returns exactly 0 when both the latitude and longitude deltas are within
/// [`GPS_TOLERANCE_DEGREES`]; otherwise the haversine distance.
pub fn distance_miles(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lon1) = (a.y(), a.x());
    let (lat2, lon2) = (b.y(), b.x());

    if (lat1 - lat2).abs() <= GPS_TOLERANCE_DEGREES && (lon1 - lon2).abs() <= GPS_TOLERANCE_DEGREES
    {
        return 0.0;
    }

    haversine_km(lat1, lon1, lat2, lon2) * MILES_PER_KM
}

fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + (d_lon / 2.0).sin().powi(2) * (lat1.to_radians().cos() * lat2.to_radians().cos());
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}
