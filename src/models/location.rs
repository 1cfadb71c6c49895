// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle location records and the bounded location history.

use crate::services::geo::distance_miles;
use crate::time_utils::format_epoch_seconds;
use geo::Point;
use std::collections::VecDeque;
use std::fmt;

/// Number of locations kept in [`LocationHistory`].
pub const LOCATION_HISTORY_CAPACITY: usize = 250;

/// Destination and ETA of an active navigation route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveRoute {
    pub latitude: f64,
    pub longitude: f64,
    pub minutes_to_arrival: f64,
}

/// Raw telemetry used to build a [`VehicleLocation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub heading: f64,
    /// Milliseconds since the epoch
    pub timestamp_millis: i64,
    pub route: Option<ActiveRoute>,
}

/// A single position fix. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleLocation {
    latitude: f64,
    longitude: f64,
    speed: f64,
    heading: f64,
    minutes_to_arrival: f64,
    /// Seconds since the epoch
    timestamp: i64,
    going_home: bool,
    going_away_from_home: bool,
}

impl VehicleLocation {
    /// A bare position stamped with the current time.
    pub fn at_current_position(latitude: f64, longitude: f64) -> Self {
        Self::at_position(latitude, longitude, chrono::Utc::now().timestamp())
    }

    /// A bare position with an explicit timestamp (seconds).
    pub fn at_position(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            latitude,
            longitude,
            speed: 0.0,
            heading: 0.0,
            minutes_to_arrival: 0.0,
            timestamp,
            going_home: false,
            going_away_from_home: false,
        }
    }

    /// Build a location from telemetry.
    ///
    /// When the sample carries an active route, the destination is compared
    /// against `home` to set the going-home / going-away flags.
    pub fn from_sample(sample: TelemetrySample, home: Option<&VehicleLocation>) -> Self {
        let (going_home, going_away_from_home, minutes_to_arrival) = match sample.route {
            Some(route) => {
                let heading_home = home
                    .map(|h| h.distance_to(route.latitude, route.longitude) == 0.0)
                    .unwrap_or(false);
                (heading_home, !heading_home, route.minutes_to_arrival)
            }
            None => (false, false, 0.0),
        };

        Self {
            latitude: sample.latitude,
            longitude: sample.longitude,
            speed: sample.speed,
            heading: sample.heading,
            minutes_to_arrival,
            timestamp: sample.timestamp_millis.div_euclid(1000),
            going_home,
            going_away_from_home,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn minutes_to_arrival(&self) -> f64 {
        self.minutes_to_arrival
    }

    /// Seconds since the epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp * 1000
    }

    pub fn is_going_home(&self) -> bool {
        self.going_home
    }

    pub fn is_going_away_from_home(&self) -> bool {
        self.going_away_from_home
    }

    /// Expected arrival, in epoch seconds.
    pub fn arrival_time_seconds(&self) -> i64 {
        self.timestamp + (self.minutes_to_arrival * 60.0).floor() as i64
    }

    /// Position as a geo point (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Distance in miles to another location.
    pub fn distance_from(&self, other: &VehicleLocation) -> f64 {
        distance_miles(self.point(), other.point())
    }

    /// Distance in miles to a raw coordinate.
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        distance_miles(self.point(), Point::new(longitude, latitude))
    }
}

impl fmt::Display for VehicleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat: {}, Long: {}, Heading: {}, Speed: {}, Timestamp: {}",
            self.latitude,
            self.longitude,
            self.heading,
            self.speed,
            format_epoch_seconds(self.timestamp)
        )
    }
}

/// Bounded, insertion-ordered location history.
///
/// Once the vehicle has been seen stationary twice in a row, further
/// stationary samples are dropped.
#[derive(Debug, Clone)]
pub struct LocationHistory {
    entries: VecDeque<VehicleLocation>,
    capacity: usize,
}

impl Default for LocationHistory {
    fn default() -> Self {
        Self::with_capacity(LOCATION_HISTORY_CAPACITY)
    }
}

impl LocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append `location` unless it is a redundant stationary sample.
    ///
    /// Returns whether it was stored. The oldest entry is evicted when full.
    pub fn record(&mut self, location: VehicleLocation) -> bool {
        if self.is_redundant(&location) {
            tracing::debug!(%location, "Vehicle stationary, skipping location");
            return false;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(location);
        true
    }

    fn is_redundant(&self, location: &VehicleLocation) -> bool {
        let len = self.entries.len();
        if len < 2 {
            return false;
        }
        let most_recent = &self.entries[len - 1];
        let previous = &self.entries[len - 2];
        most_recent.distance_from(previous) == 0.0 && most_recent.distance_from(location) == 0.0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&VehicleLocation> {
        self.entries.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleLocation> {
        self.entries.iter()
    }
}
