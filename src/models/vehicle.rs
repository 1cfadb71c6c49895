// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Owner API vehicle payloads.
//!
//! Every field the API may omit or send as `null` is an `Option`, so a
//! partial payload still decodes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Envelope wrapping every Owner API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub response: Option<T>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// A vehicle as returned by `/api/1/vehicles` and `/vehicle_data`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    pub vehicle_id: Option<u64>,
    pub vin: Option<String>,
    pub display_name: Option<String>,
    pub color: Option<String>,
    /// e.g. "OWNER"
    pub access_type: Option<String>,
    /// "online", "asleep", "offline", ...
    pub state: Option<String>,
    pub in_service: Option<bool>,
    pub id_s: Option<String>,
    pub calendar_enabled: Option<bool>,
    pub api_version: Option<u32>,
    pub option_codes: Option<String>,
    pub drive_state: Option<DriveState>,
    pub charge_state: Option<ChargeState>,
}

/// Position and motion of the vehicle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveState {
    pub gps_as_of: Option<i64>,
    pub heading: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub native_latitude: Option<f64>,
    pub native_longitude: Option<f64>,
    pub native_location_supported: Option<i32>,
    pub native_type: Option<String>,
    pub power: Option<f64>,
    pub shift_state: Option<String>,
    /// Miles per hour, `null` when parked
    pub speed: Option<f64>,
    /// Milliseconds since the epoch
    pub timestamp: Option<i64>,
    pub active_route_latitude: Option<f64>,
    pub active_route_longitude: Option<f64>,
    pub active_route_minutes_to_arrival: Option<f64>,
    pub active_route_destination: Option<String>,
}

/// Battery and charging status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeState {
    pub battery_heater_on: Option<bool>,
    /// Percent, e.g. 46
    pub battery_level: Option<u32>,
    /// Miles
    pub battery_range: Option<f64>,
    pub charge_amps: Option<u32>,
    pub charge_current_request: Option<u32>,
    pub charge_current_request_max: Option<u32>,
    pub charge_enable_request: Option<bool>,
    pub charge_energy_added: Option<f64>,
    pub charge_limit_soc: Option<u32>,
    pub charge_limit_soc_max: Option<u32>,
    pub charge_limit_soc_min: Option<u32>,
    pub charge_limit_soc_std: Option<u32>,
    pub charge_miles_added_ideal: Option<f64>,
    pub charge_miles_added_rated: Option<f64>,
    pub charge_port_cold_weather_mode: Option<bool>,
    pub charge_port_door_open: Option<bool>,
    /// e.g. "Engaged"
    pub charge_port_latch: Option<String>,
    pub charge_rate: Option<f64>,
    pub charge_to_max_range: Option<bool>,
    pub charger_actual_current: Option<u32>,
    pub charger_phases: Option<u32>,
    pub charger_pilot_current: Option<u32>,
    pub charger_power: Option<u32>,
    pub charger_voltage: Option<u32>,
    /// "Disconnected", "Stopped", "Charging", ...
    pub charging_state: Option<String>,
    pub conn_charge_cable: Option<String>,
    pub est_battery_range: Option<f64>,
    pub fast_charger_brand: Option<String>,
    pub fast_charger_present: Option<bool>,
    pub fast_charger_type: Option<String>,
    pub ideal_battery_range: Option<f64>,
    pub managed_charging_active: Option<bool>,
    pub managed_charging_start_time: Option<i64>,
    pub managed_charging_user_canceled: Option<bool>,
    pub max_range_charge_counter: Option<u32>,
    pub minutes_to_full_charge: Option<u32>,
    pub not_enough_power_to_heat: Option<bool>,
    pub off_peak_charging_enabled: Option<bool>,
    pub off_peak_charging_times: Option<String>,
    pub off_peak_hours_end_time: Option<u32>,
    pub preconditioning_enabled: Option<bool>,
    pub preconditioning_times: Option<String>,
    pub scheduled_charging_mode: Option<String>,
    pub scheduled_charging_pending: Option<bool>,
    pub scheduled_charging_start_time: Option<i64>,
    pub scheduled_departure_time: Option<i64>,
    pub scheduled_departure_time_minutes: Option<u32>,
    pub supercharger_session_trip_planner: Option<bool>,
    pub time_to_full_charge: Option<f64>,
    pub timestamp: Option<i64>,
    pub trip_charging: Option<bool>,
    pub usable_battery_level: Option<u32>,
    pub user_charge_enable_request: Option<bool>,
}

impl ChargeState {
    /// Charging right now, with the port door open.
    pub fn is_charging(&self) -> bool {
        self.charge_port_door_open == Some(true)
            && self
                .charging_state
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("charging"))
    }
}

/// Result body of a vehicle command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of `set_charge_limit`.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeLimitRequest {
    pub percent: u32,
}

/// Body of `set_charging_amps`.
#[derive(Debug, Clone, Serialize)]
pub struct ChargingAmpsRequest {
    pub charging_amps: u32,
}

/// The vehicle this session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleIdentity {
    /// Opaque API identifier (`id_s`)
    pub id: String,
    pub vin: String,
    pub display_name: String,
}

/// Reference point for home arrival detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeReference {
    pub latitude: f64,
    pub longitude: f64,
}

/// A fetched `vehicle_data` payload and when it was fetched.
#[derive(Debug, Clone)]
pub struct VehicleSnapshot {
    pub vehicle: Arc<Vehicle>,
    pub fetched_at_millis: i64,
}

impl VehicleSnapshot {
    /// Age relative to `now_millis`.
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis - self.fetched_at_millis
    }
}
