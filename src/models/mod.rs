// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the Owner API, the auth server and location tracking.

pub mod auth;
pub mod location;
pub mod vehicle;

pub use auth::{Credentials, FormFields, PkceState, TokenResponse};
pub use location::{ActiveRoute, LocationHistory, TelemetrySample, VehicleLocation};
pub use vehicle::{
    ApiResponse, ChargeState, CommandResponse, DriveState, HomeReference, Vehicle,
    VehicleIdentity, VehicleSnapshot,
};
