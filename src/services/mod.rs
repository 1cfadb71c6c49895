// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - authentication, transport and vehicle logic.

pub mod auth;
pub mod charge;
pub mod geo;
pub mod transport;
pub mod vehicle;

pub use auth::{AuthState, SessionAuthenticator};
pub use charge::{ChargeController, CommandResult};
pub use geo::distance_miles;
pub use transport::{
    AuthenticatedTransport, HttpClient, HttpRequest, HttpResponse, Method, Outcome, ReqwestClient,
    RequestBody,
};
pub use vehicle::{VehicleSession, VEHICLE_DATA_TTL_MILLIS};
