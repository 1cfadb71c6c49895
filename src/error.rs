// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the authentication, transport and vehicle layers.

use crate::store::StoreError;

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum TeslaError {
    #[error("Missing required configuration value: {0}")]
    ConfigMissing(&'static str),

    #[error("Authorization failed (HTTP 401)")]
    AuthorizationFailure,

    #[error("Vehicle is asleep (HTTP 408)")]
    VehicleAsleep,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Tesla API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("No authorization in progress")]
    AuthorizationNotStarted,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Callback URL has no authorization code")]
    MissingAuthorizationCode,

    #[error("No vehicle matches the configured VIN")]
    VehicleNotFound,

    #[error("Config store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl TeslaError {
    /// Whether this error means the bearer token was rejected.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, TeslaError::AuthorizationFailure)
    }

    /// Whether the vehicle did not answer because it is asleep.
    pub fn is_vehicle_asleep(&self) -> bool {
        matches!(self, TeslaError::VehicleAsleep)
    }
}

impl From<reqwest::Error> for TeslaError {
    fn from(err: reqwest::Error) -> Self {
        TeslaError::Transport(err.to_string())
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, TeslaError>;
