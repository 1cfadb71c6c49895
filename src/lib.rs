// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tesla Owner API session: PKCE login, self-refreshing bearer auth and a
//! cached view of one vehicle's telemetry.
//!
//! This crate provides the building blocks; `main.rs` wires them together
//! from a flat `KEY=value` config file.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use error::Result;
use services::{AuthenticatedTransport, ReqwestClient, SessionAuthenticator, VehicleSession};
use std::sync::Arc;
use store::{ConfigStore, FileConfigStore};
use time_utils::SystemClock;

/// Build a production vehicle session from `config`.
pub async fn connect(config: &Config) -> Result<VehicleSession<ReqwestClient>> {
    let store: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::open(&config.config_file)?);
    let http = ReqwestClient::new(config)?;
    let auth = SessionAuthenticator::from_store(http.clone(), store.clone(), &config.auth_base_url)?;
    let transport = AuthenticatedTransport::new(http, auth);

    VehicleSession::connect(
        transport,
        store,
        Arc::new(SystemClock),
        &config.api_base_url,
    )
    .await
}
