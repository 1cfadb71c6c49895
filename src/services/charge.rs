// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Charging commands.

use crate::error::Result;
use crate::models::vehicle::{
    ApiResponse, ChargeLimitRequest, ChargeState, ChargingAmpsRequest, CommandResponse,
};
use crate::services::transport::HttpClient;
use crate::services::vehicle::VehicleSession;
use serde::Serialize;

/// Result of a vehicle command. A rejection is a normal answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Accepted,
    /// Reason given by the vehicle, e.g. "disconnected", or "unknown" when
    /// the response carried none
    Rejected(String),
}

impl CommandResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandResult::Accepted)
    }
}

impl From<Option<CommandResponse>> for CommandResult {
    fn from(response: Option<CommandResponse>) -> Self {
        match response {
            Some(r) if r.result => CommandResult::Accepted,
            Some(r) => CommandResult::Rejected(r.reason.unwrap_or_else(|| "unknown".to_string())),
            None => CommandResult::Rejected("unknown".to_string()),
        }
    }
}

/// Charge control for the session's vehicle.
pub struct ChargeController<'a, C> {
    session: &'a mut VehicleSession<C>,
}

impl<'a, C: HttpClient> ChargeController<'a, C> {
    pub fn new(session: &'a mut VehicleSession<C>) -> Self {
        Self { session }
    }

    pub async fn start_charging(&mut self) -> Result<CommandResult> {
        self.command::<()>("charge_start", None).await
    }

    pub async fn stop_charging(&mut self) -> Result<CommandResult> {
        self.command::<()>("charge_stop", None).await
    }

    pub async fn open_charge_port(&mut self) -> Result<CommandResult> {
        self.command::<()>("charge_port_door_open", None).await
    }

    pub async fn close_charge_port(&mut self) -> Result<CommandResult> {
        self.command::<()>("charge_port_door_close", None).await
    }

    pub async fn set_charge_limit(&mut self, percent: u32) -> Result<CommandResult> {
        self.command("set_charge_limit", Some(&ChargeLimitRequest { percent }))
            .await
    }

    pub async fn set_charging_amps(&mut self, charging_amps: u32) -> Result<CommandResult> {
        self.command("set_charging_amps", Some(&ChargingAmpsRequest { charging_amps }))
            .await
    }

    /// Charge state straight from the `data_request` endpoint, bypassing the
    /// vehicle data cache.
    pub async fn charge_state(&mut self) -> Result<Option<ChargeState>> {
        let url = self.session.vehicle_url("data_request/charge_state");
        let data: ApiResponse<ChargeState> = self.session.transport_mut().get_json(&url).await?;
        Ok(data.response)
    }

    /// Whether the vehicle is charging right now.
    pub async fn is_charging(&mut self) -> Result<bool> {
        Ok(self
            .session
            .get_charge_state()
            .await?
            .is_some_and(|s| s.is_charging()))
    }

    async fn command<B: Serialize>(&mut self, name: &str, body: Option<&B>) -> Result<CommandResult> {
        let url = self.session.vehicle_url(&format!("command/{}", name));
        let response: ApiResponse<CommandResponse> =
            self.session.transport_mut().post_json(&url, body).await?;
        let result = CommandResult::from(response.response);

        match &result {
            CommandResult::Accepted => tracing::info!(command = name, "Command accepted"),
            CommandResult::Rejected(reason) => {
                tracing::warn!(command = name, reason = %reason, "Command rejected")
            }
        }
        Ok(result)
    }
}
