// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Vehicle session: identity, cached vehicle data and location tracking.

use crate::error::{Result, TeslaError};
use crate::models::location::{ActiveRoute, LocationHistory, TelemetrySample, VehicleLocation};
use crate::models::vehicle::{
    ApiResponse, ChargeState, DriveState, HomeReference, Vehicle, VehicleIdentity,
    VehicleSnapshot,
};
use crate::services::transport::{AuthenticatedTransport, HttpClient};
use crate::store::{keys, ConfigStore};
use crate::time_utils::Clock;
use std::sync::Arc;

/// How long a fetched `vehicle_data` payload is served from cache.
pub const VEHICLE_DATA_TTL_MILLIS: i64 = 10_000;

/// A session bound to a single vehicle.
pub struct VehicleSession<C> {
    transport: AuthenticatedTransport<C>,
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    api_base_url: String,
    identity: VehicleIdentity,
    home: Option<HomeReference>,
    last_home: Option<VehicleLocation>,
    cache: Option<VehicleSnapshot>,
    history: LocationHistory,
}

impl<C: HttpClient> VehicleSession<C> {
    /// Resolve the vehicle and the home reference, then return the session.
    ///
    /// When no home is configured it is taken from the current drive state
    /// and persisted. If the vehicle cannot be read yet, the session starts
    /// without a home and [`update_location`](Self::update_location) adopts
    /// the first fix.
    pub async fn connect(
        mut transport: AuthenticatedTransport<C>,
        store: Arc<dyn ConfigStore>,
        clock: Arc<dyn Clock>,
        api_base_url: impl Into<String>,
    ) -> Result<Self> {
        let api_base_url = api_base_url.into();
        let identity = resolve_identity(&mut transport, store.as_ref(), &api_base_url)
            .await?
            .ok_or(TeslaError::VehicleNotFound)?;

        let home = match (
            store.get_f64(keys::HOME_LATITUDE)?,
            store.get_f64(keys::HOME_LONGITUDE)?,
        ) {
            (Some(latitude), Some(longitude)) => Some(HomeReference {
                latitude,
                longitude,
            }),
            _ => None,
        };

        let mut session = Self {
            transport,
            store,
            clock,
            api_base_url,
            identity,
            home,
            last_home: None,
            cache: None,
            history: LocationHistory::new(),
        };

        if session.home.is_none() {
            if let Err(e) = session.derive_home().await {
                tracing::warn!(error = %e, "Could not derive home yet, will use the first fix");
            }
        }

        tracing::info!(
            vin = %session.identity.vin,
            display_name = %session.identity.display_name,
            has_home = session.home.is_some(),
            "Vehicle session ready"
        );
        Ok(session)
    }

    async fn derive_home(&mut self) -> Result<()> {
        let Some(drive) = self.get_drive_state().await? else {
            return Ok(());
        };
        if let (Some(latitude), Some(longitude)) = (drive.latitude, drive.longitude) {
            self.adopt_home(latitude, longitude);
        }
        Ok(())
    }

    /// Use a position as the home reference and persist it.
    fn adopt_home(&mut self, latitude: f64, longitude: f64) {
        tracing::info!(latitude, longitude, "No home configured, using current position");
        if let Err(e) = self.store.update(&[
            (keys::HOME_LATITUDE, latitude.to_string()),
            (keys::HOME_LONGITUDE, longitude.to_string()),
        ]) {
            tracing::warn!(error = %e, "Failed to persist home position, continuing anyway");
        }
        self.home = Some(HomeReference {
            latitude,
            longitude,
        });
    }

    pub fn identity(&self) -> &VehicleIdentity {
        &self.identity
    }

    pub fn home(&self) -> Option<HomeReference> {
        self.home
    }

    /// Home reference as a location stamped with the current time.
    pub fn home_position(&self) -> Option<VehicleLocation> {
        self.home
            .map(|h| VehicleLocation::at_current_position(h.latitude, h.longitude))
    }

    /// Most recent sample seen at home.
    pub fn last_home(&self) -> Option<&VehicleLocation> {
        self.last_home.as_ref()
    }

    pub fn history(&self) -> &LocationHistory {
        &self.history
    }

    pub fn transport_mut(&mut self) -> &mut AuthenticatedTransport<C> {
        &mut self.transport
    }

    /// `{api_base}/api/1/vehicles/{id}/{suffix}`
    pub fn vehicle_url(&self, suffix: &str) -> String {
        format!(
            "{}/api/1/vehicles/{}/{}",
            self.api_base_url, self.identity.id, suffix
        )
    }

    // ─── Vehicle Data ────────────────────────────────────────────────────────

    /// Full vehicle data, served from cache while younger than
    /// [`VEHICLE_DATA_TTL_MILLIS`]. A snapshot from the future (clock moved
    /// backwards) counts as stale.
    ///
    /// A response without a payload yields `None` and leaves the cache as is.
    pub async fn get_vehicle_data(&mut self) -> Result<Option<VehicleSnapshot>> {
        let now = self.clock.now_millis();
        if let Some(cached) = &self.cache {
            if (0..VEHICLE_DATA_TTL_MILLIS).contains(&cached.age_millis(now)) {
                return Ok(Some(cached.clone()));
            }
        }

        let Some(vehicle) = self.fetch_vehicle_data().await? else {
            tracing::warn!(vin = %self.identity.vin, "vehicle_data returned no payload");
            return Ok(None);
        };

        let snapshot = VehicleSnapshot {
            vehicle: Arc::new(vehicle),
            fetched_at_millis: self.clock.now_millis(),
        };
        self.cache = Some(snapshot.clone());
        Ok(Some(snapshot))
    }

    /// Fetch `vehicle_data`, waking the vehicle and retrying once if it is
    /// asleep.
    async fn fetch_vehicle_data(&mut self) -> Result<Option<Vehicle>> {
        let url = self.vehicle_url("vehicle_data");
        match self.transport.get_json::<ApiResponse<Vehicle>>(&url).await {
            Ok(data) => Ok(data.response),
            Err(TeslaError::VehicleAsleep) => {
                tracing::info!(vin = %self.identity.vin, "Vehicle asleep, waking up");
                if !self.wake_up().await? {
                    tracing::warn!(vin = %self.identity.vin, "Waking up the vehicle failed");
                }
                let data: ApiResponse<Vehicle> = self.transport.get_json(&url).await?;
                Ok(data.response)
            }
            Err(e) => Err(e),
        }
    }

    /// Drive state of the current vehicle data.
    pub async fn get_drive_state(&mut self) -> Result<Option<DriveState>> {
        Ok(self
            .get_vehicle_data()
            .await?
            .and_then(|s| s.vehicle.drive_state.clone()))
    }

    /// Charge state of the current vehicle data.
    pub async fn get_charge_state(&mut self) -> Result<Option<ChargeState>> {
        Ok(self
            .get_vehicle_data()
            .await?
            .and_then(|s| s.vehicle.charge_state.clone()))
    }

    /// Send a wake-up; true if the vehicle reports itself online.
    pub async fn wake_up(&mut self) -> Result<bool> {
        tracing::debug!(id = %self.identity.id, "Wake up, Tesla!");
        let url = self.vehicle_url("wake_up");
        let response: ApiResponse<Vehicle> = self.transport.post_json::<(), _>(&url, None).await?;
        Ok(response
            .response
            .and_then(|v| v.state)
            .is_some_and(|s| s == "online"))
    }

    // ─── Location Tracking ───────────────────────────────────────────────────

    /// Read the current position and record it in the location history.
    ///
    /// A sample at home clears the history and becomes the new
    /// [`last_home`](Self::last_home). Without a home reference, the first
    /// fix becomes home. Returns `None` if the vehicle reported no
    /// coordinates.
    pub async fn update_location(&mut self) -> Result<Option<VehicleLocation>> {
        let Some(drive) = self.get_drive_state().await? else {
            return Ok(None);
        };
        let (Some(latitude), Some(longitude)) = (drive.latitude, drive.longitude) else {
            return Ok(None);
        };

        let route = match (
            drive.active_route_latitude,
            drive.active_route_longitude,
            drive.active_route_minutes_to_arrival,
        ) {
            (Some(latitude), Some(longitude), Some(minutes_to_arrival)) => Some(ActiveRoute {
                latitude,
                longitude,
                minutes_to_arrival,
            }),
            _ => None,
        };

        let sample = TelemetrySample {
            latitude,
            longitude,
            speed: drive.speed.unwrap_or(0.0),
            heading: drive.heading.unwrap_or(0.0),
            timestamp_millis: drive.timestamp.unwrap_or_else(|| self.clock.now_millis()),
            route,
        };
        if self.home.is_none() {
            self.adopt_home(latitude, longitude);
        }
        let home = self.home_position();
        let location = VehicleLocation::from_sample(sample, home.as_ref());
        tracing::debug!(%location, "Most recent vehicle location");

        self.record_location(location);
        Ok(Some(location))
    }

    /// Apply home detection and deduplication to a new sample.
    pub fn record_location(&mut self, location: VehicleLocation) -> bool {
        match self.home {
            Some(home) if location.distance_to(home.latitude, home.longitude) == 0.0 => {
                if !self.history.is_empty() {
                    tracing::info!(cleared = self.history.len(), "Vehicle at home, clearing history");
                }
                self.history.clear();
                self.last_home = Some(location);
            }
            Some(_) => {}
            None => tracing::debug!("No home reference, skipping home detection"),
        }
        self.history.record(location)
    }
}

/// Work out which vehicle to use.
///
/// Uses the configured identity when complete; otherwise lists the account's
/// vehicles and picks the only one (if no VIN is configured) or the first
/// whose VIN matches. The result is persisted.
pub async fn resolve_identity<C: HttpClient>(
    transport: &mut AuthenticatedTransport<C>,
    store: &dyn ConfigStore,
    api_base_url: &str,
) -> Result<Option<VehicleIdentity>> {
    let vin = store.get(keys::VIN)?;
    let id = store.get(keys::ID_S)?;
    let display_name = store.get(keys::DISPLAY_NAME)?;

    if let (Some(vin), Some(id), Some(display_name)) = (&vin, &id, &display_name) {
        return Ok(Some(VehicleIdentity {
            id: id.clone(),
            vin: vin.clone(),
            display_name: display_name.clone(),
        }));
    }

    let url = format!("{}/api/1/vehicles", api_base_url);
    let list: ApiResponse<Vec<Vehicle>> = transport.get_json(&url).await?;
    let vehicles = list.response.unwrap_or_default();
    tracing::info!(count = vehicles.len(), "Listed vehicles for account");

    let matched = if vehicles.len() == 1 && vin.is_none() {
        vehicles.into_iter().find(|v| v.id_s.is_some())
    } else {
        vehicles
            .into_iter()
            .find(|v| v.id_s.is_some() && v.vin.is_some() && v.vin == vin)
    };

    let Some(vehicle) = matched else {
        tracing::warn!(vin = ?vin, "No vehicle matches the configured VIN");
        return Ok(None);
    };

    let identity = VehicleIdentity {
        id: vehicle.id_s.unwrap_or_default(),
        vin: vehicle.vin.unwrap_or_default(),
        display_name: vehicle
            .display_name
            .filter(|n| !n.is_empty())
            .or(display_name)
            .unwrap_or_default(),
    };

    store.update(&[
        (keys::VIN, identity.vin.clone()),
        (keys::ID_S, identity.id.clone()),
        (keys::DISPLAY_NAME, identity.display_name.clone()),
    ])?;
    tracing::info!(vin = %identity.vin, "Resolved vehicle identity");
    Ok(Some(identity))
}
