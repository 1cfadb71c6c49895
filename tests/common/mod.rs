// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tesla_session::error::Result;
use tesla_session::services::{
    AuthenticatedTransport, HttpClient, HttpRequest, HttpResponse, Method, SessionAuthenticator,
    VehicleSession,
};
use tesla_session::store::{keys, ConfigStore, MemoryConfigStore};
use tesla_session::time_utils::Clock;

pub const AUTH_BASE: &str = "https://auth.test";
pub const API_BASE: &str = "https://owner.test";

pub const VEHICLE_ID: &str = "1492931337";
pub const VIN: &str = "5YJ3E1EA7KF000001";

pub const HOME_LAT: f64 = 52.0;
pub const HOME_LON: f64 = 13.0;

struct Route {
    method: Method,
    path: String,
    responses: VecDeque<HttpResponse>,
}

#[derive(Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

/// Scripted HTTP client.
///
/// Responses queued for a route are served in order; the last one repeats.
/// Unknown routes answer 404.
#[derive(Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

#[allow(dead_code)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests whose path ends with `path`.
    pub fn on(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.on_response(
            method,
            path,
            HttpResponse {
                status,
                body: body.to_string(),
                location: None,
            },
        )
    }

    pub fn on_response(&self, method: Method, path: &str, response: HttpResponse) -> &Self {
        let mut state = self.state.lock().unwrap();
        match state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.responses.push_back(response),
            None => state.routes.push(Route {
                method,
                path: path.to_string(),
                responses: VecDeque::from([response]),
            }),
        }
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests sent to a path ending with `path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && path_of(&r.url).ends_with(path))
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        let path = path_of(&request.url).to_string();
        let route = state
            .routes
            .iter_mut()
            .find(|r| r.method == request.method && path.ends_with(&r.path));

        Ok(match route {
            Some(route) if route.responses.len() > 1 => route.responses.pop_front().unwrap(),
            Some(route) => route.responses.front().cloned().unwrap(),
            None => HttpResponse {
                status: 404,
                body: format!("no mock for {}", request.url),
                location: None,
            },
        })
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn at(millis: i64) -> Self {
        let clock = Self::default();
        clock.set(millis);
        clock
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Store holding only the token pair.
#[allow(dead_code)]
pub fn token_store() -> Arc<MemoryConfigStore> {
    Arc::new(MemoryConfigStore::with_values([
        (keys::ACCESS_TOKEN, "old-access"),
        (keys::REFRESH_TOKEN, "old-refresh"),
    ]))
}

/// Store with tokens, a resolved vehicle and a home reference.
#[allow(dead_code)]
pub fn session_store() -> Arc<MemoryConfigStore> {
    Arc::new(MemoryConfigStore::with_values([
        (keys::ACCESS_TOKEN, "old-access"),
        (keys::REFRESH_TOKEN, "old-refresh"),
        (keys::VIN, VIN),
        (keys::ID_S, VEHICLE_ID),
        (keys::DISPLAY_NAME, "Sparky"),
        (keys::HOME_LATITUDE, "52.0"),
        (keys::HOME_LONGITUDE, "13.0"),
    ]))
}

#[allow(dead_code)]
pub fn transport(
    http: &MockHttpClient,
    store: Arc<MemoryConfigStore>,
) -> AuthenticatedTransport<MockHttpClient> {
    let store: Arc<dyn ConfigStore> = store;
    let auth = SessionAuthenticator::from_store(http.clone(), store, AUTH_BASE)
        .expect("store should hold tokens");
    AuthenticatedTransport::new(http.clone(), auth)
}

#[allow(dead_code)]
pub async fn session(
    http: &MockHttpClient,
    store: Arc<MemoryConfigStore>,
    clock: &ManualClock,
) -> Result<VehicleSession<MockHttpClient>> {
    VehicleSession::connect(
        transport(http, store.clone()),
        store,
        Arc::new(clock.clone()),
        API_BASE,
    )
    .await
}

/// Token endpoint response body.
#[allow(dead_code)]
pub fn token_body(access: &str, refresh: &str) -> String {
    serde_json::json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": 28800,
        "state": "abcdefghij",
        "token_type": "Bearer",
        "id_token": "eyJ.id.token"
    })
    .to_string()
}

/// `vehicle_data` response body with the given drive state.
#[allow(dead_code)]
pub fn vehicle_data_body(drive_state: serde_json::Value) -> String {
    serde_json::json!({
        "response": {
            "id": 1492931337u64,
            "id_s": VEHICLE_ID,
            "vin": VIN,
            "display_name": "Sparky",
            "state": "online",
            "drive_state": drive_state,
            "charge_state": {
                "battery_level": 46,
                "charging_state": "Charging",
                "charge_port_door_open": true,
                "charge_limit_soc": 80
            }
        }
    })
    .to_string()
}

/// `vehicle_data` body with the vehicle parked at a coordinate.
#[allow(dead_code)]
pub fn parked_at(latitude: f64, longitude: f64) -> String {
    vehicle_data_body(serde_json::json!({
        "latitude": latitude,
        "longitude": longitude,
        "heading": 90,
        "speed": null,
        "timestamp": 1_700_000_000_123i64
    }))
}
