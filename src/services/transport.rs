// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP plumbing for the Owner API.
//!
//! Handles:
//! - The [`HttpClient`] seam and its reqwest implementation
//! - Classifying responses into typed [`Outcome`]s
//! - Bearer authentication with a single refresh-and-retry on HTTP 401

use crate::config::Config;
use crate::error::{Result, TeslaError};
use crate::services::auth::SessionAuthenticator;
use crate::store::keys;
use serde::{de::DeserializeOwned, Serialize};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    /// Sent as `application/x-www-form-urlencoded`, in order
    Form(Vec<(String, String)>),
}

/// A request handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| TeslaError::Internal(anyhow::anyhow!("Failed to encode body: {}", e)))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }
}

/// Raw response from an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// `Location` header, set on redirects
    pub location: Option<String>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Generic HTTP capability.
///
/// Only connection-level problems are errors; any HTTP status comes back
/// as an [`HttpResponse`].
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// What a response means for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    /// HTTP 401: the bearer token was rejected
    AuthExpired,
    /// HTTP 408: the vehicle is asleep
    VehicleAsleep,
    Error { status: u16, body: String },
}

impl From<HttpResponse> for Outcome {
    fn from(response: HttpResponse) -> Self {
        match response.status {
            200..=299 => Outcome::Success(response.body),
            401 => Outcome::AuthExpired,
            408 => Outcome::VehicleAsleep,
            status => Outcome::Error {
                status,
                body: response.body,
            },
        }
    }
}

impl Outcome {
    /// Body of a successful response, or the matching error.
    pub fn into_body(self) -> Result<String> {
        match self {
            Outcome::Success(body) => Ok(body),
            Outcome::AuthExpired => Err(TeslaError::AuthorizationFailure),
            Outcome::VehicleAsleep => Err(TeslaError::VehicleAsleep),
            Outcome::Error { status, body } => Err(TeslaError::Api { status, body }),
        }
    }
}

/// Decode a JSON body, logging the parse error on failure.
pub fn decode_json<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(url = %url, error = %e, "Failed to parse JSON response");
        TeslaError::MalformedResponse(format!("JSON parse error: {}", e))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// ReqwestClient - production HttpClient
// ─────────────────────────────────────────────────────────────────────────────

/// [`HttpClient`] backed by reqwest.
///
/// Clones share the connection pool and the cookie jar. Redirects are not
/// followed so the auth server's `Location` header reaches the caller.
#[derive(Clone)]
pub struct ReqwestClient {
    http: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl HttpClient for ReqwestClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = ?request.method, url = %request.url, "HTTP request");

        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };
        builder = builder.header(reqwest::header::ACCEPT, "application/json, text/plain, */*");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        tracing::debug!(status, url = %request.url, "HTTP response");
        Ok(HttpResponse {
            status,
            body,
            location,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AuthenticatedTransport - bearer auth with refresh-then-retry-once
// ─────────────────────────────────────────────────────────────────────────────

/// Sends bearer-authenticated requests.
///
/// A 401 triggers exactly one [`SessionAuthenticator::refresh`] followed by
/// exactly one retry of the identical request. Whatever the retry returns
/// is final.
pub struct AuthenticatedTransport<C> {
    http: C,
    auth: SessionAuthenticator<C>,
}

impl<C: HttpClient> AuthenticatedTransport<C> {
    pub fn new(http: C, auth: SessionAuthenticator<C>) -> Self {
        Self { http, auth }
    }

    pub fn authenticator(&self) -> &SessionAuthenticator<C> {
        &self.auth
    }

    pub fn authenticator_mut(&mut self) -> &mut SessionAuthenticator<C> {
        &mut self.auth
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T> {
        let body = self.send(HttpRequest::get(url)).await?;
        decode_json(url, &body)
    }

    /// POST an optional JSON body to `url` and decode the JSON response.
    pub async fn post_json<B, T>(&mut self, url: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = HttpRequest::post(url);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        let body = self.send(request).await?;
        decode_json(url, &body)
    }

    async fn send(&mut self, request: HttpRequest) -> Result<String> {
        let first = self.attempt(&request).await?;
        let outcome = match first {
            Outcome::AuthExpired => {
                tracing::info!(url = %request.url, "Access token rejected, refreshing");
                self.auth.refresh().await?;
                self.attempt(&request).await?
            }
            outcome => outcome,
        };

        if let Outcome::Error { status, .. } = &outcome {
            tracing::warn!(url = %request.url, status, "Owner API request failed");
        }
        outcome.into_body()
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<Outcome> {
        let token = self
            .auth
            .access_token()
            .ok_or(TeslaError::ConfigMissing(keys::ACCESS_TOKEN))?;
        let response = self
            .http
            .execute(request.clone().with_bearer(token))
            .await?;
        Ok(Outcome::from(response))
    }
}
