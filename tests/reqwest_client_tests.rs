// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests of the reqwest client against a local mock server.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tesla_session::config::Config;
use tesla_session::error::TeslaError;
use tesla_session::models::{FormFields, PkceState};
use tesla_session::services::{
    AuthenticatedTransport, HttpClient, HttpRequest, ReqwestClient, SessionAuthenticator,
};
use tesla_session::store::{keys, ConfigStore, MemoryConfigStore};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> ReqwestClient {
    ReqwestClient::new(&Config::default()).expect("http client")
}

fn token_store() -> Arc<MemoryConfigStore> {
    Arc::new(MemoryConfigStore::with_values([
        (keys::ACCESS_TOKEN, "old-access"),
        (keys::REFRESH_TOKEN, "old-refresh"),
    ]))
}

#[tokio::test]
async fn test_expired_token_is_refreshed_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/1/vehicles"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/1/vehicles"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": [], "count": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/v3/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "client_id": "ownerapi",
            "refresh_token": "old-refresh",
            "scope": "openid email offline_access"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 28800,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = token_store();
    let http = client();
    let auth = SessionAuthenticator::from_store(http.clone(), store.clone(), server.uri())
        .expect("tokens present");
    let mut transport = AuthenticatedTransport::new(http, auth);

    let vehicles: serde_json::Value = transport
        .get_json(&format!("{}/api/1/vehicles", server.uri()))
        .await
        .expect("retry succeeds");

    assert_eq!(vehicles["count"], 0);
    assert_eq!(store.get(keys::ACCESS_TOKEN).unwrap().as_deref(), Some("new-access"));
    assert_eq!(store.get(keys::REFRESH_TOKEN).unwrap().as_deref(), Some("new-refresh"));
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/v3/authorize"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", "https://auth.tesla.com/void/callback?code=c0de&state=s"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client()
        .execute(HttpRequest::post(format!("{}/oauth2/v3/authorize", server.uri())))
        .await
        .expect("response");

    assert_eq!(response.status, 302);
    assert_eq!(
        response.location.as_deref(),
        Some("https://auth.tesla.com/void/callback?code=c0de&state=s")
    );
}

#[tokio::test]
async fn test_identity_form_is_url_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/v3/authorize"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("identity=me%40example.com"))
        .and(body_string_contains("_csrf=tok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let mut auth = SessionAuthenticator::unauthenticated(
        client(),
        Arc::new(MemoryConfigStore::new()),
        server.uri(),
    );
    auth.begin_authorization(None);

    let mut fields = FormFields::new();
    fields.insert("_csrf", "tok");
    let response = auth
        .submit_identity("me@example.com", &fields)
        .await
        .expect("response");

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_login_page_hidden_fields_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v3/authorize"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<form><input type="hidden" name="_csrf" value="abc"><input type="email" name="identity"></form>"#,
        ))
        .mount(&server)
        .await;

    let mut auth = SessionAuthenticator::unauthenticated(
        client(),
        Arc::new(MemoryConfigStore::new()),
        server.uri(),
    );
    let url = auth.begin_authorization(Some("me@example.com"));
    let fields = auth.fetch_login_form(&url).await.expect("form");

    assert_eq!(fields.len(), 1);
    assert_eq!(fields.get("_csrf"), Some("abc"));
}

#[tokio::test]
async fn test_code_exchange_sends_verifier() {
    let server = MockServer::start().await;
    let mut auth = SessionAuthenticator::unauthenticated(
        client(),
        Arc::new(MemoryConfigStore::new()),
        server.uri(),
    );
    auth.begin_authorization(None);
    let pending: &PkceState = auth.pending_authorization().expect("pkce");

    Mock::given(method("POST"))
        .and(path("/oauth2/v3/token"))
        .and(body_partial_json(json!({
            "grant_type": "authorization_code",
            "code": "c0de",
            "code_verifier": pending.code_verifier(),
            "redirect_uri": "https://auth.tesla.com/void/callback"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a1",
            "refresh_token": "r1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = auth.exchange_code("c0de").await.expect("tokens");
    assert_eq!(credentials.access_token(), "a1");
}

fn client_with_read_timeout(read_timeout: Duration) -> ReqwestClient {
    let config = Config {
        read_timeout,
        ..Config::default()
    };
    ReqwestClient::new(&config).expect("http client")
}

#[tokio::test]
async fn test_slow_response_within_read_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/vehicles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let response = client_with_read_timeout(Duration::from_secs(5))
        .execute(HttpRequest::get(format!("{}/api/1/vehicles", server.uri())))
        .await
        .expect("response");

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_stalled_response_hits_read_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/1/vehicles"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let result = client_with_read_timeout(Duration::from_millis(200))
        .execute(HttpRequest::get(format!("{}/api/1/vehicles", server.uri())))
        .await;

    assert!(matches!(result, Err(TeslaError::Transport(_))));
}
