// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 PKCE login and token refresh against the Tesla auth server.
//!
//! The login runs in steps driven by the caller:
//! 1. [`SessionAuthenticator::begin_authorization`] builds the authorize URL
//! 2. [`SessionAuthenticator::fetch_login_form`] scrapes the hidden fields
//! 3. [`SessionAuthenticator::submit_identity`] posts the account email
//! 4. [`SessionAuthenticator::exchange_code`] trades the code for tokens

use crate::error::{Result, TeslaError};
use crate::models::auth::{
    AuthorizationCodeGrant, Credentials, FormFields, PkceState, RefreshTokenGrant, TokenResponse,
    CLIENT_ID, REDIRECT_URI, SCOPES,
};
use crate::services::transport::{decode_json, HttpClient, HttpRequest, HttpResponse, Outcome};
use crate::store::{keys, ConfigStore};
use std::sync::Arc;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    AwaitingAuthorization,
    Authenticated,
    Refreshing,
    /// The refresh call itself failed; a new login is needed
    Fatal,
}

/// Owns the bearer credential and the PKCE state of a login in progress.
pub struct SessionAuthenticator<C> {
    http: C,
    store: Arc<dyn ConfigStore>,
    auth_base_url: String,
    credentials: Option<Credentials>,
    pkce: Option<PkceState>,
    state: AuthState,
}

impl<C: HttpClient> SessionAuthenticator<C> {
    /// Start from the tokens persisted in `store`.
    ///
    /// Fails with [`TeslaError::ConfigMissing`] if either token is absent.
    pub fn from_store(
        http: C,
        store: Arc<dyn ConfigStore>,
        auth_base_url: impl Into<String>,
    ) -> Result<Self> {
        let access_token = store
            .get(keys::ACCESS_TOKEN)?
            .ok_or(TeslaError::ConfigMissing(keys::ACCESS_TOKEN))?;
        let refresh_token = store
            .get(keys::REFRESH_TOKEN)?
            .ok_or(TeslaError::ConfigMissing(keys::REFRESH_TOKEN))?;
        let credentials = Credentials::new(access_token, refresh_token)?;

        Ok(Self {
            http,
            store,
            auth_base_url: auth_base_url.into(),
            credentials: Some(credentials),
            pkce: None,
            state: AuthState::Authenticated,
        })
    }

    /// Start without credentials, for running a fresh login.
    pub fn unauthenticated(
        http: C,
        store: Arc<dyn ConfigStore>,
        auth_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            store,
            auth_base_url: auth_base_url.into(),
            credentials: None,
            pkce: None,
            state: AuthState::Unauthenticated,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Current bearer token.
    pub fn access_token(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::access_token)
    }

    /// PKCE state of the login in progress.
    pub fn pending_authorization(&self) -> Option<&PkceState> {
        self.pkce.as_ref()
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/oauth2/v3/authorize", self.auth_base_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth2/v3/token", self.auth_base_url)
    }

    // ─── Authorization ───────────────────────────────────────────────────────

    /// Generate fresh PKCE state and return the URL of the login page.
    pub fn begin_authorization(&mut self, email_hint: Option<&str>) -> String {
        let pkce = PkceState::generate();
        let url = format!(
            "{}?{}",
            self.authorize_url(),
            authorize_query(&pkce, email_hint)
        );
        self.pkce = Some(pkce);
        self.state = AuthState::AwaitingAuthorization;
        tracing::info!(with_hint = email_hint.is_some(), "Authorization started");
        url
    }

    /// GET the login page and collect its hidden form fields.
    pub async fn fetch_login_form(&self, url: &str) -> Result<FormFields> {
        let response = self.http.execute(HttpRequest::get(url)).await?;
        let body = Outcome::from(response).into_body()?;
        let fields = parse_hidden_inputs(&body);
        tracing::debug!(count = fields.len(), "Scraped login form fields");
        Ok(fields)
    }

    /// POST the identity step of the login form.
    ///
    /// The response is returned untouched; the following login steps are
    /// up to the caller.
    pub async fn submit_identity(
        &self,
        email: &str,
        extra_fields: &FormFields,
    ) -> Result<HttpResponse> {
        let pkce = self
            .pkce
            .as_ref()
            .ok_or(TeslaError::AuthorizationNotStarted)?;
        let url = format!("{}?{}", self.authorize_url(), authorize_query(pkce, None));

        let mut form = Vec::with_capacity(extra_fields.len() + 1);
        form.push(("identity".to_string(), email.to_string()));
        form.extend(
            extra_fields
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );

        tracing::info!(fields = form.len(), "Submitting login identity");
        self.http.execute(HttpRequest::post(url).form(form)).await
    }

    /// Extract the authorization code from the redirect to the callback URL.
    ///
    /// The `state` parameter must match the login in progress.
    pub fn authorization_code_from_callback(&self, callback_url: &str) -> Result<String> {
        let pkce = self
            .pkce
            .as_ref()
            .ok_or(TeslaError::AuthorizationNotStarted)?;
        let url = reqwest::Url::parse(callback_url).map_err(|e| {
            TeslaError::Internal(anyhow::anyhow!("Invalid callback URL: {}", e))
        })?;

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                _ => {}
            }
        }

        if state.as_deref() != Some(pkce.state()) {
            tracing::warn!("OAuth callback state does not match");
            return Err(TeslaError::StateMismatch);
        }
        code.filter(|c| !c.is_empty())
            .ok_or(TeslaError::MissingAuthorizationCode)
    }

    /// Exchange an authorization code for tokens and persist them.
    pub async fn exchange_code(&mut self, code: &str) -> Result<Credentials> {
        let pkce = self
            .pkce
            .as_ref()
            .ok_or(TeslaError::AuthorizationNotStarted)?;
        let grant = AuthorizationCodeGrant::new(code, pkce.code_verifier());
        let response = self.post_token(&grant).await?;

        let credentials = response.credentials().ok_or_else(|| {
            TeslaError::MalformedResponse("token response is missing a token".to_string())
        })?;

        self.persist(&credentials);
        self.credentials = Some(credentials.clone());
        self.pkce = None;
        self.state = AuthState::Authenticated;
        tracing::info!("Authorization code exchanged for tokens");
        Ok(credentials)
    }

    // ─── Token Refresh ───────────────────────────────────────────────────────

    /// Trade the refresh token for a new token pair.
    ///
    /// Returns `Ok(false)` when the server answered without both tokens; the
    /// previous tokens are kept in that case.
    pub async fn refresh(&mut self) -> Result<bool> {
        let refresh_token = self
            .credentials
            .as_ref()
            .map(|c| c.refresh_token().to_string())
            .ok_or(TeslaError::ConfigMissing(keys::REFRESH_TOKEN))?;

        self.state = AuthState::Refreshing;
        let response = match self.post_token(&RefreshTokenGrant::new(&refresh_token)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Token refresh failed");
                self.state = AuthState::Fatal;
                return Err(e);
            }
        };

        self.state = AuthState::Authenticated;
        match response.credentials() {
            Some(credentials) => {
                self.persist(&credentials);
                self.credentials = Some(credentials);
                tracing::info!("Access token refreshed");
                Ok(true)
            }
            None => {
                tracing::error!("Token refresh response did not contain new tokens");
                Ok(false)
            }
        }
    }

    async fn post_token<G: serde::Serialize>(&self, grant: &G) -> Result<TokenResponse> {
        let url = self.token_url();
        let response = self.http.execute(HttpRequest::post(&url).json(grant)?).await?;
        if !response.is_success() {
            tracing::error!(status = response.status, "Token endpoint rejected request");
        }
        let body = Outcome::from(response).into_body()?;
        decode_json(&url, &body)
    }

    fn persist(&self, credentials: &Credentials) {
        let changes = [
            (keys::ACCESS_TOKEN, credentials.access_token().to_string()),
            (keys::REFRESH_TOKEN, credentials.refresh_token().to_string()),
        ];
        if let Err(e) = self.store.update(&changes) {
            tracing::warn!(error = %e, "Failed to persist tokens, continuing anyway");
        }
    }
}

/// Query string shared by the authorize GET and the identity POST.
fn authorize_query(pkce: &PkceState, login_hint: Option<&str>) -> String {
    let mut query = format!(
        "client_id={}&code_challenge={}&code_challenge_method=S256&redirect_uri={}\
         &response_type=code&scope={}&state={}",
        CLIENT_ID,
        urlencoding::encode(pkce.code_challenge()),
        urlencoding::encode(REDIRECT_URI),
        urlencoding::encode(SCOPES),
        urlencoding::encode(pkce.state()),
    );
    if let Some(hint) = login_hint {
        query.push_str("&login_hint=");
        query.push_str(&urlencoding::encode(hint));
    }
    query
}

/// Collect `name`/`value` of every `<input type="hidden">` in `html`.
pub fn parse_hidden_inputs(html: &str) -> FormFields {
    let mut fields = FormFields::new();
    let mut rest = html;

    while let Some(start) = rest.find("<input") {
        let tag_start = &rest[start..];
        let Some(end) = tag_end(tag_start) else {
            break;
        };
        let tag = &tag_start[..end];
        rest = &tag_start[end..];

        if attribute(tag, "type").is_some_and(|t| t.eq_ignore_ascii_case("hidden")) {
            if let Some(name) = attribute(tag, "name") {
                fields.insert(name, attribute(tag, "value").unwrap_or(""));
            }
        }
    }
    fields
}

/// Offset of the `>` closing a tag, skipping any inside quoted values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in tag.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Value of a double-quoted attribute inside a tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{}=\"", name);
    let mut from = 0;
    while let Some(pos) = tag[from..].find(&needle) {
        let start = from + pos;
        let value_start = start + needle.len();
        if tag[..start].ends_with(char::is_whitespace) {
            let len = tag[value_start..].find('"')?;
            return Some(&tag[value_start..value_start + len]);
        }
        from = value_start;
    }
    None
}
