// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth2 PKCE models: credentials, PKCE state, token grants.

use crate::error::{Result, TeslaError};
use crate::store::keys;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Alphabet for the code verifier and state token.
pub const PKCE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";
pub const CODE_VERIFIER_LEN: usize = 86;
pub const STATE_LEN: usize = 10;

/// OAuth client id of the Owner API.
pub const CLIENT_ID: &str = "ownerapi";
pub const REDIRECT_URI: &str = "https://auth.tesla.com/void/callback";
pub const SCOPES: &str = "openid email offline_access";

/// Access/refresh token pair. Both are always non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_token: String,
    refresh_token: String,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        if access_token.is_empty() {
            return Err(TeslaError::ConfigMissing(keys::ACCESS_TOKEN));
        }
        if refresh_token.is_empty() {
            return Err(TeslaError::ConfigMissing(keys::REFRESH_TOKEN));
        }
        Ok(Self {
            access_token,
            refresh_token,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Secrets for one authorization attempt.
#[derive(Debug, Clone)]
pub struct PkceState {
    code_verifier: String,
    code_challenge: String,
    state: String,
}

impl PkceState {
    /// Generate a fresh verifier, challenge and state token.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let verifier = random_string(&mut rng, CODE_VERIFIER_LEN);
        let state = random_string(&mut rng, STATE_LEN);
        Self::from_parts(verifier, state)
    }

    /// Build PKCE state from a known verifier and state token.
    pub fn from_parts(code_verifier: String, state: String) -> Self {
        let code_challenge = code_challenge(&code_verifier);
        Self {
            code_verifier,
            code_challenge,
            state,
        }
    }

    pub fn code_verifier(&self) -> &str {
        &self.code_verifier
    }

    pub fn code_challenge(&self) -> &str {
        &self.code_challenge
    }

    pub fn state(&self) -> &str {
        &self.state
    }
}

/// URL-safe, unpadded base64 of SHA-256(verifier).
pub fn code_challenge(code_verifier: &str) -> String {
    let digest = Sha256::digest(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| PKCE_ALPHABET[rng.gen_range(0..PKCE_ALPHABET.len())] as char)
        .collect()
}

/// Hidden form fields scraped from the login page, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field. A repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// `authorization_code` grant body.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationCodeGrant<'a> {
    pub grant_type: &'static str,
    pub client_id: &'static str,
    pub code: &'a str,
    pub code_verifier: &'a str,
    pub redirect_uri: &'static str,
}

impl<'a> AuthorizationCodeGrant<'a> {
    pub fn new(code: &'a str, code_verifier: &'a str) -> Self {
        Self {
            grant_type: "authorization_code",
            client_id: CLIENT_ID,
            code,
            code_verifier,
            redirect_uri: REDIRECT_URI,
        }
    }
}

/// `refresh_token` grant body.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenGrant<'a> {
    pub grant_type: &'static str,
    pub client_id: &'static str,
    pub scope: &'static str,
    pub refresh_token: &'a str,
}

impl<'a> RefreshTokenGrant<'a> {
    pub fn new(refresh_token: &'a str) -> Self {
        Self {
            grant_type: "refresh_token",
            client_id: CLIENT_ID,
            scope: SCOPES,
            refresh_token,
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
    pub state: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<String>,
}

impl TokenResponse {
    /// Both tokens, if the response carried both.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Credentials::new(access.clone(), refresh.clone()).ok(),
            _ => None,
        }
    }
}
