//! Token endpoint calls and authorization-URL construction (RFC 6749 with
//! PKCE, RFC 7636).

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::secrets::ClientSecret;
use crate::error::{oauth_error, GoogleError};

/// Successful token-endpoint response.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    #[must_use]
    pub fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .and_then(chrono::Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
    }

    #[must_use]
    pub fn granted_scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_deref()
            .map(|s| s.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|scopes| !scopes.is_empty())
    }
}

/// PKCE verifier and its S256 challenge.
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
}

impl Pkce {
    #[must_use]
    pub fn generate() -> Self {
        let verifier = random_urlsafe(32);
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }
}

/// `len` random bytes, base64url-encoded without padding.
pub(crate) fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the consent-screen URL for an installed-app authorization request.
///
/// Requests offline access and forces the consent prompt so Google issues a
/// refresh token even when the user has authorized the client before.
///
/// # Errors
///
/// Returns [`GoogleError::InvalidUrl`] if the secret's `auth_uri` does not parse.
pub fn authorization_url(
    secret: &ClientSecret,
    redirect_uri: &str,
    scopes: &[&str],
    state: &str,
    code_challenge: &str,
) -> Result<Url, GoogleError> {
    let mut url = Url::parse(&secret.auth_uri).map_err(|e| GoogleError::InvalidUrl {
        url: secret.auth_uri.clone(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("client_id", &secret.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

/// Client for the OAuth token endpoint.
pub struct OAuthClient {
    client: Client,
}

impl OAuthClient {
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Exchange an authorization code for tokens at `secret.token_uri`.
    ///
    /// # Errors
    ///
    /// - [`GoogleError::OAuth`] if the endpoint rejects the code.
    /// - [`GoogleError::Http`] on network failure.
    /// - [`GoogleError::Deserialize`] if the success body is malformed.
    pub async fn exchange_code(
        &self,
        secret: &ClientSecret,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let params = [
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];
        self.token_request(&secret.token_uri, &params).await
    }

    /// Mint a new access token from a refresh token.
    ///
    /// # Errors
    ///
    /// - [`GoogleError::OAuth`] if the endpoint rejects the refresh token
    ///   (`invalid_grant` when it was revoked or expired).
    /// - [`GoogleError::Http`] on network failure.
    /// - [`GoogleError::Deserialize`] if the success body is malformed.
    pub async fn refresh(
        &self,
        token_uri: &str,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenResponse, GoogleError> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        self.token_request(token_uri, &params).await
    }

    async fn token_request(
        &self,
        token_uri: &str,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, GoogleError> {
        let response = self.client.post(token_uri).form(params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = oauth_error(status.as_u16(), &body);
            tracing::warn!(token_uri, status = status.as_u16(), error = %err, "token request failed");
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|e| GoogleError::Deserialize {
            context: format!("token response from {token_uri}"),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> ClientSecret {
        serde_json::from_value(serde_json::json!({
            "client_id": "client-123",
            "client_secret": "shh"
        }))
        .unwrap()
    }

    #[test]
    fn pkce_challenge_is_s256_of_verifier() {
        let pkce = Pkce::generate();
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.verifier.as_bytes()));
        assert_eq!(pkce.challenge, expected);
        assert_eq!(pkce.verifier.len(), 43);
    }

    #[test]
    fn pkce_verifiers_differ() {
        assert_ne!(Pkce::generate().verifier, Pkce::generate().verifier);
    }

    #[test]
    fn authorization_url_carries_offline_pkce_parameters() {
        let url = authorization_url(
            &secret(),
            "http://127.0.0.1:8080/",
            &["scope-a", "scope-b"],
            "state-xyz",
            "challenge-abc",
        )
        .unwrap();
        let pairs: std::collections::HashMap<String, String> =
            url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(pairs["client_id"], "client-123");
        assert_eq!(pairs["redirect_uri"], "http://127.0.0.1:8080/");
        assert_eq!(pairs["scope"], "scope-a scope-b");
        assert_eq!(pairs["state"], "state-xyz");
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert_eq!(pairs["access_type"], "offline");
        assert_eq!(pairs["prompt"], "consent");
        assert!(!url.as_str().contains("shh"), "secret must not leak into URL");
    }

    #[test]
    fn granted_scopes_split_on_whitespace() {
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "a",
            "scope": "s1  s2"
        }))
        .unwrap();
        assert_eq!(
            response.granted_scopes(),
            Some(vec!["s1".to_string(), "s2".to_string()])
        );
    }
    #[test]
    fn expiry_adds_lifetime_to_now() {
        let now = Utc::now();
        let response: TokenResponse = serde_json::from_value(serde_json::json!({
            "access_token": "a",
            "expires_in": 3599
        }))
        .unwrap();
        assert_eq!(
            response.expiry(now),
            Some(now + chrono::Duration::seconds(3599))
        );
    }

    #[test]
    fn expiry_out_of_range_lifetime_is_none() {
        let now = Utc::now();
        for secs in [i64::MAX, i64::MIN, 1_000_000_000_000_000] {
            let response: TokenResponse = serde_json::from_value(serde_json::json!({
                "access_token": "a",
                "expires_in": secs
            }))
            .unwrap();
            assert_eq!(response.expiry(now), None, "expires_in = {secs}");
        }
    }
}
