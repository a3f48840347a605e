//! Persisted OAuth token in Google's "authorized user" JSON layout, so the
//! file stays interchangeable with other Google client libraries.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::oauth::TokenResponse;
use super::secrets::{default_token_uri, ClientSecret};
use crate::error::GoogleError;

/// Tokens expiring within this window are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Clone, Serialize, Deserialize)]
pub struct StoredToken {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &self.access_token.as_ref().map(|_| "[redacted]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// Where a stored token stands relative to the scopes a run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// No token file, or one that could not be read.
    Absent,
    /// Usable as-is.
    Valid,
    /// Expired, but a refresh token can mint a new access token.
    ExpiredRefreshable,
    /// Needs interactive authorization: expired without a refresh token, or
    /// granted scopes do not cover the requested ones.
    Invalid,
}

impl StoredToken {
    /// Build a token from an authorization-code exchange.
    ///
    /// Granted scopes come from the response when present, otherwise the
    /// requested scopes are recorded.
    #[must_use]
    pub fn from_exchange(
        response: TokenResponse,
        secret: &ClientSecret,
        requested_scopes: &[&str],
        now: DateTime<Utc>,
    ) -> Self {
        let scopes = response.granted_scopes().unwrap_or_else(|| {
            requested_scopes.iter().map(|s| (*s).to_string()).collect()
        });
        Self {
            expiry: response.expiry(now),
            access_token: Some(response.access_token),
            refresh_token: response.refresh_token,
            token_uri: secret.token_uri.clone(),
            client_id: secret.client_id.clone(),
            client_secret: secret.client_secret.clone(),
            scopes,
        }
    }

    /// Fold a refresh response into this token. The refresh token is kept
    /// when the response does not rotate it.
    pub fn apply_refresh(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.expiry = response.expiry(now);
        if let Some(scopes) = response.granted_scopes() {
            self.scopes = scopes;
        }
        if response.refresh_token.is_some() {
            self.refresh_token = response.refresh_token;
        }
        self.access_token = Some(response.access_token);
    }

    /// `true` if every requested scope was granted.
    #[must_use]
    pub fn covers(&self, requested_scopes: &[&str]) -> bool {
        requested_scopes
            .iter()
            .all(|wanted| self.scopes.iter().any(|granted| granted == wanted))
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let has_access = self.access_token.as_deref().is_some_and(|t| !t.is_empty());
        if !has_access {
            return true;
        }
        let deadline = now + Duration::seconds(EXPIRY_SKEW_SECS);
        self.expiry.is_some_and(|exp| exp <= deadline)
    }

    #[must_use]
    pub fn state(&self, requested_scopes: &[&str], now: DateTime<Utc>) -> CredentialState {
        if !self.covers(requested_scopes) {
            return CredentialState::Invalid;
        }
        if !self.is_expired(now) {
            return CredentialState::Valid;
        }
        if self.refresh_token.as_deref().is_some_and(|t| !t.is_empty()) {
            CredentialState::ExpiredRefreshable
        } else {
            CredentialState::Invalid
        }
    }
}

/// Read a stored token. A missing file is `Ok(None)`.
///
/// # Errors
///
/// - [`GoogleError::Io`] if the file exists but cannot be read.
/// - [`GoogleError::Deserialize`] if its contents are not a token.
pub fn load_token(path: &Path) -> Result<Option<StoredToken>, GoogleError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(GoogleError::io(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| GoogleError::Deserialize {
            context: path.display().to_string(),
            source: e,
        })
}

/// Write the token as pretty JSON, replacing any previous file.
///
/// The JSON goes to a sibling `.tmp` file which is then renamed over `path`.
///
/// # Errors
///
/// Returns [`GoogleError::Io`] if the directory or file cannot be written.
pub fn save_token(path: &Path, token: &StoredToken) -> Result<(), GoogleError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GoogleError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(token).map_err(|e| GoogleError::Deserialize {
        context: "serialize token".to_string(),
        source: e,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    std::fs::write(&tmp, json).map_err(|e| GoogleError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| GoogleError::io(path, e))?;
    Ok(())
}
