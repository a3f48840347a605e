use std::path::PathBuf;

use chrono::Utc;

use super::loopback::{AuthorizationRequest, Authorizer, LoopbackAuthorizer};
use super::oauth::{random_urlsafe, OAuthClient, Pkce};
use super::secrets::load_client_secret;
use super::token::{load_token, save_token, CredentialState, StoredToken};
use crate::error::GoogleError;

/// Scopes needed to provision GA4 properties and register Search Console sites.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/analytics.edit",
    "https://www.googleapis.com/auth/analytics.readonly",
    "https://www.googleapis.com/auth/webmasters",
];

/// How the returned access token was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Stored,
    Refreshed,
    Authorized,
}

impl CredentialSource {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Refreshed => "refreshed",
            Self::Authorized => "authorized",
        }
    }
}

/// A bearer token ready for API calls.
#[derive(Clone)]
pub struct Credential {
    pub access_token: String,
    pub source: CredentialSource,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field("source", &self.source)
            .finish()
    }
}

/// Produces a valid access token from the token file, a refresh, or the
/// interactive flow, and keeps the token file current.
pub struct CredentialManager<A: Authorizer = LoopbackAuthorizer> {
    secret_path: PathBuf,
    token_path: PathBuf,
    oauth: OAuthClient,
    authorizer: A,
}

impl<A: Authorizer> CredentialManager<A> {
    pub fn new(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
        oauth: OAuthClient,
        authorizer: A,
    ) -> Self {
        Self {
            secret_path: secret_path.into(),
            token_path: token_path.into(),
            oauth,
            authorizer,
        }
    }

    /// State of the token file right now, without touching the network.
    /// An unreadable token file reads as [`CredentialState::Absent`].
    #[must_use]
    pub fn current_state(&self) -> CredentialState {
        self.stored_token()
            .map_or(CredentialState::Absent, |t| t.state(SCOPES, Utc::now()))
    }

    /// Return a usable access token.
    ///
    /// 1. A stored token that is unexpired and covers the scopes is returned
    ///    without writing anything.
    /// 2. An expired token with a refresh token is refreshed and saved. If the
    ///    refresh token was revoked (`invalid_grant`) the flow continues at 3.
    /// 3. Otherwise the user authorizes interactively and the new token is saved.
    ///
    /// # Errors
    ///
    /// - [`GoogleError::AuthRequired`] if interactive authorization is needed
    ///   but the client secret file does not exist.
    /// - [`GoogleError::OAuth`] if the refresh, consent or code exchange fails.
    /// - [`GoogleError::Io`] if the token file cannot be written.
    pub async fn obtain(&self) -> Result<Credential, GoogleError> {
        let now = Utc::now();
        let stored = self.stored_token();
        let state = stored
            .as_ref()
            .map_or(CredentialState::Absent, |t| t.state(SCOPES, now));
        tracing::debug!(?state, path = %self.token_path.display(), "stored credential state");

        match (state, stored) {
            (CredentialState::Valid, Some(token)) => {
                if let Some(access_token) = token.access_token {
                    return Ok(Credential {
                        access_token,
                        source: CredentialSource::Stored,
                    });
                }
            }
            (CredentialState::ExpiredRefreshable, Some(token)) => match self.refresh(token).await {
                Ok(credential) => return Ok(credential),
                Err(e) if e.is_invalid_grant() => {
                    tracing::warn!("refresh token was rejected; re-authorization required");
                }
                Err(e) => return Err(e),
            },
            _ => {}
        }

        self.authorize_interactively().await
    }

    fn stored_token(&self) -> Option<StoredToken> {
        match load_token(&self.token_path) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable token file");
                None
            }
        }
    }

    async fn refresh(&self, mut token: StoredToken) -> Result<Credential, GoogleError> {
        let refresh_token = token.refresh_token.clone().unwrap_or_default();
        let response = self
            .oauth
            .refresh(
                &token.token_uri,
                &token.client_id,
                &token.client_secret,
                &refresh_token,
            )
            .await?;
        token.apply_refresh(response, Utc::now());
        save_token(&self.token_path, &token)?;
        tracing::info!(path = %self.token_path.display(), "refreshed access token");
        Ok(Credential {
            access_token: token.access_token.unwrap_or_default(),
            source: CredentialSource::Refreshed,
        })
    }

    async fn authorize_interactively(&self) -> Result<Credential, GoogleError> {
        if !self.secret_path.exists() {
            return Err(GoogleError::AuthRequired(format!(
                "OAuth client secret not found at {}. Create an OAuth client ID of type \
                 \"Desktop app\" in the Google Cloud console, enable the Google Analytics \
                 Admin API and the Search Console API, and save the downloaded JSON to that path.",
                self.secret_path.display()
            )));
        }
        let secret = load_client_secret(&self.secret_path)?;

        let pkce = Pkce::generate();
        let state = random_urlsafe(16);
        let request = AuthorizationRequest {
            secret: &secret,
            scopes: SCOPES,
            state: &state,
            code_challenge: &pkce.challenge,
        };
        let code = self.authorizer.authorize(&request).await?;

        let response = self
            .oauth
            .exchange_code(&secret, &code.code, &pkce.verifier, &code.redirect_uri)
            .await?;
        if response.refresh_token.is_none() {
            tracing::warn!("token response carried no refresh token; the next run will prompt again");
        }
        let token = StoredToken::from_exchange(response, &secret, SCOPES, Utc::now());
        save_token(&self.token_path, &token)?;
        tracing::info!(path = %self.token_path.display(), "saved new credentials");

        Ok(Credential {
            access_token: token.access_token.unwrap_or_default(),
            source: CredentialSource::Authorized,
        })
    }
}
