//! OAuth 2.0 credentials for an installed (desktop) application.
//!
//! [`CredentialManager::obtain`] is the entry point: it reuses a stored
//! token, refreshes an expired one, or falls back to the interactive
//! loopback authorization flow, persisting the token after every change.

mod loopback;
mod manager;
mod oauth;
mod secrets;
mod token;

pub use loopback::{AuthorizationCode, AuthorizationRequest, Authorizer, LoopbackAuthorizer};
pub use manager::{Credential, CredentialManager, CredentialSource, SCOPES};
pub use oauth::{OAuthClient, Pkce, TokenResponse};
pub use secrets::{load_client_secret, ClientSecret};
pub use token::{load_token, save_token, CredentialState, StoredToken};
