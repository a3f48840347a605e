//! Google API clients for site provisioning.
//!
//! Covers the OAuth installed-app flow, the Analytics Admin API (accounts,
//! GA4 properties, web data streams) and the Search Console `sites` resource.

pub mod analytics;
pub mod auth;
pub mod error;
pub mod search_console;
pub mod types;

mod http;

pub use analytics::AnalyticsAdminClient;
pub use auth::{Credential, CredentialManager, CredentialSource, LoopbackAuthorizer, OAuthClient};
pub use error::{ApiErrorKind, GoogleError};
pub use search_console::SearchConsoleClient;
pub use types::{
    Account, DataStream, NewProperty, NewWebDataStream, Property, SiteEntry, WebStreamData,
};
