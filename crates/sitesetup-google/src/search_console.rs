//! HTTP client for the Search Console `sites` resource (webmasters v3).

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::GoogleError;
use crate::http::ApiTransport;
use crate::types::{SiteEntry, SitesList};

const DEFAULT_BASE_URL: &str = "https://searchconsole.googleapis.com/webmasters/v3/";

/// Everything except RFC 3986 unreserved characters, so a site URL such as
/// `https://example.com/` fits in a single path segment.
const SITE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub struct SearchConsoleClient {
    transport: ApiTransport,
}

impl SearchConsoleClient {
    /// Creates a client pointed at the production Search Console API.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GoogleError> {
        Self::with_base_url(access_token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GoogleError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GoogleError> {
        Ok(Self {
            transport: ApiTransport::new(access_token, timeout_secs, user_agent, base_url)?,
        })
    }

    /// Lists every site in the user's Search Console.
    ///
    /// # Errors
    ///
    /// - [`GoogleError::Api`] on a non-2xx response.
    /// - [`GoogleError::Http`] on network failure.
    /// - [`GoogleError::Deserialize`] if the response shape is unexpected.
    pub async fn list_sites(&self) -> Result<Vec<SiteEntry>, GoogleError> {
        let url = self.transport.url("sites", &[])?;
        let list: SitesList = self.transport.get_json(url).await?;
        Ok(list.site_entry)
    }

    /// Adds `site_url` (e.g. `https://example.com/`) to Search Console.
    ///
    /// The site still needs ownership verification afterwards.
    ///
    /// # Errors
    ///
    /// Same as [`SearchConsoleClient::list_sites`]. Inspect
    /// [`GoogleError::kind`] to tell "already added" or "permission denied"
    /// apart from other failures.
    pub async fn add_site(&self, site_url: &str) -> Result<(), GoogleError> {
        let url = self.transport.url(&Self::site_path(site_url), &[])?;
        self.transport.put_empty(url).await?;
        tracing::info!(site_url, "added site to search console");
        Ok(())
    }

    /// Fetches one site, including the caller's permission level.
    ///
    /// # Errors
    ///
    /// Same as [`SearchConsoleClient::list_sites`].
    pub async fn get_site(&self, site_url: &str) -> Result<SiteEntry, GoogleError> {
        let url = self.transport.url(&Self::site_path(site_url), &[])?;
        self.transport.get_json(url).await
    }

    fn site_path(site_url: &str) -> String {
        format!("sites/{}", utf8_percent_encode(site_url, SITE_SEGMENT))
    }
}
