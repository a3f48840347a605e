//! HTTP client for the Google Analytics Admin REST API (v1beta).

use crate::error::GoogleError;
use crate::http::{ApiTransport, MAX_PAGES};
use crate::types::{
    Account, AccountsPage, DataStream, DataStreamsPage, ListPage, NewProperty, NewWebDataStream,
    PropertiesPage, Property,
};

const DEFAULT_BASE_URL: &str = "https://analyticsadmin.googleapis.com/v1beta/";
const PAGE_SIZE: &str = "200";

/// Client for the Analytics Admin API.
///
/// Use [`AnalyticsAdminClient::new`] for production or
/// [`AnalyticsAdminClient::with_base_url`] to point at a mock server in tests.
pub struct AnalyticsAdminClient {
    transport: ApiTransport,
}

impl AnalyticsAdminClient {
    /// Creates a client pointed at the production Analytics Admin API.
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

    /// Lists every account the authenticated user can access.
    ///
    /// # Errors
    ///
    /// - [`GoogleError::Api`] on a non-2xx response.
    /// - [`GoogleError::Http`] on network failure.
    /// - [`GoogleError::Deserialize`] if the response shape is unexpected.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, GoogleError> {
        self.list_all::<AccountsPage>("accounts", &[]).await
    }

    /// Lists the properties directly under `account` (e.g. `accounts/123`).
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsAdminClient::list_accounts`].
    pub async fn list_properties(&self, account: &str) -> Result<Vec<Property>, GoogleError> {
        let filter = format!("parent:{account}");
        self.list_all::<PropertiesPage>("properties", &[("filter", &filter)])
            .await
    }

    /// Creates a GA4 property.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsAdminClient::list_accounts`].
    pub async fn create_property(&self, property: &NewProperty) -> Result<Property, GoogleError> {
        let url = self.transport.url("properties", &[])?;
        let created: Property = self.transport.post_json(url, property).await?;
        tracing::info!(
            property = %created.name,
            display_name = %created.display_name,
            "created analytics property"
        );
        Ok(created)
    }

    /// Lists the data streams of `property` (e.g. `properties/456`).
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsAdminClient::list_accounts`].
    pub async fn list_data_streams(&self, property: &str) -> Result<Vec<DataStream>, GoogleError> {
        let path = format!("{property}/dataStreams");
        self.list_all::<DataStreamsPage>(&path, &[]).await
    }

    /// Creates a web data stream under `property`.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyticsAdminClient::list_accounts`].
    pub async fn create_web_data_stream(
        &self,
        property: &str,
        stream: &NewWebDataStream,
    ) -> Result<DataStream, GoogleError> {
        let url = self.transport.url(&format!("{property}/dataStreams"), &[])?;
        let created: DataStream = self.transport.post_json(url, stream).await?;
        tracing::info!(
            stream = %created.name,
            measurement_id = created.measurement_id().unwrap_or("-"),
            "created web data stream"
        );
        Ok(created)
    }

    /// Follows `nextPageToken` until the listing is exhausted.
    async fn list_all<P>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<P::Item>, GoogleError>
    where
        P: ListPage + serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut params: Vec<(&str, &str)> = query.to_vec();
            params.push(("pageSize", PAGE_SIZE));
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }
            let url = self.transport.url(path, &params)?;
            let page: P = self.transport.get_json(url).await?;
            let (batch, next) = page.into_parts();
            items.extend(batch);

            match next.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => return Ok(items),
            }
        }

        tracing::warn!(path, max_pages = MAX_PAGES, "pagination limit reached; results truncated");
        Ok(items)
    }
}
