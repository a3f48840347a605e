//! Request and response types for the Analytics Admin (v1beta) and Search
//! Console (webmasters v3) REST APIs.
//!
//! Only the fields the provisioning flow reads or writes are modelled;
//! everything else in the JSON is ignored.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Analytics Admin
// ---------------------------------------------------------------------------

/// A Google Analytics account, e.g. `accounts/123456`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// A GA4 property, e.g. `properties/987654`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

/// Body for `POST properties`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    /// Owning account resource name, e.g. `accounts/123456`.
    pub parent: String,
    pub display_name: String,
    pub time_zone: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStream {
    pub name: String,
    /// `WEB_DATA_STREAM`, `ANDROID_APP_DATA_STREAM` or `IOS_APP_DATA_STREAM`.
    #[serde(rename = "type", default)]
    pub stream_type: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub web_stream_data: Option<WebStreamData>,
}

impl DataStream {
    /// The measurement ID, when this is a web stream that has one.
    #[must_use]
    pub fn measurement_id(&self) -> Option<&str> {
        self.web_stream_data
            .as_ref()
            .map(|w| w.measurement_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebStreamData {
    #[serde(default)]
    pub measurement_id: String,
    #[serde(default)]
    pub default_uri: String,
}

/// Body for `POST {property}/dataStreams` creating a web stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebDataStream {
    #[serde(rename = "type")]
    pub stream_type: &'static str,
    pub display_name: String,
    pub web_stream_data: NewWebStreamData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebStreamData {
    pub default_uri: String,
}

impl NewWebDataStream {
    #[must_use]
    pub fn new(display_name: String, default_uri: String) -> Self {
        Self {
            stream_type: "WEB_DATA_STREAM",
            display_name,
            web_stream_data: NewWebStreamData { default_uri },
        }
    }
}

// List envelopes. Empty collections come back as `{}`.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountsPage {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PropertiesPage {
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DataStreamsPage {
    #[serde(default)]
    pub data_streams: Vec<DataStream>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One page of a paginated list call.
pub(crate) trait ListPage {
    type Item;
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

impl ListPage for AccountsPage {
    type Item = Account;
    fn into_parts(self) -> (Vec<Account>, Option<String>) {
        (self.accounts, self.next_page_token)
    }
}

impl ListPage for PropertiesPage {
    type Item = Property;
    fn into_parts(self) -> (Vec<Property>, Option<String>) {
        (self.properties, self.next_page_token)
    }
}

impl ListPage for DataStreamsPage {
    type Item = DataStream;
    fn into_parts(self) -> (Vec<DataStream>, Option<String>) {
        (self.data_streams, self.next_page_token)
    }
}

// ---------------------------------------------------------------------------
// Search Console
// ---------------------------------------------------------------------------

/// A Search Console property as returned by `sites.list` / `sites.get`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: String,
    /// `siteOwner`, `siteFullUser`, `siteRestrictedUser` or `siteUnverifiedUser`.
    #[serde(default)]
    pub permission_level: Option<String>,
}

impl SiteEntry {
    #[must_use]
    pub fn permission_label(&self) -> &str {
        self.permission_level.as_deref().unwrap_or("unknown")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SitesList {
    #[serde(default)]
    pub site_entry: Vec<SiteEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_stream_without_web_data_has_no_measurement_id() {
        let stream: DataStream = serde_json::from_value(serde_json::json!({
            "name": "properties/1/dataStreams/2",
            "type": "ANDROID_APP_DATA_STREAM",
            "displayName": "Android"
        }))
        .unwrap();
        assert!(stream.measurement_id().is_none());
    }

    #[test]
    fn web_stream_exposes_measurement_id() {
        let stream: DataStream = serde_json::from_value(serde_json::json!({
            "name": "properties/1/dataStreams/3",
            "type": "WEB_DATA_STREAM",
            "webStreamData": {
                "measurementId": "G-ABC123",
                "defaultUri": "https://example.com"
            }
        }))
        .unwrap();
        assert_eq!(stream.measurement_id(), Some("G-ABC123"));
    }

    #[test]
    fn new_web_stream_serializes_camel_case() {
        let body = NewWebDataStream::new(
            "example.com Web Stream".to_string(),
            "https://example.com".to_string(),
        );
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "WEB_DATA_STREAM",
                "displayName": "example.com Web Stream",
                "webStreamData": { "defaultUri": "https://example.com" }
            })
        );
    }

    #[test]
    fn empty_list_envelope_parses() {
        let page: PropertiesPage = serde_json::from_str("{}").unwrap();
        assert!(page.properties.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
