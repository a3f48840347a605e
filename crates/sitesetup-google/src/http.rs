//! Authenticated JSON transport shared by the Analytics Admin and Search
//! Console clients.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{api_error, GoogleError};

/// Upper bound on list pages followed for a single call. Guards against a
/// server that keeps returning the same `nextPageToken`.
pub(crate) const MAX_PAGES: usize = 100;

pub(crate) struct ApiTransport {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl ApiTransport {
    pub(crate) fn new(
        access_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GoogleError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends instead of
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GoogleError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            access_token: access_token.to_owned(),
        })
    }

    /// Resolve `path` (no leading slash) against the base URL and append query pairs.
    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, GoogleError> {
        let mut url = self.base_url.join(path).map_err(|e| GoogleError::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            reason: e.to_string(),
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GoogleError> {
        let body = self.send(self.request(Method::GET, url.clone())).await?;
        decode(&body, url.as_str())
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        payload: &B,
    ) -> Result<T, GoogleError> {
        let body = self
            .send(self.request(Method::POST, url.clone()).json(payload))
            .await?;
        decode(&body, url.as_str())
    }

    /// Send a bodyless `PUT` and discard the (usually empty) response.
    pub(crate) async fn put_empty(&self, url: Url) -> Result<(), GoogleError> {
        self.send(
            self.request(Method::PUT, url)
                .header(reqwest::header::CONTENT_LENGTH, "0"),
        )
        .await?;
        Ok(())
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "google api request");
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Send the request and return the body text, mapping non-2xx statuses to
    /// [`GoogleError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<String, GoogleError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, GoogleError> {
    // List endpoints answer `{}` for an empty collection; some answer nothing.
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| GoogleError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
