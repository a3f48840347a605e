//! Interactive consent via a short-lived HTTP listener on the loopback interface.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use reqwest::Url;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use super::oauth::authorization_url;
use super::secrets::ClientSecret;
use crate::error::GoogleError;

/// How long the listener may keep finishing responses after the code arrives.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const SUCCESS_PAGE: &str = "<!doctype html><html><body><h1>Authorization complete</h1>\
<p>You can close this window and return to the terminal.</p></body></html>";
const FAILURE_PAGE: &str = "<!doctype html><html><body><h1>Authorization failed</h1>\
<p>Check the terminal for details.</p></body></html>";
const NOT_FOUND_PAGE: &str = "<!doctype html><html><body>Not found</body></html>";

/// Everything an [`Authorizer`] needs to send the user to the consent screen.
pub struct AuthorizationRequest<'a> {
    pub secret: &'a ClientSecret,
    pub scopes: &'a [&'a str],
    pub state: &'a str,
    pub code_challenge: &'a str,
}

impl AuthorizationRequest<'_> {
    /// Consent URL for the given redirect URI.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleError::InvalidUrl`] if the secret's `auth_uri` does not parse.
    pub fn url(&self, redirect_uri: &str) -> Result<Url, GoogleError> {
        authorization_url(
            self.secret,
            redirect_uri,
            self.scopes,
            self.state,
            self.code_challenge,
        )
    }
}

/// Authorization code plus the redirect URI it was issued for; the token
/// exchange must repeat the same redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationCode {
    pub code: String,
    pub redirect_uri: String,
}

/// Obtains an authorization code from the user.
#[allow(async_fn_in_trait)]
pub trait Authorizer {
    async fn authorize(
        &self,
        request: &AuthorizationRequest<'_>,
    ) -> Result<AuthorizationCode, GoogleError>;
}

/// Prints the consent URL, tries to open a browser, and waits for Google to
/// redirect back to `http://127.0.0.1:{port}/`.
///
/// Each connection is served on its own task, so a browser that opens
/// speculative connections or asks for `/favicon.ico` first cannot hold up
/// the redirect.
pub struct LoopbackAuthorizer {
    port: u16,
    open_browser: bool,
    timeout: Duration,
}

impl LoopbackAuthorizer {
    /// `port` 0 binds an ephemeral port.
    #[must_use]
    pub fn new(port: u16) -> Self {
        Self {
            port,
            open_browser: true,
            timeout: Duration::from_secs(300),
        }
    }

    #[must_use]
    pub fn open_browser(mut self, open: bool) -> Self {
        self.open_browser = open;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Authorizer for LoopbackAuthorizer {
    async fn authorize(
        &self,
        request: &AuthorizationRequest<'_>,
    ) -> Result<AuthorizationCode, GoogleError> {
        let bind_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.port));
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| GoogleError::Io {
            path: format!("oauth loopback listener {bind_addr}"),
            source: e,
        })?;
        let port = listener
            .local_addr()
            .map_err(|e| GoogleError::Io {
                path: "oauth loopback listener".to_string(),
                source: e,
            })?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}/");
        let url = request.url(&redirect_uri)?;

        let (tx, mut rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = callback_router(CallbackState {
            expected_state: Arc::from(request.state),
            tx,
        });
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        println!("Open this URL in a browser to authorize access:\n\n  {url}\n");
        if self.open_browser {
            if let Err(e) = open::that(url.as_str()) {
                tracing::warn!(error = %e, "could not open a browser; use the URL above");
            }
        }
        tracing::info!(port, "waiting for OAuth redirect");

        let outcome = tokio::time::timeout(self.timeout, rx.recv()).await;

        let _ = shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            tracing::debug!("loopback listener still had open connections; aborting");
            server.abort();
        }

        let code = match outcome {
            Ok(Some(result)) => result?,
            Ok(None) => {
                return Err(GoogleError::OAuth {
                    error: "listener_stopped".to_string(),
                    description: Some(
                        "the loopback listener stopped before a redirect arrived".to_string(),
                    ),
                })
            }
            Err(_) => {
                return Err(GoogleError::OAuth {
                    error: "timeout".to_string(),
                    description: Some(format!(
                        "no authorization redirect within {}s",
                        self.timeout.as_secs()
                    )),
                })
            }
        };

        Ok(AuthorizationCode { code, redirect_uri })
    }
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    tx: mpsc::Sender<Result<String, GoogleError>>,
}

fn callback_router(state: CallbackState) -> Router {
    Router::new()
        .route("/", get(callback))
        .fallback(|| async { not_found() })
        .with_state(state)
}

async fn callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let Some(result) = params.into_outcome(&state.expected_state) else {
        return not_found();
    };

    let reply = if result.is_ok() {
        (StatusCode::OK, Html(SUCCESS_PAGE))
    } else {
        (StatusCode::BAD_REQUEST, Html(FAILURE_PAGE))
    };
    // Capacity 1: the first redirect wins, repeats are answered but dropped.
    if state.tx.try_send(result).is_err() {
        tracing::debug!("ignoring repeated OAuth redirect");
    }
    reply
}

fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    /// `None` when the request carries neither `code` nor `error`, otherwise
    /// the code or the failure.
    fn into_outcome(self, expected_state: &str) -> Option<Result<String, GoogleError>> {
        if let Some(error) = self.error {
            return Some(Err(GoogleError::OAuth {
                error,
                description: self.error_description,
            }));
        }
        let code = self.code?;
        if self.state.as_deref() != Some(expected_state) {
            return Some(Err(GoogleError::OAuth {
                error: "state_mismatch".to_string(),
                description: Some("redirect state does not match the request".to_string()),
            }));
        }
        Some(Ok(code))
    }
}
