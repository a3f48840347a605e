use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the Google OAuth, Analytics Admin and Search Console clients.
#[derive(Debug, Error)]
pub enum GoogleError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A Google REST API answered with a non-2xx status.
    #[error("Google API error {status} ({code}): {message}")]
    Api {
        status: u16,
        /// Canonical status string from the error envelope, e.g. `ALREADY_EXISTS`.
        /// Empty when the API did not send one.
        code: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The OAuth token endpoint or the consent redirect reported an error.
    #[error("OAuth error: {error}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    OAuth {
        error: String,
        description: Option<String>,
    },

    /// No usable token exists and interactive authorization cannot run.
    #[error("authorization required: {0}")]
    AuthRequired(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure classes the provisioning flow reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    AlreadyExists,
    PermissionDenied,
    NotFound,
    Unauthenticated,
    Other,
}

impl ApiErrorKind {
    /// Classify from the envelope status string, falling back to the HTTP status.
    #[must_use]
    pub fn classify(http_status: u16, code: &str) -> Self {
        match code {
            "ALREADY_EXISTS" => return Self::AlreadyExists,
            "PERMISSION_DENIED" => return Self::PermissionDenied,
            "NOT_FOUND" => return Self::NotFound,
            "UNAUTHENTICATED" => return Self::Unauthenticated,
            _ => {}
        }
        match http_status {
            409 => Self::AlreadyExists,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            401 => Self::Unauthenticated,
            _ => Self::Other,
        }
    }
}

impl GoogleError {
    #[must_use]
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            GoogleError::Api { status, code, .. } => ApiErrorKind::classify(*status, code),
            GoogleError::Http(e) => e
                .status()
                .map_or(ApiErrorKind::Other, |s| ApiErrorKind::classify(s.as_u16(), "")),
            _ => ApiErrorKind::Other,
        }
    }

    /// `true` for `invalid_grant`, which means the refresh token was revoked
    /// or expired and the user has to authorize again.
    #[must_use]
    pub fn is_invalid_grant(&self) -> bool {
        matches!(self, GoogleError::OAuth { error, .. } if error == "invalid_grant")
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        GoogleError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Build a [`GoogleError::Api`] from a non-2xx REST response body.
///
/// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`;
/// bodies that do not follow that shape keep their raw text as the message.
pub(crate) fn api_error(status: u16, body: &str) -> GoogleError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => GoogleError::Api {
            status,
            code: envelope.error.status,
            message: envelope.error.message,
        },
        Err(_) => GoogleError::Api {
            status,
            code: String::new(),
            message: body.trim().to_string(),
        },
    }
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Build a [`GoogleError::OAuth`] from a failed token-endpoint response.
pub(crate) fn oauth_error(status: u16, body: &str) -> GoogleError {
    match serde_json::from_str::<OAuthErrorBody>(body) {
        Ok(parsed) => GoogleError::OAuth {
            error: parsed.error,
            description: parsed.error_description,
        },
        Err(_) => GoogleError::OAuth {
            error: format!("http_{status}"),
            description: Some(body.trim().to_string()).filter(|b| !b.is_empty()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_status_wins_over_http_status() {
        let err = api_error(
            400,
            r#"{"error":{"code":400,"message":"dup","status":"ALREADY_EXISTS"}}"#,
        );
        assert_eq!(err.kind(), ApiErrorKind::AlreadyExists);
    }

    #[test]
    fn http_status_fallback_without_envelope_status() {
        let err = api_error(
            403,
            r#"{"error":{"code":403,"message":"User does not have sufficient permission"}}"#,
        );
        assert_eq!(err.kind(), ApiErrorKind::PermissionDenied);
        assert!(err.to_string().contains("sufficient permission"));
    }

    #[test]
    fn non_json_body_keeps_raw_text() {
        let err = api_error(502, "  Bad Gateway ");
        assert!(matches!(err, GoogleError::Api { ref message, .. } if message == "Bad Gateway"));
        assert_eq!(err.kind(), ApiErrorKind::Other);
    }

    #[test]
    fn classify_maps_known_statuses() {
        assert_eq!(ApiErrorKind::classify(409, ""), ApiErrorKind::AlreadyExists);
        assert_eq!(ApiErrorKind::classify(404, ""), ApiErrorKind::NotFound);
        assert_eq!(ApiErrorKind::classify(401, ""), ApiErrorKind::Unauthenticated);
        assert_eq!(ApiErrorKind::classify(500, "INTERNAL"), ApiErrorKind::Other);
    }

    #[test]
    fn oauth_error_parses_invalid_grant() {
        let err = oauth_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#,
        );
        assert!(err.is_invalid_grant());
        assert_eq!(
            err.to_string(),
            "OAuth error: invalid_grant (Token has been expired or revoked.)"
        );
    }

    #[test]
    fn oauth_error_without_json_body() {
        let err = oauth_error(500, "");
        assert!(matches!(err, GoogleError::OAuth { ref error, description: None } if error == "http_500"));
        assert!(!err.is_invalid_grant());
    }

    #[test]
    fn non_api_errors_classify_as_other() {
        let err = GoogleError::AuthRequired("no secret".to_string());
        assert_eq!(err.kind(), ApiErrorKind::Other);
    }
}
