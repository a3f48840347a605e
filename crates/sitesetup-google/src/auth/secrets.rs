//! OAuth client secret files.

use std::path::Path;

use serde::Deserialize;

use crate::error::GoogleError;

pub(crate) const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub(crate) const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client identity for an installed application.
#[derive(Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

pub(crate) fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

/// Accepted file layouts: the JSON downloaded from the Cloud console
/// (`installed` or `web` wrapper) or a flat object carrying `client_id` and
/// `client_secret` next to other fields.
#[derive(Deserialize)]
#[serde(untagged)]
enum SecretFile {
    Installed { installed: ClientSecret },
    Web { web: ClientSecret },
    Flat(ClientSecret),
}

/// Read and parse a client secret file.
///
/// # Errors
///
/// - [`GoogleError::Io`] if the file cannot be read.
/// - [`GoogleError::Deserialize`] if it matches none of the accepted layouts.
pub fn load_client_secret(path: &Path) -> Result<ClientSecret, GoogleError> {
    let content = std::fs::read_to_string(path).map_err(|e| GoogleError::io(path, e))?;
    parse_client_secret(&content, &path.display().to_string())
}

fn parse_client_secret(content: &str, context: &str) -> Result<ClientSecret, GoogleError> {
    let file: SecretFile =
        serde_json::from_str(content).map_err(|e| GoogleError::Deserialize {
            context: context.to_string(),
            source: e,
        })?;
    Ok(match file {
        SecretFile::Installed { installed } => installed,
        SecretFile::Web { web } => web,
        SecretFile::Flat(secret) => secret,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_installed_layout() {
        let json = r#"{"installed":{"client_id":"id.apps.googleusercontent.com","client_secret":"s3cret","auth_uri":"https://accounts.google.com/o/oauth2/auth","token_uri":"https://oauth2.googleapis.com/token","redirect_uris":["http://localhost"]}}"#;
        let secret = parse_client_secret(json, "test").unwrap();
        assert_eq!(secret.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secret.client_secret, "s3cret");
    }

    #[test]
    fn parses_web_layout() {
        let json = r#"{"web":{"client_id":"web-id","client_secret":"web-secret"}}"#;
        let secret = parse_client_secret(json, "test").unwrap();
        assert_eq!(secret.client_id, "web-id");
        assert_eq!(secret.token_uri, GOOGLE_TOKEN_URI);
    }

    #[test]
    fn parses_flat_layout_with_extra_fields() {
        let json = r#"{"developer_token":"dev","client_id":"ads-id","client_secret":"ads-secret","refresh_token":"r","login_customer_id":"123"}"#;
        let secret = parse_client_secret(json, "test").unwrap();
        assert_eq!(secret.client_id, "ads-id");
        assert_eq!(secret.auth_uri, GOOGLE_AUTH_URI);
    }

    #[test]
    fn rejects_file_without_client_id() {
        let err = parse_client_secret(r#"{"installed":{}}"#, "test").unwrap_err();
        assert!(matches!(err, GoogleError::Deserialize { .. }), "got: {err:?}");
    }

    #[test]
    fn debug_redacts_secret() {
        let secret = parse_client_secret(r#"{"client_id":"id","client_secret":"hunter2"}"#, "t")
            .unwrap();
        let debug = format!("{secret:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }
}
