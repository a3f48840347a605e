use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str = "sitesetup/0.1 (site-provisioning)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. Path defaults are relative to the working
/// directory; the client secret and token paths default to files inside
/// the auth directory.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u16>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let auth_dir = PathBuf::from(or_default("SITESETUP_AUTH_DIR", "./auth"));
    let client_secret_path = lookup("SITESETUP_CLIENT_SECRET_PATH")
        .map_or_else(|_| auth_dir.join("client_secret.json"), PathBuf::from);
    let token_path = lookup("SITESETUP_TOKEN_PATH")
        .map_or_else(|_| auth_dir.join("google-token.json"), PathBuf::from);
    let sites_path = PathBuf::from(or_default("SITESETUP_SITES_PATH", "./config/sites.yaml"));
    let output_path = PathBuf::from(or_default(
        "SITESETUP_OUTPUT_PATH",
        "./ga_measurement_ids.json",
    ));
    let log_level = or_default("SITESETUP_LOG_LEVEL", "info");

    let http_timeout_secs = parse_u64("SITESETUP_HTTP_TIMEOUT_SECS", "30")?;
    if http_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITESETUP_HTTP_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let oauth_port = parse_u16("SITESETUP_OAUTH_PORT", "8080")?;
    let oauth_timeout_secs = parse_u64("SITESETUP_OAUTH_TIMEOUT_SECS", "300")?;
    if oauth_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SITESETUP_OAUTH_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("SITESETUP_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        client_secret_path,
        token_path,
        sites_path,
        output_path,
        log_level,
        http_timeout_secs,
        oauth_port,
        oauth_timeout_secs,
        user_agent,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
