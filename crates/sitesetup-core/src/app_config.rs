use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub client_secret_path: PathBuf,
    pub token_path: PathBuf,
    pub sites_path: PathBuf,
    pub output_path: PathBuf,
    pub log_level: String,
    pub http_timeout_secs: u64,
    /// Loopback port for the OAuth redirect. `0` lets the OS pick one.
    pub oauth_port: u16,
    /// How long to wait for the browser to hit the OAuth redirect.
    pub oauth_timeout_secs: u64,
    pub user_agent: String,
}
