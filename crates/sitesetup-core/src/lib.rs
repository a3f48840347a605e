pub mod app_config;
pub mod config;
pub mod error;
pub mod matching;
pub mod output;
pub mod reconcile;
pub mod sites;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use output::{tracking_snippet, tracking_snippets, write_measurement_ids, MeasurementIds};
pub use reconcile::{reconcile, Mode, Outcome, Reconcile};
pub use sites::{load_sites, parse_sites, stream_display_name, Domain, SiteConfig, SitesFile};
