//! Sites configuration: which domains to provision and the defaults used
//! when a remote resource has to be created.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A validated, lowercase host name such as `example.com`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Parse and normalise a domain.
    ///
    /// Surrounding whitespace and a single trailing dot are stripped and the
    /// result is lowercased. Schemes, paths, ports and whitespace inside the
    /// name are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDomain`] if the value is not a bare host name.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidDomain {
            domain: raw.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(invalid("must be non-empty"));
        }
        if trimmed.contains("://") {
            return Err(invalid("must not include a scheme"));
        }
        if trimmed.contains('/') {
            return Err(invalid("must not include a path"));
        }
        if trimmed.contains(':') {
            return Err(invalid("must not include a port"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        if !trimmed.contains('.') {
            return Err(invalid("must contain at least one dot"));
        }
        if trimmed.split('.').any(str::is_empty) {
            return Err(invalid("must not contain empty labels"));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain with every `.` removed, used for display-name matching.
    #[must_use]
    pub fn compact(&self) -> String {
        self.0.replace('.', "")
    }

    /// Search Console URL-prefix property for the site, e.g. `https://example.com/`.
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("https://{}/", self.0)
    }

    /// Default URI for an analytics web data stream, e.g. `https://example.com`.
    #[must_use]
    pub fn default_uri(&self) -> String {
        format!("https://{}", self.0)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Domain {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl std::str::FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Domain> for String {
    fn from(value: Domain) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub domain: Domain,
    /// Overrides the generated property display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitesFile {
    /// Organisation name used in generated property display names.
    pub organization: String,
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
    /// Analytics account to provision under, by resource name
    /// (`accounts/123`) or display name. The first account is used when unset.
    #[serde(default)]
    pub analytics_account: Option<String>,
    pub sites: Vec<SiteConfig>,
}

fn default_time_zone() -> String {
    "Europe/London".to_string()
}

fn default_currency_code() -> String {
    "GBP".to_string()
}

impl SitesFile {
    /// Display name for a newly created analytics property.
    #[must_use]
    pub fn property_display_name(&self, site: &SiteConfig) -> String {
        site.display_name
            .clone()
            .unwrap_or_else(|| format!("{} ({})", self.organization, site.domain))
    }

    /// Restrict the sites to the given domains, preserving file order.
    ///
    /// An empty filter keeps every site.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a filter entry does not name a
    /// configured site.
    pub fn select(&self, filter: &[Domain]) -> Result<Vec<&SiteConfig>, ConfigError> {
        if filter.is_empty() {
            return Ok(self.sites.iter().collect());
        }
        for wanted in filter {
            if !self.sites.iter().any(|s| &s.domain == wanted) {
                return Err(ConfigError::Validation(format!(
                    "domain '{wanted}' is not configured in the sites file"
                )));
            }
        }
        Ok(self
            .sites
            .iter()
            .filter(|s| filter.contains(&s.domain))
            .collect())
    }
}

/// Data stream display name for a domain.
#[must_use]
pub fn stream_display_name(domain: &Domain) -> String {
    format!("{domain} Web Stream")
}

/// Load and validate the sites configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_sites(&content)
}

/// Parse and validate sites configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML cannot be parsed or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile = serde_yaml::from_str(content)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    if sites_file.organization.trim().is_empty() {
        return Err(ConfigError::Validation(
            "organization must be non-empty".to_string(),
        ));
    }

    if sites_file.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for site in &sites_file.sites {
        if !seen.insert(site.domain.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate domain: '{}'",
                site.domain
            )));
        }
        if site
            .display_name
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty display_name",
                site.domain
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
