use sitesetup_core::matching::site_url_matches;
use sitesetup_core::{reconcile, Domain, Mode, Outcome, Reconcile, SiteConfig};
use sitesetup_google::{ApiErrorKind, GoogleError, SearchConsoleClient, SiteEntry};

use super::StageReport;

/// The URL-prefix Search Console property for one domain.
struct SiteTarget<'a> {
    client: &'a SearchConsoleClient,
    domain: &'a Domain,
}

impl Reconcile for SiteTarget<'_> {
    type Resource = SiteEntry;
    type Error = GoogleError;

    fn kind(&self) -> &'static str {
        "search console site"
    }

    async fn list(&self) -> Result<Vec<SiteEntry>, GoogleError> {
        self.client.list_sites().await
    }

    fn matches(&self, site: &SiteEntry) -> bool {
        site_url_matches(&site.site_url, self.domain)
    }

    /// Register the site, then look up the permission level it ended up with.
    async fn create(&self) -> Result<SiteEntry, GoogleError> {
        let site_url = self.domain.site_url();
        match self.client.add_site(&site_url).await {
            Ok(()) => {}
            Err(e) if e.kind() == ApiErrorKind::AlreadyExists => {
                tracing::info!(%site_url, "site already registered");
            }
            Err(e) => return Err(e),
        }

        match self.client.get_site(&site_url).await {
            Ok(entry) => Ok(entry),
            Err(e) => {
                tracing::debug!(%site_url, error = %e, "permission lookup failed");
                Ok(SiteEntry {
                    site_url,
                    permission_level: None,
                })
            }
        }
    }
}

/// Ensure every selected site is registered with Search Console.
pub(super) async fn run(
    client: &SearchConsoleClient,
    selected: &[&SiteConfig],
    mode: Mode,
) -> StageReport {
    println!("\nSetting up Google Search Console...");

    let mut report = StageReport::default();
    for site in selected {
        let site_url = site.domain.site_url();
        let target = SiteTarget {
            client,
            domain: &site.domain,
        };
        match reconcile(&target, mode).await {
            Ok(Outcome::Planned) => {
                println!("  {site_url}: would add");
                report.succeeded.push(site.domain.clone());
            }
            Ok(outcome) => {
                let permission = outcome.resource().map_or("unknown", SiteEntry::permission_label);
                let label = match outcome {
                    Outcome::Created(_) => "added",
                    _ => "already registered",
                };
                println!("  {site_url}: {label} (permission: {permission})");
                report.succeeded.push(site.domain.clone());
            }
            Err(e) if e.kind() == ApiErrorKind::PermissionDenied => {
                tracing::warn!(domain = %site.domain, error = %e, "search console access denied");
                println!("  {site_url}: access denied ({e})");
                report.failed.push(site.domain.clone());
            }
            Err(e) => {
                tracing::error!(domain = %site.domain, error = %e, "search console registration failed");
                println!("  {site_url}: error: {e}");
                report.failed.push(site.domain.clone());
            }
        }
    }

    if mode == Mode::Apply && !report.succeeded.is_empty() {
        println!("\nVerification options:");
        println!("   - HTML file: upload the verification file to the site root");
        println!("   - HTML tag: add the meta tag to <head>");
        println!("   - DNS: add a TXT record to the domain");
    }
    report
}
