use anyhow::Context as _;
use sitesetup_core::matching::{property_matches, stream_uri_matches};
use sitesetup_core::{
    reconcile, stream_display_name, Domain, Mode, Outcome, Reconcile, SiteConfig, SitesFile,
};
use sitesetup_google::{
    Account, AnalyticsAdminClient, DataStream, GoogleError, NewProperty, NewWebDataStream,
    Property,
};

use super::StageReport;

/// The GA4 property for one domain under one account.
struct PropertyTarget<'a> {
    client: &'a AnalyticsAdminClient,
    account: &'a str,
    domain: &'a Domain,
    new_property: NewProperty,
}

impl Reconcile for PropertyTarget<'_> {
    type Resource = Property;
    type Error = GoogleError;

    fn kind(&self) -> &'static str {
        "property"
    }

    async fn list(&self) -> Result<Vec<Property>, GoogleError> {
        self.client.list_properties(self.account).await
    }

    fn matches(&self, property: &Property) -> bool {
        property_matches(&property.display_name, self.domain)
    }

    async fn create(&self) -> Result<Property, GoogleError> {
        self.client.create_property(&self.new_property).await
    }
}

/// The web data stream for one domain under its property.
struct StreamTarget<'a> {
    client: &'a AnalyticsAdminClient,
    property: &'a str,
    domain: &'a Domain,
}

impl Reconcile for StreamTarget<'_> {
    type Resource = DataStream;
    type Error = GoogleError;

    fn kind(&self) -> &'static str {
        "data stream"
    }

    async fn list(&self) -> Result<Vec<DataStream>, GoogleError> {
        self.client.list_data_streams(self.property).await
    }

    fn matches(&self, stream: &DataStream) -> bool {
        stream
            .web_stream_data
            .as_ref()
            .is_some_and(|web| stream_uri_matches(&web.default_uri, self.domain))
    }

    async fn create(&self) -> Result<DataStream, GoogleError> {
        let body = NewWebDataStream::new(stream_display_name(self.domain), self.domain.default_uri());
        self.client.create_web_data_stream(self.property, &body).await
    }
}

/// Pick the account to provision under: the configured one (by resource name
/// or display name) or else the first listed.
pub(super) fn select_account<'a>(
    accounts: &'a [Account],
    wanted: Option<&str>,
) -> anyhow::Result<&'a Account> {
    let Some(first) = accounts.first() else {
        anyhow::bail!(
            "no Google Analytics accounts found; create one at https://analytics.google.com first"
        );
    };
    let Some(wanted) = wanted else {
        return Ok(first);
    };
    accounts
        .iter()
        .find(|a| a.name == wanted || a.display_name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let available: Vec<String> = accounts
                .iter()
                .map(|a| format!("{} ({})", a.display_name, a.name))
                .collect();
            anyhow::anyhow!(
                "analytics account '{wanted}' not found; available: {}",
                available.join(", ")
            )
        })
}

/// Ensure a property and web stream exist for every selected site.
pub(super) async fn run(
    client: &AnalyticsAdminClient,
    sites: &SitesFile,
    selected: &[&SiteConfig],
    mode: Mode,
) -> StageReport {
    println!("\nSetting up Google Analytics 4...");

    let accounts = match client.list_accounts().await {
        Ok(accounts) => accounts,
        Err(e) => {
            tracing::error!(error = %e, "failed to list analytics accounts");
            println!("Analytics setup error: {e}");
            return StageReport::all_failed(selected);
        }
    };
    let account = match select_account(&accounts, sites.analytics_account.as_deref()) {
        Ok(account) => account,
        Err(e) => {
            tracing::error!(error = %e, "no usable analytics account");
            println!("Analytics setup error: {e}");
            return StageReport::all_failed(selected);
        }
    };
    println!("Using account: {} ({})", account.display_name, account.name);

    let mut report = StageReport::default();
    for site in selected {
        println!("\n  {}", site.domain);
        match provision_site(client, &account.name, sites, site, mode).await {
            Ok(measurement_id) => {
                if let Some(id) = measurement_id {
                    report.measurement_ids.insert(site.domain.clone(), id);
                }
                report.succeeded.push(site.domain.clone());
            }
            Err(e) => {
                tracing::error!(domain = %site.domain, error = %format!("{e:#}"), "analytics provisioning failed");
                println!("  error: {e:#}");
                report.failed.push(site.domain.clone());
            }
        }
    }
    report
}

/// Reconcile the property, then its stream. Returns the measurement ID, or
/// `None` when a dry run stops at a resource that does not exist yet.
async fn provision_site(
    client: &AnalyticsAdminClient,
    account: &str,
    sites: &SitesFile,
    site: &SiteConfig,
    mode: Mode,
) -> anyhow::Result<Option<String>> {
    let domain = &site.domain;
    let property_target = PropertyTarget {
        client,
        account,
        domain,
        new_property: NewProperty {
            parent: account.to_string(),
            display_name: sites.property_display_name(site),
            time_zone: sites.time_zone.clone(),
            currency_code: sites.currency_code.clone(),
        },
    };

    let property = reconcile(&property_target, mode)
        .await
        .with_context(|| format!("reconciling property for {domain}"))?;
    let Some(property) = announce(property, "property", |p| {
        format!("{} ({})", p.display_name, p.name)
    }) else {
        println!("  data stream: would create {}", stream_display_name(domain));
        return Ok(None);
    };

    let stream_target = StreamTarget {
        client,
        property: &property.name,
        domain,
    };
    let stream = reconcile(&stream_target, mode)
        .await
        .with_context(|| format!("reconciling data stream for {domain}"))?;
    let Some(stream) = announce(stream, "data stream", |s| {
        s.measurement_id().unwrap_or("no measurement ID").to_string()
    }) else {
        return Ok(None);
    };

    let id = stream
        .measurement_id()
        .with_context(|| format!("data stream {} has no measurement ID", stream.name))?;
    tracing::info!(%domain, measurement_id = id, "analytics ready");
    Ok(Some(id.to_string()))
}

fn announce<T>(outcome: Outcome<T>, kind: &str, describe: impl Fn(&T) -> String) -> Option<T> {
    match outcome.resource() {
        Some(resource) => println!("  {kind} ({}): {}", outcome.label(), describe(resource)),
        None => println!("  {kind}: {}", outcome.label()),
    }
    outcome.into_resource()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, display_name: &str) -> Account {
        Account {
            name: name.to_string(),
            display_name: display_name.to_string(),
        }
    }

    #[test]
    fn first_account_is_default() {
        let accounts = [account("accounts/1", "One"), account("accounts/2", "Two")];
        assert_eq!(select_account(&accounts, None).unwrap().name, "accounts/1");
    }

    #[test]
    fn configured_account_matches_name_or_display_name() {
        let accounts = [account("accounts/1", "One"), account("accounts/2", "Two")];
        assert_eq!(
            select_account(&accounts, Some("accounts/2")).unwrap().name,
            "accounts/2"
        );
        assert_eq!(select_account(&accounts, Some("two")).unwrap().name, "accounts/2");
    }

    #[test]
    fn unknown_configured_account_is_error() {
        let accounts = [account("accounts/1", "One")];
        let err = select_account(&accounts, Some("Missing")).unwrap_err();
        assert!(err.to_string().contains("One (accounts/1)"));
    }

    #[test]
    fn no_accounts_is_error() {
        let err = select_account(&[], None).unwrap_err();
        assert!(err.to_string().contains("analytics.google.com"));
    }
}
