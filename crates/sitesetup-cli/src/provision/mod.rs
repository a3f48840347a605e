//! Provisioning pipeline: wires the reconciler to the Google clients.
//!
//! Domains are processed one at a time and in configured order. A failure on
//! one domain is logged and reported, then the next domain proceeds.

mod analytics;
mod search_console;

use std::collections::BTreeSet;
use std::time::Duration;

use sitesetup_core::{AppConfig, Domain, MeasurementIds, Mode, SiteConfig, SitesFile};
use sitesetup_google::{
    AnalyticsAdminClient, Credential, CredentialManager, LoopbackAuthorizer, OAuthClient,
    SearchConsoleClient,
};

/// One provisioning stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Analytics,
    SearchConsole,
}

pub(crate) struct Clients {
    pub analytics: AnalyticsAdminClient,
    pub search_console: SearchConsoleClient,
}

impl Clients {
    pub(crate) fn new(access_token: &str, config: &AppConfig) -> anyhow::Result<Self> {
        Ok(Self {
            analytics: AnalyticsAdminClient::new(
                access_token,
                config.http_timeout_secs,
                &config.user_agent,
            )
            .map_err(|e| anyhow::anyhow!("failed to build Analytics Admin client: {e}"))?,
            search_console: SearchConsoleClient::new(
                access_token,
                config.http_timeout_secs,
                &config.user_agent,
            )
            .map_err(|e| anyhow::anyhow!("failed to build Search Console client: {e}"))?,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_urls(analytics_base: &str, search_console_base: &str) -> Self {
        Self {
            analytics: AnalyticsAdminClient::with_base_url("test-token", 30, "sitesetup-test", analytics_base)
                .unwrap(),
            search_console: SearchConsoleClient::with_base_url(
                "test-token",
                30,
                "sitesetup-test",
                search_console_base,
            )
            .unwrap(),
        }
    }
}

/// Per-stage result: which domains completed, which failed, and any
/// measurement IDs collected.
#[derive(Debug, Default)]
pub(crate) struct StageReport {
    pub succeeded: Vec<Domain>,
    pub failed: Vec<Domain>,
    pub measurement_ids: MeasurementIds,
}

impl StageReport {
    fn all_failed(selected: &[&SiteConfig]) -> Self {
        Self {
            failed: selected.iter().map(|s| s.domain.clone()).collect(),
            ..Self::default()
        }
    }
}

/// Combined result of every stage in a run.
#[derive(Debug, Default)]
pub(crate) struct RunSummary {
    /// Domains that completed at least one stage.
    pub succeeded: BTreeSet<Domain>,
    pub measurement_ids: MeasurementIds,
}

/// Obtain an access token, running the browser flow when needed.
///
/// # Errors
///
/// Returns an error if no usable token can be produced.
pub(crate) async fn obtain_credential(config: &AppConfig) -> anyhow::Result<Credential> {
    let oauth = OAuthClient::new(config.http_timeout_secs, &config.user_agent)?;
    let manager = CredentialManager::new(
        &config.client_secret_path,
        &config.token_path,
        oauth,
        LoopbackAuthorizer::new(config.oauth_port)
            .timeout(Duration::from_secs(config.oauth_timeout_secs)),
    );
    let credential = manager.obtain().await?;
    tracing::info!(source = credential.source.label(), "credentials ready");
    Ok(credential)
}

/// Run the given stages over the selected sites.
pub(crate) async fn run_stages(
    clients: &Clients,
    sites: &SitesFile,
    selected: &[&SiteConfig],
    stages: &[Stage],
    mode: Mode,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for stage in stages {
        let report = match stage {
            Stage::Analytics => analytics::run(&clients.analytics, sites, selected, mode).await,
            Stage::SearchConsole => {
                search_console::run(&clients.search_console, selected, mode).await
            }
        };

        if !report.failed.is_empty() {
            tracing::warn!(
                ?stage,
                failed = report.failed.len(),
                total = selected.len(),
                "some domains failed"
            );
        }
        summary.succeeded.extend(report.succeeded);
        summary.measurement_ids.extend(report.measurement_ids);
    }

    summary
}

#[cfg(test)]
#[path = "provision_test.rs"]
mod tests;
