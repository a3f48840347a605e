mod provision;
mod report;

use clap::{Parser, Subcommand};
use sitesetup_core::{Domain, Mode};
use tracing_subscriber::EnvFilter;

use crate::provision::Stage;

#[derive(Debug, Parser)]
#[command(name = "sitesetup")]
#[command(about = "Provision GA4 properties and Search Console sites for configured domains")]
#[command(after_help = "Options go before the subcommand, e.g. `sitesetup --dry-run --domain a.com analytics`.")]
struct Cli {
    /// List and match only; report what would be created without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Restrict the run to these configured domains (repeatable)
    #[arg(long = "domain", value_name = "DOMAIN")]
    domains: Vec<Domain>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Commands {
    /// Analytics, Search Console, tracking snippets and measurement-ID file (default)
    Setup,
    /// Obtain or refresh OAuth credentials only
    Auth,
    /// Provision GA4 properties and web data streams only
    Analytics,
    /// Register sites with Search Console only
    SearchConsole,
}

impl Commands {
    fn stages(self) -> &'static [Stage] {
        match self {
            Commands::Setup => &[Stage::Analytics, Stage::SearchConsole],
            Commands::Auth => &[],
            Commands::Analytics => &[Stage::Analytics],
            Commands::SearchConsole => &[Stage::SearchConsole],
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = sitesetup_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let command = cli.command.unwrap_or(Commands::Setup);
    let mode = if cli.dry_run { Mode::DryRun } else { Mode::Apply };

    let sites = sitesetup_core::load_sites(&config.sites_path)?;
    let selected = sites.select(&cli.domains)?;

    println!("Google Analytics & Search Console setup");
    println!(
        "Domains: {}",
        selected
            .iter()
            .map(|s| s.domain.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if mode == Mode::DryRun {
        println!("dry-run: nothing will be created");
    }

    let credential = provision::obtain_credential(&config).await?;
    println!("Authenticated ({} credentials)", credential.source.label());
    if command == Commands::Auth {
        return Ok(());
    }

    let clients = provision::Clients::new(&credential.access_token, &config)?;
    let summary =
        provision::run_stages(&clients, &sites, &selected, command.stages(), mode).await;

    if command == Commands::Setup {
        report::finish_setup(&config.output_path, &selected, &summary.measurement_ids, mode)?;
    } else if !summary.measurement_ids.is_empty() {
        report::print_measurement_ids(&selected, &summary.measurement_ids);
    }

    if !selected.is_empty() && summary.succeeded.is_empty() {
        anyhow::bail!("all {} domains failed", selected.len());
    }
    Ok(())
}
