mod cli;
mod commands;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use feeplus_admin::{DynAdminClient, HttpAdminClient};
use feeplus_cli::config::{AppConfig, loader};
use feeplus_cli::observability;
use feeplus_core::{HealthProbe, ResourceSaga, TenantContext};

use cli::{Cli, Commands, ConfigCommands, FeeCommands, RulesCommands};
use output::print_error;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<bool> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    let cfg = loader::load_config(cli.config.as_deref()).map_err(|e| anyhow!(e))?;
    observability::init_tracing_with_level(&cfg.logging.level);

    match &cli.command {
        Commands::Rules(args) => match &args.command {
            RulesCommands::Preview(preview) => commands::rules::preview(preview, format),
        },
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => commands::config::show(&cfg, format),
        },
        Commands::Health => {
            let tenant = connect(&cfg).await?;
            let probe = HealthProbe::new(&cfg.reconcile);
            commands::health::health(&probe, &tenant, format).await
        }
        Commands::Repair => {
            let tenant = connect(&cfg).await?;
            let probe = HealthProbe::new(&cfg.reconcile);
            commands::health::repair(&probe, &tenant, format).await
        }
        Commands::Ensure => {
            let tenant = connect(&cfg).await?;
            let probe = HealthProbe::new(&cfg.reconcile);
            commands::health::ensure(&probe, &tenant, format).await
        }
        Commands::Fee(args) => {
            let tenant = connect(&cfg).await?;
            let saga = ResourceSaga::new(&cfg.reconcile);
            match &args.command {
                FeeCommands::Status => commands::fee::status(&saga, &tenant, format).await,
                FeeCommands::Create(create) => {
                    commands::fee::create(&saga, &tenant, &cfg.fee, create, format).await
                }
                FeeCommands::Update(update) => {
                    commands::fee::update(&saga, &tenant, update, format).await
                }
                FeeCommands::Clear => commands::fee::clear(&saga, &tenant, format).await,
            }
        }
    }
}

async fn connect(cfg: &AppConfig) -> Result<TenantContext> {
    cfg.require_credentials().map_err(|e| anyhow!(e))?;
    let client = HttpAdminClient::new(cfg.admin.clone()).context("Invalid admin settings")?;
    let client: DynAdminClient = Arc::new(client);
    let tenant = TenantContext::discover(client)
        .await
        .with_context(|| format!("Failed to identify shop {}", cfg.admin.shop_domain))?;
    tracing::debug!(shop = %tenant.domain(), tenant = %tenant.tenant_id(), "Connected");
    Ok(tenant)
}
