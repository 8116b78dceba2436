use anyhow::Result;
use feeplus_cli::config::AppConfig;

use crate::cli::OutputFormat;
use crate::output::{print_fields, print_json};

pub fn show(cfg: &AppConfig, format: OutputFormat) -> Result<bool> {
    let cfg = cfg.redacted();
    match format {
        OutputFormat::Json => print_json(&cfg)?,
        OutputFormat::Table => print_fields(vec![
            ("admin.shop_domain", cfg.admin.shop_domain.clone()),
            ("admin.access_token", cfg.admin.access_token.clone()),
            ("admin.api_version", cfg.admin.api_version.clone()),
            (
                "admin.endpoint",
                cfg.admin.endpoint.clone().unwrap_or_else(|| "-".into()),
            ),
            ("admin.timeout_ms", cfg.admin.timeout_ms.to_string()),
            ("logging.level", cfg.logging.level.clone()),
            ("reconcile.handle", cfg.reconcile.handle.clone()),
            (
                "reconcile.block_on_failure",
                cfg.reconcile.block_on_failure.to_string(),
            ),
            (
                "reconcile.metafield_namespace",
                cfg.reconcile.metafield_namespace.clone(),
            ),
            (
                "reconcile.duplicate_tokens",
                cfg.reconcile.duplicate_tokens.join(", "),
            ),
            (
                "reconcile.storefront_channel",
                cfg.reconcile.storefront_channel.clone(),
            ),
            ("reconcile.option_name", cfg.reconcile.option_name.clone()),
            ("reconcile.page_size", cfg.reconcile.page_size.to_string()),
            ("fee.title", cfg.fee.title.clone()),
            ("fee.label", cfg.fee.label.clone()),
            ("fee.price", cfg.fee.price.clone()),
        ]),
    }
    Ok(true)
}
