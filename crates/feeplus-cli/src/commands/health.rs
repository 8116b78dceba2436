use anyhow::{Context, Result};
use colored::Colorize;
use feeplus_core::{
    EnsureOutcome, HealthProbe, HealthReport, HealthState, RepairState, TenantContext,
};

use crate::cli::OutputFormat;
use crate::output::{or_dash, print_error, print_fields, print_json, print_success, print_warning};

pub async fn health(probe: &HealthProbe, tenant: &TenantContext, format: OutputFormat) -> Result<bool> {
    let report = probe
        .check(tenant)
        .await
        .with_context(|| format!("Failed to list cart transforms for {}", tenant.domain()))?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }
    Ok(report.state() == HealthState::Healthy)
}

pub async fn repair(probe: &HealthProbe, tenant: &TenantContext, format: OutputFormat) -> Result<bool> {
    let report = probe.repair(tenant).await;
    let healthy = report.state == RepairState::Healthy;

    if matches!(format, OutputFormat::Json) {
        print_json(&report)?;
        return Ok(healthy);
    }

    if let Some(health) = &report.health {
        print_report(health);
    }
    match report.state {
        RepairState::Healthy => print_success(&format!("Cart transform {}", report.ensure)),
        RepairState::StillMissing => print_warning(&format!(
            "Cart transform still missing after repair ({})",
            report.ensure
        )),
        RepairState::RepairFailed => print_error(&format!(
            "Repair failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        )),
    }
    Ok(healthy)
}

pub async fn ensure(probe: &HealthProbe, tenant: &TenantContext, format: OutputFormat) -> Result<bool> {
    let outcome = probe.engine().ensure(tenant).await;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Table => match &outcome {
            EnsureOutcome::Created { id } => print_success(&format!("Created {}", id.cyan())),
            EnsureOutcome::AlreadyPresent => print_success("Already registered"),
            EnsureOutcome::Failed { reason } => print_error(reason),
        },
    }
    Ok(outcome.is_success())
}

fn print_report(report: &HealthReport) {
    let state = match report.state() {
        HealthState::Healthy => "healthy".green().to_string(),
        HealthState::Missing => "missing".red().to_string(),
    };
    let pinned = match report.pinned {
        Some(true) => "yes".to_string(),
        Some(false) => "no (saved id not listed)".to_string(),
        None => "-".to_string(),
    };
    print_fields(vec![
        ("State", state),
        ("Handle", report.handle.clone()),
        ("Registration", or_dash(report.id.as_deref())),
        ("Listed", report.total.to_string()),
        ("Pinned", pinned),
    ]);
}
