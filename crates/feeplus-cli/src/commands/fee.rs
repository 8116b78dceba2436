use anyhow::{Context, Result};
use colored::Colorize;
use feeplus_core::{
    CreateOutcome, FeeResource, PublicationState, ResourceSaga, SagaReport, StepOutcome,
    TenantContext, UpdateOutcome,
};
use feeplus_cli::config::FeeDefaults;

use crate::cli::{FeeCreateArgs, FeeUpdateArgs, OutputFormat};
use crate::output::{
    or_dash, print_error, print_fields, print_json, print_success, print_table, print_warning,
};

pub async fn status(saga: &ResourceSaga, tenant: &TenantContext, format: OutputFormat) -> Result<bool> {
    let status = saga
        .fee_status(tenant)
        .await
        .context("Failed to read the saved fee variant")?;

    if matches!(format, OutputFormat::Json) {
        print_json(&status)?;
        return Ok(!status.is_stale());
    }

    let variant = status.variant.as_ref();
    print_fields(vec![
        ("Saved variant", or_dash(status.saved_variant_gid.as_deref())),
        ("Saved label", or_dash(status.saved_variant_label.as_deref())),
        ("Exists", status.variant_exists.to_string()),
        ("Title", or_dash(variant.map(|v| v.title.as_str()))),
        ("Price", or_dash(variant.and_then(|v| v.price.as_deref()))),
        (
            "Product",
            or_dash(variant.and_then(|v| v.product_title.as_deref())),
        ),
    ]);
    if status.is_stale() {
        print_warning("Saved fee variant no longer exists; run `feeplus fee clear`");
    } else if status.saved_variant_gid.is_none() {
        print_warning("No fee variant saved");
    }
    Ok(!status.is_stale())
}

pub async fn create(
    saga: &ResourceSaga,
    tenant: &TenantContext,
    defaults: &FeeDefaults,
    args: &FeeCreateArgs,
    format: OutputFormat,
) -> Result<bool> {
    let title = args.title.as_deref().unwrap_or(&defaults.title);
    let label = args.label.as_deref().unwrap_or(&defaults.label);
    let price = args.price.as_deref().unwrap_or(&defaults.price);

    let report = saga.create_fee_resource(tenant, title, label, price).await;
    let ok = matches!(report.outcome, CreateOutcome::Created(_));

    if matches!(format, OutputFormat::Json) {
        print_json(&report)?;
        return Ok(ok);
    }

    print_steps(&report);
    match &report.outcome {
        CreateOutcome::Created(resource) => {
            print_resource(resource);
            print_success(&format!("Fee variant {} created", resource.variant_id.cyan()));
        }
        CreateOutcome::Failed(failure) => print_error(&failure.to_string()),
    }
    Ok(ok)
}

pub async fn update(
    saga: &ResourceSaga,
    tenant: &TenantContext,
    args: &FeeUpdateArgs,
    format: OutputFormat,
) -> Result<bool> {
    let report = saga
        .update_fee_resource(tenant, &args.variant_id, args.label.as_deref(), &args.price)
        .await;
    let ok = matches!(report.outcome, UpdateOutcome::Updated(_));

    if matches!(format, OutputFormat::Json) {
        print_json(&report)?;
        return Ok(ok);
    }

    print_steps(&report);
    match &report.outcome {
        UpdateOutcome::Updated(resource) => {
            print_resource(resource);
            print_success(&format!("Fee variant {} updated", resource.variant_id.cyan()));
        }
        UpdateOutcome::NotFound { variant_id } => {
            print_error(&format!("Variant {variant_id} not found"))
        }
        UpdateOutcome::Failed(failure) => print_error(&failure.to_string()),
    }
    Ok(ok)
}

pub async fn clear(saga: &ResourceSaga, tenant: &TenantContext, format: OutputFormat) -> Result<bool> {
    let outcome = saga
        .clear_fee_pointer(tenant)
        .await
        .context("Failed to clear the saved fee variant")?;

    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Table => print_success(&format!(
            "Cleared {} ({})",
            outcome.keys.join(", "),
            outcome.tier
        )),
    }
    Ok(true)
}

fn print_steps<O>(report: &SagaReport<O>) {
    let rows = report
        .steps
        .iter()
        .map(|record| {
            let (status, detail) = match &record.outcome {
                StepOutcome::Done { detail } => ("done".green().to_string(), detail.clone()),
                StepOutcome::Skipped { reason } => {
                    ("skipped".yellow().to_string(), reason.clone())
                }
                StepOutcome::Failed { reason } => ("failed".red().to_string(), reason.clone()),
            };
            [record.step.to_string(), status, detail]
        })
        .collect();
    print_table(["Step", "Status", "Detail"], rows);
}

fn print_resource(resource: &FeeResource) {
    let publication = match &resource.publication {
        PublicationState::Published { publication_id } => publication_id.clone(),
        PublicationState::NotPublished => "not published".to_string(),
        PublicationState::Unknown => "-".to_string(),
    };
    print_fields(vec![
        ("Product", resource.product_id.clone()),
        ("Variant", resource.variant_id.clone()),
        ("Title", resource.variant_title.clone()),
        ("Price", resource.price.clone()),
        ("Publication", publication),
    ]);
}
