//! Creation and update of the fee product/variant.
//!
//! Each run is a strict sequence of steps; the first failure aborts and
//! nothing already created is rolled back. Every run returns a
//! [`SagaReport`] listing what each attempted step did, so an operator can
//! see exactly where a half-built resource was left.

mod pointer;
mod steps;
mod types;

pub use types::{
    CreateOutcome, FeeResource, FeeStatus, PublicationState, SagaFailure, SagaReport, SagaStep,
    StepOutcome, StepRecord, UpdateOutcome, VariantSummary,
};

use crate::error::ReconcileError;
use crate::gid::normalize_variant_gid;
use crate::metadata::{FEE_VARIANT_GID, FEE_VARIANT_LABEL, MetadataStore, PointerValue};
use crate::price::normalize_price;
use crate::schema::SchemaAdapter;
use crate::settings::ReconcileSettings;
use crate::tenant::TenantContext;

use types::StepLog;

#[derive(Debug, Clone)]
pub struct ResourceSaga {
    metadata: MetadataStore,
    option_name: String,
    storefront_channel: String,
    page_size: u32,
}

impl ResourceSaga {
    pub fn new(settings: &ReconcileSettings) -> Self {
        Self {
            metadata: MetadataStore::new(settings.metafield_namespace.clone()),
            option_name: settings.option_name.clone(),
            storefront_channel: settings.storefront_channel.clone(),
            page_size: settings.page_size,
        }
    }

    /// Creates the fee product with one option value, prices and publishes
    /// it, then saves the variant pointer.
    ///
    /// `price` is normalized leniently; an unusable price becomes `0.00`.
    pub async fn create_fee_resource(
        &self,
        tenant: &TenantContext,
        title: &str,
        variant_label: &str,
        price: &str,
    ) -> SagaReport<CreateOutcome> {
        let mut log = StepLog::default();
        let outcome = match self
            .run_create(tenant, &mut log, title.trim(), variant_label.trim(), price)
            .await
        {
            Ok(resource) => {
                tracing::info!(
                    shop = %tenant.domain(),
                    product = %resource.product_id,
                    variant = %resource.variant_id,
                    price = %resource.price,
                    "Fee resource created"
                );
                CreateOutcome::Created(resource)
            }
            Err(failure) => {
                tracing::warn!(
                    shop = %tenant.domain(),
                    step = %failure.step,
                    reason = %failure.reason,
                    "Fee resource creation aborted"
                );
                CreateOutcome::Failed(failure)
            }
        };
        log.finish(outcome)
    }

    async fn run_create(
        &self,
        tenant: &TenantContext,
        log: &mut StepLog,
        title: &str,
        label: &str,
        price: &str,
    ) -> Result<FeeResource, SagaFailure> {
        let schema = SchemaAdapter::new();
        let price = normalize_price(price);

        if title.is_empty() {
            return Err(log.fail(
                SagaStep::Product,
                ReconcileError::invalid_input("title must not be empty"),
            ));
        }
        if label.is_empty() {
            return Err(log.fail(
                SagaStep::Option,
                ReconcileError::invalid_input("variant label must not be empty"),
            ));
        }
        let product_id = steps::create_product(tenant, &schema, title)
            .await
            .map_err(|e| log.fail(SagaStep::Product, e))?;
        log.done(SagaStep::Product, &product_id);

        steps::create_option(tenant, &schema, &product_id, &self.option_name, label)
            .await
            .map_err(|e| log.fail(SagaStep::Option, e))?;
        log.done(SagaStep::Option, format!("{} = {label}", self.option_name));

        let variant = steps::find_variant(tenant, &product_id, label, self.page_size)
            .await
            .map_err(|e| log.fail(SagaStep::Variant, e))?;
        log.done(SagaStep::Variant, &variant.id);

        let via = steps::set_price(tenant, &schema, &product_id, &variant.id, &price)
            .await
            .map_err(|e| log.fail(SagaStep::Price, e))?;
        log.done(SagaStep::Price, format!("{price} via {via}"));

        let found = steps::find_publication(tenant, &self.storefront_channel, self.page_size)
            .await
            .map_err(|e| log.fail(SagaStep::Publish, e))?;
        let publication = match found {
            Some(publication_id) => {
                let state = steps::publish(tenant, &schema, &product_id, &publication_id)
                    .await
                    .map_err(|e| log.fail(SagaStep::Publish, e))?;
                log.done(SagaStep::Publish, &publication_id);
                state
            }
            None => {
                log.skipped(
                    SagaStep::Publish,
                    format!("no publication matching `{}`", self.storefront_channel),
                );
                PublicationState::NotPublished
            }
        };

        let pointers = [
            (FEE_VARIANT_GID, PointerValue::present(variant.id.as_str())),
            (FEE_VARIANT_LABEL, PointerValue::present(label)),
        ];
        self.metadata
            .write(tenant, &pointers)
            .await
            .map_err(|e| log.fail(SagaStep::Pointer, e))?;
        log.done(SagaStep::Pointer, &variant.id);

        Ok(FeeResource {
            product_id,
            variant_id: variant.id,
            variant_title: variant.title,
            price,
            publication,
        })
    }

    /// Reprices an existing fee variant and optionally replaces the saved label.
    ///
    /// `variant_id` may be a variant GID or its numeric id. An id that does
    /// not resolve yields [`UpdateOutcome::NotFound`] before any price
    /// change is attempted.
    pub async fn update_fee_resource(
        &self,
        tenant: &TenantContext,
        variant_id: &str,
        variant_label: Option<&str>,
        price: &str,
    ) -> SagaReport<UpdateOutcome> {
        let mut log = StepLog::default();
        let label = variant_label.map(str::trim).filter(|l| !l.is_empty());
        let outcome = self
            .run_update(tenant, &mut log, variant_id, label, price)
            .await;

        match &outcome {
            UpdateOutcome::Updated(resource) => tracing::info!(
                shop = %tenant.domain(),
                variant = %resource.variant_id,
                price = %resource.price,
                "Fee resource updated"
            ),
            UpdateOutcome::NotFound { variant_id } => tracing::warn!(
                shop = %tenant.domain(),
                variant = %variant_id,
                "Fee variant not found"
            ),
            UpdateOutcome::Failed(failure) => tracing::warn!(
                shop = %tenant.domain(),
                step = %failure.step,
                reason = %failure.reason,
                "Fee resource update aborted"
            ),
        }
        log.finish(outcome)
    }

    async fn run_update(
        &self,
        tenant: &TenantContext,
        log: &mut StepLog,
        variant_id: &str,
        label: Option<&str>,
        price: &str,
    ) -> UpdateOutcome {
        let Some(gid) = normalize_variant_gid(variant_id) else {
            log.fail(
                SagaStep::Lookup,
                ReconcileError::not_found("ProductVariant", variant_id.trim()),
            );
            return UpdateOutcome::NotFound {
                variant_id: variant_id.trim().to_string(),
            };
        };

        let variant = match steps::lookup_variant(tenant, &gid).await {
            Ok(Some(variant)) => variant,
            Ok(None) => {
                log.fail(SagaStep::Lookup, ReconcileError::not_found("ProductVariant", &gid));
                return UpdateOutcome::NotFound { variant_id: gid };
            }
            Err(err) => return UpdateOutcome::Failed(log.fail(SagaStep::Lookup, err)),
        };
        log.done(SagaStep::Lookup, &variant.product_id);

        let schema = SchemaAdapter::new();
        let price = normalize_price(price);
        match steps::set_price(tenant, &schema, &variant.product_id, &variant.id, &price).await {
            Ok(via) => log.done(SagaStep::Price, format!("{price} via {via}")),
            Err(err) => return UpdateOutcome::Failed(log.fail(SagaStep::Price, err)),
        }

        match label {
            Some(label) => {
                let pointer = [(FEE_VARIANT_LABEL, PointerValue::present(label))];
                if let Err(err) = self.metadata.write(tenant, &pointer).await {
                    return UpdateOutcome::Failed(log.fail(SagaStep::Label, err));
                }
                log.done(SagaStep::Label, label);
            }
            None => log.skipped(SagaStep::Label, "no label supplied"),
        }

        UpdateOutcome::Updated(FeeResource {
            product_id: variant.product_id,
            variant_id: variant.id,
            variant_title: variant.title,
            price,
            publication: PublicationState::Unknown,
        })
    }
}
