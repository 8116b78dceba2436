//! End-to-end fee resource flows against the in-memory Admin API.

mod common;

use common::{ApiFlavor, FakeShop};
use feeplus_core::metadata::{CLEARED_SENTINEL, DEFAULT_NAMESPACE, FEE_VARIANT_GID, FEE_VARIANT_LABEL};
use feeplus_core::{
    CreateOutcome, DeleteTier, ErrorCategory, PublicationState, ReconcileSettings, ResourceSaga,
    SagaStep, StepOutcome, UpdateOutcome,
};

fn saga() -> ResourceSaga {
    ResourceSaga::new(&ReconcileSettings::default())
}

#[tokio::test]
async fn create_then_update_resolves_the_same_variant() {
    let shop = FakeShop::new(ApiFlavor::Modern);
    let tenant = shop.tenant();

    let report = saga()
        .create_fee_resource(&tenant, "Service fee", "Fee", "10")
        .await;
    let CreateOutcome::Created(resource) = report.outcome else {
        panic!("create failed: {:?}", report.steps);
    };

    assert_eq!(resource.price, "10.00");
    assert_eq!(resource.variant_title, "Fee");
    assert_eq!(shop.variant_price(&resource.variant_id).as_deref(), Some("10.00"));
    assert!(matches!(resource.publication, PublicationState::Published { .. }));
    assert!(shop.is_published(&resource.product_id));
    assert_eq!(
        shop.metafield(DEFAULT_NAMESPACE, FEE_VARIANT_GID).as_deref(),
        Some(resource.variant_id.as_str())
    );
    assert_eq!(
        shop.metafield(DEFAULT_NAMESPACE, FEE_VARIANT_LABEL).as_deref(),
        Some("Fee")
    );

    let update = saga()
        .update_fee_resource(&tenant, &resource.variant_id, None, "12,5")
        .await;
    let UpdateOutcome::Updated(ref updated) = update.outcome else {
        panic!("update failed: {:?}", update.steps);
    };
    assert_eq!(updated.variant_id, resource.variant_id);
    assert_eq!(updated.product_id, resource.product_id);
    assert_eq!(shop.variant_price(&resource.variant_id).as_deref(), Some("12.5"));
    assert!(matches!(
        update.step(SagaStep::Label),
        Some(StepOutcome::Skipped { .. })
    ));
}

#[tokio::test]
async fn update_accepts_numeric_variant_id() {
    let shop = FakeShop::new(ApiFlavor::Modern);
    let tenant = shop.tenant();

    let CreateOutcome::Created(resource) = saga()
        .create_fee_resource(&tenant, "Service fee", "Fee", "1")
        .await
        .outcome
    else {
        panic!("create failed");
    };
    let numeric = resource.variant_id.rsplit('/').next().unwrap().to_string();

    let update = saga()
        .update_fee_resource(&tenant, &numeric, Some("Handling"), "2")
        .await;
    assert!(matches!(update.outcome, UpdateOutcome::Updated(_)));
    assert_eq!(
        shop.metafield(DEFAULT_NAMESPACE, FEE_VARIANT_LABEL).as_deref(),
        Some("Handling")
    );
}

#[tokio::test]
async fn option_failure_stops_at_option_step() {
    let shop = FakeShop::new(ApiFlavor::Modern);
    shop.reject("CreateFeeOption", "Option values must be unique");

    let report = saga()
        .create_fee_resource(&shop.tenant(), "Service fee", "Fee", "10")
        .await;

    let CreateOutcome::Failed(failure) = &report.outcome else {
        panic!("expected failure");
    };
    assert_eq!(failure.step, SagaStep::Option);
    assert_eq!(failure.step.as_str(), "option");
    assert_eq!(failure.category, ErrorCategory::Validation);
    assert_eq!(report.last_step(), Some(SagaStep::Option));

    // the product stays behind; nothing is compensated
    assert_eq!(shop.product_count(), 1);
    assert_eq!(shop.count("FeeProductVariants"), 0);
    assert_eq!(shop.metafield(DEFAULT_NAMESPACE, FEE_VARIANT_GID), None);
}

#[tokio::test]
async fn blank_label_creates_nothing() {
    let shop = FakeShop::new(ApiFlavor::Modern);

    let report = saga()
        .create_fee_resource(&shop.tenant(), "Service fee", "   ", "10")
        .await;

    assert!(matches!(report.outcome, CreateOutcome::Failed(_)));
    assert_eq!(report.last_step(), Some(SagaStep::Option));
    assert_eq!(shop.product_count(), 0);
    assert!(shop.calls().is_empty());
}

#[tokio::test]
async fn update_with_unknown_variant_never_prices() {
    let shop = FakeShop::new(ApiFlavor::Modern);

    let report = saga()
        .update_fee_resource(&shop.tenant(), "gid://shopify/ProductVariant/404", None, "5")
        .await;

    assert!(matches!(report.outcome, UpdateOutcome::NotFound { .. }));
    assert_eq!(shop.count("SetFeeVariantPrices"), 0);
    assert_eq!(shop.count("SetFeeVariantPrice"), 0);
    assert_eq!(shop.count("MutationShapes"), 0);
}

#[tokio::test]
async fn legacy_api_uses_single_variant_update() {
    let shop = FakeShop::new(ApiFlavor::Legacy);
    let tenant = shop.tenant();

    let report = saga()
        .create_fee_resource(&tenant, "Service fee", "Fee", "3.5")
        .await;
    let CreateOutcome::Created(resource) = report.outcome else {
        panic!("create failed: {:?}", report.steps);
    };

    assert_eq!(shop.count("SetFeeVariantPrice"), 1);
    assert_eq!(shop.count("SetFeeVariantPrices"), 0);
    assert_eq!(shop.variant_price(&resource.variant_id).as_deref(), Some("3.5"));
    match report.steps.iter().find(|s| s.step == SagaStep::Price) {
        Some(record) => assert!(matches!(
            &record.outcome,
            StepOutcome::Done { detail } if detail.contains("productVariantUpdate")
        )),
        None => panic!("price step missing"),
    }
}

#[tokio::test]
async fn status_and_clear_follow_the_pointer() {
    let shop = FakeShop::new(ApiFlavor::Legacy);
    let tenant = shop.tenant();
    let saga = saga();

    let empty = saga.fee_status(&tenant).await.unwrap();
    assert_eq!(empty.saved_variant_gid, None);

    let CreateOutcome::Created(resource) = saga
        .create_fee_resource(&tenant, "Service fee", "Fee", "10")
        .await
        .outcome
    else {
        panic!("create failed");
    };
    let status = saga.fee_status(&tenant).await.unwrap();
    assert!(status.variant_exists);
    assert_eq!(status.saved_variant_gid.as_deref(), Some(resource.variant_id.as_str()));

    let cleared = saga.clear_fee_pointer(&tenant).await.unwrap();
    assert_eq!(cleared.tier, DeleteTier::PerKey);
    let after = saga.fee_status(&tenant).await.unwrap();
    assert_eq!(after.saved_variant_gid, None);
    assert!(!after.is_stale());
}

#[tokio::test]
async fn stale_pointer_is_reported() {
    let shop = FakeShop::new(ApiFlavor::Modern);
    shop.seed_metafield(DEFAULT_NAMESPACE, FEE_VARIANT_GID, "gid://shopify/ProductVariant/999");
    shop.seed_metafield(DEFAULT_NAMESPACE, FEE_VARIANT_LABEL, CLEARED_SENTINEL);

    let status = saga().fee_status(&shop.tenant()).await.unwrap();
    assert!(status.is_stale());
    assert_eq!(status.saved_variant_label, None);
}
