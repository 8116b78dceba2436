//! Ensure-or-create for the cart transform registration.
//!
//! The Admin API cannot look a registration up by function handle, so the
//! engine creates unconditionally and reads "already exists" rejections as
//! success. Which rejections count is decided by an [`ErrorClassifier`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::classify::{ErrorClass, ErrorClassifier, TokenClassifier};
use crate::metadata::{CART_TRANSFORM_ID, MetadataStore, PointerValue};
use crate::settings::ReconcileSettings;
use crate::tenant::TenantContext;
use feeplus_admin::join_messages;

const ENSURE_CART_TRANSFORM: &str = r#"mutation EnsureCartTransform($handle: String!, $block: Boolean) {
  cartTransformCreate(functionHandle: $handle, blockOnFailure: $block) {
    cartTransform {
      id
    }
    userErrors {
      field
      message
    }
  }
}"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EnsureOutcome {
    Created { id: String },
    AlreadyPresent,
    Failed { reason: String },
}

impl EnsureOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for EnsureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { id } => write!(f, "created {id}"),
            Self::AlreadyPresent => write!(f, "already present"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

pub struct ReconciliationEngine {
    handle: String,
    block_on_failure: bool,
    classifier: Arc<dyn ErrorClassifier>,
    metadata: MetadataStore,
}

impl ReconciliationEngine {
    pub fn new(settings: &ReconcileSettings) -> Self {
        Self {
            handle: settings.handle.clone(),
            block_on_failure: settings.block_on_failure,
            classifier: Arc::new(TokenClassifier::new(&settings.duplicate_tokens)),
            metadata: MetadataStore::new(settings.metafield_namespace.clone()),
        }
    }

    /// Replaces the duplicate classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl ErrorClassifier + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Makes sure the registration exists.
    ///
    /// One create attempt, no retries. A new id is saved under
    /// `cart_transform_id`; failing to save it fails the outcome even though
    /// the registration now exists.
    pub async fn ensure(&self, tenant: &TenantContext) -> EnsureOutcome {
        let variables = json!({ "handle": self.handle, "block": self.block_on_failure });
        let (payload, errors) = match tenant
            .mutate_raw(ENSURE_CART_TRANSFORM, variables, "cartTransformCreate")
            .await
        {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(shop = %tenant.domain(), handle = %self.handle, error = %err, "Cart transform create failed");
                return EnsureOutcome::failed(err.to_string());
            }
        };

        if !errors.is_empty() {
            let joined = join_messages(&errors);
            return match self.classifier.classify(&joined) {
                ErrorClass::AlreadyPresent => {
                    tracing::info!(shop = %tenant.domain(), handle = %self.handle, reason = %joined, "Cart transform already present");
                    EnsureOutcome::AlreadyPresent
                }
                ErrorClass::Failure => {
                    tracing::warn!(shop = %tenant.domain(), handle = %self.handle, reason = %joined, "Cart transform rejected");
                    EnsureOutcome::failed(joined)
                }
            };
        }

        let Some(id) = payload["cartTransform"]["id"].as_str().map(str::to_string) else {
            return EnsureOutcome::failed("cartTransformCreate returned no id");
        };

        if !tenant.tenant_id().is_empty() {
            let pointer = [(CART_TRANSFORM_ID, PointerValue::present(id.as_str()))];
            if let Err(err) = self.metadata.write(tenant, &pointer).await {
                tracing::warn!(shop = %tenant.domain(), cart_transform = %id, error = %err, "Cart transform id not saved");
                return EnsureOutcome::failed(format!(
                    "Cart transform {id} created but its id could not be saved: {err}"
                ));
            }
        }

        tracing::info!(shop = %tenant.domain(), handle = %self.handle, cart_transform = %id, "Cart transform created");
        EnsureOutcome::Created { id }
    }

    /// Post-install hook. Logs the outcome and never fails.
    pub async fn after_install(&self, tenant: &TenantContext) -> EnsureOutcome {
        let outcome = self.ensure(tenant).await;
        match &outcome {
            EnsureOutcome::Failed { reason } => {
                tracing::error!(shop = %tenant.domain(), reason = %reason, "Cart transform not ensured after install");
            }
            other => {
                tracing::info!(shop = %tenant.domain(), outcome = %other, "Cart transform ensured after install");
            }
        }
        outcome
    }
}

impl fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconciliationEngine")
            .field("handle", &self.handle)
            .field("block_on_failure", &self.block_on_failure)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}
