use crate::ReconcileResult;
use crate::gid::normalize_variant_gid;
use crate::metadata::{DeleteOutcome, FEE_VARIANT_GID, FEE_VARIANT_LABEL, PointerValue};
use crate::tenant::TenantContext;

use super::ResourceSaga;
use super::steps;
use super::types::FeeStatus;

impl ResourceSaga {
    /// Reports the saved fee pointer and whether it still resolves.
    ///
    /// A stale pointer (saved but unresolvable) is reported, not repaired;
    /// [`ResourceSaga::clear_fee_pointer`] removes it.
    pub async fn fee_status(&self, tenant: &TenantContext) -> ReconcileResult<FeeStatus> {
        let entries = self
            .metadata
            .read(tenant, &[FEE_VARIANT_GID, FEE_VARIANT_LABEL])
            .await?;
        let value_of = |key: &str| {
            entries
                .get(key)
                .map(|e| e.value.clone())
                .unwrap_or(PointerValue::Absent)
        };
        let pointer = value_of(FEE_VARIANT_GID);
        let label = value_of(FEE_VARIANT_LABEL);

        let saved_variant_gid = pointer.as_present().map(str::to_string);
        // A saved value that is not a variant id cannot resolve; report it
        // as stale without asking the platform.
        let variant = match saved_variant_gid.as_deref().and_then(normalize_variant_gid) {
            Some(gid) => steps::lookup_variant(tenant, &gid).await?,
            None => None,
        };

        let status = FeeStatus {
            pointer,
            saved_variant_label: label.as_present().map(str::to_string),
            variant_exists: variant.is_some(),
            saved_variant_gid,
            variant,
        };
        if status.is_stale() {
            tracing::warn!(
                shop = %tenant.domain(),
                variant = ?status.saved_variant_gid,
                "Saved fee variant no longer exists"
            );
        }
        Ok(status)
    }

    /// Removes both fee pointers.
    pub async fn clear_fee_pointer(&self, tenant: &TenantContext) -> ReconcileResult<DeleteOutcome> {
        self.metadata
            .delete(tenant, &[FEE_VARIANT_GID, FEE_VARIANT_LABEL])
            .await
    }
}
