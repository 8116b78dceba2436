//! Existence check and repair for the cart transform registration.

use serde::Serialize;
use serde_json::json;

use crate::ReconcileResult;
use crate::error::ReconcileError;
use crate::metadata::{CART_TRANSFORM_ID, MetadataStore};
use crate::reconcile::{EnsureOutcome, ReconciliationEngine};
use crate::settings::ReconcileSettings;
use crate::tenant::TenantContext;

const LIST_CART_TRANSFORMS: &str = r#"query ListCartTransforms($first: Int!) {
  cartTransforms(first: $first) {
    nodes {
      id
    }
  }
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Missing,
}

/// Result of [`HealthProbe::check`].
///
/// `exists` only means at least one registration is listed. Unless
/// `pinned` is `Some(true)`, `id` is merely the first listed registration
/// and may belong to another application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub exists: bool,
    pub id: Option<String>,
    pub total: usize,
    pub handle: String,
    /// Whether the saved `cart_transform_id` is among the listed ones;
    /// `None` when nothing was saved.
    pub pinned: Option<bool>,
}

impl HealthReport {
    pub fn state(&self) -> HealthState {
        if self.exists {
            HealthState::Healthy
        } else {
            HealthState::Missing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairState {
    Healthy,
    StillMissing,
    RepairFailed,
}

/// Result of [`HealthProbe::repair`]: the ensure outcome plus the fresh check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    pub state: RepairState,
    pub ensure: EnsureOutcome,
    pub health: Option<HealthReport>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct HealthProbe {
    engine: ReconciliationEngine,
    metadata: MetadataStore,
    page_size: u32,
}

impl HealthProbe {
    pub fn new(settings: &ReconcileSettings) -> Self {
        Self::with_engine(ReconciliationEngine::new(settings), settings)
    }

    /// Uses `engine` for repairs, e.g. one with a custom classifier.
    pub fn with_engine(engine: ReconciliationEngine, settings: &ReconcileSettings) -> Self {
        Self {
            engine,
            metadata: MetadataStore::new(settings.metafield_namespace.clone()),
            page_size: settings.page_size,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    /// Lists registrations without changing anything.
    pub async fn check(&self, tenant: &TenantContext) -> ReconcileResult<HealthReport> {
        let data = tenant
            .query(LIST_CART_TRANSFORMS, json!({ "first": self.page_size }))
            .await?;
        let nodes = data["cartTransforms"]["nodes"]
            .as_array()
            .ok_or_else(|| ReconcileError::malformed("cartTransforms returned no nodes"))?;
        let ids = nodes
            .iter()
            .filter_map(|n| n["id"].as_str())
            .map(str::to_string)
            .collect::<Vec<_>>();

        let saved = self.saved_id(tenant).await;
        let (id, pinned) = match saved {
            Some(saved) if ids.contains(&saved) => (Some(saved), Some(true)),
            Some(_) => (ids.first().cloned(), Some(false)),
            None => (ids.first().cloned(), None),
        };

        let report = HealthReport {
            exists: !ids.is_empty(),
            id,
            total: ids.len(),
            handle: self.engine.handle().to_string(),
            pinned,
        };
        tracing::debug!(
            shop = %tenant.domain(),
            exists = report.exists,
            total = report.total,
            pinned = ?report.pinned,
            "Cart transform health checked"
        );
        Ok(report)
    }

    async fn saved_id(&self, tenant: &TenantContext) -> Option<String> {
        if tenant.tenant_id().is_empty() {
            return None;
        }
        match self.metadata.read_one(tenant, CART_TRANSFORM_ID).await {
            Ok(entry) => entry.value.as_present().map(str::to_string),
            Err(err) => {
                tracing::warn!(shop = %tenant.domain(), error = %err, "Saved cart transform id not readable");
                None
            }
        }
    }

    /// Ensures the registration, then checks again. Never fails.
    pub async fn repair(&self, tenant: &TenantContext) -> RepairReport {
        let ensure = self.engine.ensure(tenant).await;

        let (state, health, error) = match self.check(tenant).await {
            Ok(report) if report.exists => (RepairState::Healthy, Some(report), None),
            Ok(report) => match &ensure {
                EnsureOutcome::Failed { reason } => {
                    (RepairState::RepairFailed, Some(report), Some(reason.clone()))
                }
                _ => (RepairState::StillMissing, Some(report), None),
            },
            Err(err) => (RepairState::RepairFailed, None, Some(err.to_string())),
        };

        tracing::info!(
            shop = %tenant.domain(),
            state = ?state,
            ensure = %ensure,
            "Cart transform repair finished"
        );
        RepairReport {
            state,
            ensure,
            health,
            error,
        }
    }
}
