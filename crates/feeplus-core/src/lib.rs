//! # feeplus-core
//!
//! Keeps a tenant's commerce platform resources consistent with what the
//! application expects:
//!
//! - [`ReconciliationEngine`] makes sure the cart transform registration
//!   exists, treating "already exists" rejections as success.
//! - [`HealthProbe`] reports whether a registration is listed and repairs a
//!   missing one.
//! - [`ResourceSaga`] creates and updates the fee product/variant and keeps
//!   the metafield pointers that let the application find it again.
//!
//! Both build on [`SchemaAdapter`], which discovers how the running Admin
//! API version wants its mutations called, and [`MetadataStore`], which
//! reads, writes and deletes the pointers.
//!
//! ## Example
//!
//! ```ignore
//! use feeplus_core::{HealthProbe, ReconcileSettings, TenantContext};
//!
//! let tenant = TenantContext::discover(client).await?;
//! let probe = HealthProbe::new(&ReconcileSettings::default());
//!
//! let report = probe.check(&tenant).await?;
//! if !report.exists {
//!     let repaired = probe.repair(&tenant).await;
//!     println!("{:?}", repaired.state);
//! }
//! ```

pub mod classify;
mod error;
pub mod gid;
pub mod health;
pub mod metadata;
pub mod price;
pub mod reconcile;
pub mod rules;
pub mod saga;
pub mod schema;
mod settings;
mod tenant;

#[cfg(test)]
pub(crate) mod test_support;

pub use classify::{ErrorClass, ErrorClassifier, TokenClassifier};
pub use error::{ErrorCategory, ReconcileError};
pub use health::{HealthProbe, HealthReport, HealthState, RepairReport, RepairState};
pub use metadata::{DeleteOutcome, DeleteTier, MetadataStore, MetafieldEntry, PointerValue};
pub use price::{PriceError, normalize_price, parse_price};
pub use reconcile::{EnsureOutcome, ReconciliationEngine};
pub use saga::{
    CreateOutcome, FeeResource, FeeStatus, PublicationState, ResourceSaga, SagaFailure,
    SagaReport, SagaStep, StepOutcome, StepRecord, UpdateOutcome, VariantSummary,
};
pub use schema::{
    ArgumentSpec, Capability, MutationShape, SchemaAdapter, ShapeKind, TypeKind, TypeRef,
};
pub use settings::ReconcileSettings;
pub use tenant::TenantContext;

/// Type alias for a reconciliation result.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
