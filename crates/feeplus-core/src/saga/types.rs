use std::fmt;

use serde::Serialize;

use crate::error::{ErrorCategory, ReconcileError};
use crate::metadata::PointerValue;

/// Named steps of the fee resource pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    Product,
    Option,
    Variant,
    Price,
    Publish,
    Pointer,
    Lookup,
    Label,
}

impl SagaStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Option => "option",
            Self::Variant => "variant",
            Self::Price => "price",
            Self::Publish => "publish",
            Self::Pointer => "pointer",
            Self::Lookup => "lookup",
            Self::Label => "label",
        }
    }
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Done { detail: String },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: SagaStep,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// The step that aborted a saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SagaFailure {
    pub step: SagaStep,
    pub reason: String,
    pub category: ErrorCategory,
}

impl fmt::Display for SagaFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} step failed: {}", self.step, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PublicationState {
    Published { publication_id: String },
    NotPublished,
    /// Not looked at, e.g. by the update path.
    Unknown,
}

/// The fee product/variant pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeResource {
    pub product_id: String,
    pub variant_id: String,
    pub variant_title: String,
    pub price: String,
    pub publication: PublicationState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CreateOutcome {
    Created(FeeResource),
    Failed(SagaFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated(FeeResource),
    NotFound { variant_id: String },
    Failed(SagaFailure),
}

/// Outcome of a saga run plus what every attempted step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SagaReport<O> {
    pub outcome: O,
    pub steps: Vec<StepRecord>,
}

impl<O> SagaReport<O> {
    pub fn step(&self, step: SagaStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    /// The last step attempted.
    pub fn last_step(&self) -> Option<SagaStep> {
        self.steps.last().map(|r| r.step)
    }
}

/// A variant as resolved through `node(id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSummary {
    pub id: String,
    pub title: String,
    pub price: Option<String>,
    pub product_id: String,
    pub product_title: Option<String>,
}

/// Read-repair view of the saved fee pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeeStatus {
    /// Raw state of the variant pointer.
    pub pointer: PointerValue,
    /// Cleared and absent pointers are both reported as not saved.
    pub saved_variant_gid: Option<String>,
    pub saved_variant_label: Option<String>,
    pub variant_exists: bool,
    pub variant: Option<VariantSummary>,
}

impl FeeStatus {
    /// A pointer is saved but the variant is gone.
    pub fn is_stale(&self) -> bool {
        self.saved_variant_gid.is_some() && !self.variant_exists
    }
}

/// Accumulates step records while a saga runs.
#[derive(Debug, Default)]
pub(crate) struct StepLog {
    steps: Vec<StepRecord>,
}

impl StepLog {
    pub(crate) fn done(&mut self, step: SagaStep, detail: impl Into<String>) {
        self.push(step, StepOutcome::Done {
            detail: detail.into(),
        });
    }

    pub(crate) fn skipped(&mut self, step: SagaStep, reason: impl Into<String>) {
        self.push(step, StepOutcome::Skipped {
            reason: reason.into(),
        });
    }

    /// Records `err` against `step` and turns it into the saga failure.
    pub(crate) fn fail(&mut self, step: SagaStep, err: ReconcileError) -> SagaFailure {
        let reason = err.to_string();
        self.push(step, StepOutcome::Failed {
            reason: reason.clone(),
        });
        SagaFailure {
            step,
            reason,
            category: err.category(),
        }
    }

    pub(crate) fn finish<O>(self, outcome: O) -> SagaReport<O> {
        SagaReport {
            outcome,
            steps: self.steps,
        }
    }

    fn push(&mut self, step: SagaStep, outcome: StepOutcome) {
        tracing::debug!(step = %step, outcome = ?outcome, "Saga step finished");
        self.steps.push(StepRecord { step, outcome });
    }
}
