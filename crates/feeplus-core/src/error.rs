//! Error types for reconciliation operations.

use std::fmt;

use feeplus_admin::AdminError;

/// Errors that can occur while reconciling remote resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// The remote call could not be completed.
    #[error("{0}")]
    Transport(String),

    /// The remote API rejected a mutation (`userErrors`, already joined).
    #[error("{0}")]
    Validation(String),

    /// The running API version offers no recognized form of a mutation.
    #[error(
        "Mutation `{mutation}` is not available in a supported form; check the configured Admin API version"
    )]
    SchemaCapability {
        /// The mutation (or fallback chain) that could not be resolved.
        mutation: String,
    },

    /// A persisted pointer no longer resolves to a live resource.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of remote resource.
        resource: String,
        /// Identifier that failed to resolve.
        id: String,
    },

    /// The caller supplied an unusable argument.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A successful response lacked a field the operation depends on.
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl ReconcileError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    #[must_use]
    pub fn schema_capability(mutation: impl Into<String>) -> Self {
        Self::SchemaCapability {
            mutation: mutation.into(),
        }
    }

    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    /// Returns the error category for logging and result rendering.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::Malformed(_) => ErrorCategory::Transport,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::SchemaCapability { .. } => ErrorCategory::SchemaCapability,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
        }
    }
}

impl From<AdminError> for ReconcileError {
    fn from(err: AdminError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Transport,
    Validation,
    SchemaCapability,
    NotFound,
    InvalidInput,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Validation => write!(f, "validation"),
            Self::SchemaCapability => write!(f, "schema_capability"),
            Self::NotFound => write!(f, "not_found"),
            Self::InvalidInput => write!(f, "invalid_input"),
        }
    }
}
