//! Transport error types for the Admin GraphQL client.

/// Errors that can occur while executing a GraphQL document.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// The request could not be sent or the connection failed.
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The platform throttled the request.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The response body was not a GraphQL envelope.
    #[error("Failed to parse GraphQL response: {0}")]
    Parse(String),

    /// The response carried top-level GraphQL errors.
    #[error("GraphQL errors: {}", .0.join(" | "))]
    GraphQL(Vec<String>),

    /// The client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AdminError {
    /// Creates a new `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a new `InvalidConfig` error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` when the call never produced a GraphQL envelope.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::RateLimited(_) | Self::Parse(_)
        )
    }
}
