use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AdminError;
use crate::response::GraphqlResponse;

/// An authenticated GraphQL transport bound to one tenant.
///
/// Implementations own authentication and transport-level concerns. A
/// returned `Ok` only means an envelope was received; callers must still
/// inspect `errors` and any mutation `userErrors`.
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Executes a GraphQL document with the given variables.
    async fn execute(&self, document: &str, variables: Value)
    -> Result<GraphqlResponse, AdminError>;
}

/// Type alias for a shared client trait object.
pub type DynAdminClient = Arc<dyn AdminClient>;

#[async_trait]
impl<T: AdminClient + ?Sized> AdminClient for Arc<T> {
    async fn execute(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<GraphqlResponse, AdminError> {
        (**self).execute(document, variables).await
    }
}

/// Returns the operation name of a document (`query Name(...)` / `mutation Name {`).
///
/// Anonymous documents yield `None`.
pub fn operation_name(document: &str) -> Option<&str> {
    let trimmed = document.trim_start();
    let rest = ["query", "mutation", "subscription"]
        .iter()
        .find_map(|kw| trimmed.strip_prefix(kw))?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_name() {
        assert_eq!(
            operation_name("mutation EnsureCartTransform($handle: String!) { x }"),
            Some("EnsureCartTransform")
        );
        assert_eq!(
            operation_name("\n  query ShopIdentity { shop { id } }"),
            Some("ShopIdentity")
        );
        assert_eq!(operation_name("query{ shop { id } }"), None);
        assert_eq!(operation_name("{ shop { id } }"), None);
        assert_eq!(operation_name("query { shop { id } }"), None);
    }
}
