use std::fmt;

use feeplus_admin::{DynAdminClient, UserError, join_messages};
use serde_json::{Value, json};

use crate::error::ReconcileError;

const SHOP_IDENTITY: &str = r#"query ShopIdentity {
  shop {
    id
    myshopifyDomain
  }
}"#;

/// One tenant's identity plus an authenticated client.
///
/// Owned by the caller and borrowed by every operation; nothing in this
/// crate keeps it beyond a single call.
#[derive(Clone)]
pub struct TenantContext {
    tenant_id: String,
    domain: String,
    client: DynAdminClient,
}

impl TenantContext {
    pub fn new(
        tenant_id: impl Into<String>,
        domain: impl Into<String>,
        client: DynAdminClient,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            domain: domain.into(),
            client,
        }
    }

    /// Resolves the shop id and domain through the client itself.
    pub async fn discover(client: DynAdminClient) -> Result<Self, ReconcileError> {
        let data = client.execute(SHOP_IDENTITY, json!({})).await?.into_data()?;
        let shop = &data["shop"];
        let Some(id) = shop["id"].as_str().filter(|id| !id.is_empty()) else {
            return Err(ReconcileError::malformed("Shop not resolved"));
        };
        let domain = shop["myshopifyDomain"].as_str().unwrap_or_default();

        tracing::debug!(shop = %domain, tenant_id = %id, "Tenant resolved");
        Ok(Self::new(id, domain, client))
    }

    /// The shop GID; owner of every metafield this crate writes.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn client(&self) -> &DynAdminClient {
        &self.client
    }

    /// Runs a query and returns `data` once top-level errors are ruled out.
    pub(crate) async fn query(
        &self,
        document: &str,
        variables: Value,
    ) -> Result<Value, ReconcileError> {
        Ok(self.client.execute(document, variables).await?.into_data()?)
    }

    /// Runs a mutation and returns its payload object with its `userErrors`.
    pub(crate) async fn mutate_raw(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> Result<(Value, Vec<UserError>), ReconcileError> {
        let mut data = self.query(document, variables).await?;
        let payload = data
            .get_mut(field)
            .map(Value::take)
            .filter(|p| !p.is_null())
            .ok_or_else(|| ReconcileError::malformed(format!("{field} returned no payload")))?;
        let errors = UserError::from_payload(&payload);
        Ok((payload, errors))
    }

    /// Runs a mutation and fails with the joined `userErrors` if any.
    pub(crate) async fn mutate(
        &self,
        document: &str,
        variables: Value,
        field: &str,
    ) -> Result<Value, ReconcileError> {
        let (payload, errors) = self.mutate_raw(document, variables, field).await?;
        if errors.is_empty() {
            Ok(payload)
        } else {
            Err(ReconcileError::Validation(join_messages(&errors)))
        }
    }
}

impl fmt::Debug for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantContext")
            .field("tenant_id", &self.tenant_id)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}
