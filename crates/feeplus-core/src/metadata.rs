//! Tenant-scoped metafield pointers.
//!
//! Values live on the shop owner under one namespace. A pointer is either
//! absent, explicitly cleared (stored as [`CLEARED_SENTINEL`]) or present.
//! Deletion walks four tiers because bulk deletion is missing from older
//! API versions and per-key deletion from newer ones:
//!
//! 1. bulk `metafieldsDelete` by owner, namespace and key
//! 2. `metafieldDelete` by id for every key a read resolves
//! 3. nothing to do when no ids exist and bulk deletion is unavailable
//! 4. overwrite every key with the sentinel

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::ReconcileResult;
use crate::error::ReconcileError;
use crate::schema::{Capability, MutationShape, SchemaAdapter, ShapeKind};
use crate::tenant::TenantContext;

pub const DEFAULT_NAMESPACE: &str = "custom_fee";
pub const FEE_VARIANT_GID: &str = "fee_variant_gid";
pub const FEE_VARIANT_LABEL: &str = "fee_variant_label";
pub const CART_TRANSFORM_ID: &str = "cart_transform_id";

/// Reserved wire value marking a pointer as cleared.
pub const CLEARED_SENTINEL: &str = "__CLEARED__";

const METAFIELD_TYPE: &str = "single_line_text_field";

const WRITE_METAFIELDS: &str = r#"mutation WriteMetafields($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields {
      key
    }
    userErrors {
      field
      message
    }
  }
}"#;

/// Value of one pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PointerValue {
    Absent,
    Cleared,
    Present(String),
}

impl PointerValue {
    pub fn present(value: impl Into<String>) -> Self {
        Self::Present(value.into())
    }

    /// Interprets a stored metafield value. Empty values count as absent.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Absent,
            Some(CLEARED_SENTINEL) => Self::Cleared,
            Some(v) => Self::Present(v.to_string()),
        }
    }

    fn to_wire(&self) -> ReconcileResult<&str> {
        match self {
            Self::Absent => Err(ReconcileError::invalid_input(
                "an absent value cannot be written; delete the key instead",
            )),
            Self::Cleared => Ok(CLEARED_SENTINEL),
            Self::Present(v) if v.is_empty() => {
                Err(ReconcileError::invalid_input("metafield value must not be empty"))
            }
            Self::Present(v) if v == CLEARED_SENTINEL => Err(ReconcileError::invalid_input(
                format!("`{CLEARED_SENTINEL}` is reserved"),
            )),
            Self::Present(v) => Ok(v.as_str()),
        }
    }

    pub fn as_present(&self) -> Option<&str> {
        match self {
            Self::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// One metafield as read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetafieldEntry {
    /// Remote id; `None` when the metafield does not exist.
    pub id: Option<String>,
    pub value: PointerValue,
}

impl MetafieldEntry {
    fn absent() -> Self {
        Self {
            id: None,
            value: PointerValue::Absent,
        }
    }
}

/// The deletion tier that succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteTier {
    Bulk,
    PerKey,
    NothingToDelete,
    Sentinel,
}

impl fmt::Display for DeleteTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulk => write!(f, "bulk"),
            Self::PerKey => write!(f, "per_key"),
            Self::NothingToDelete => write!(f, "nothing_to_delete"),
            Self::Sentinel => write!(f, "sentinel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub tier: DeleteTier,
    pub keys: Vec<String>,
}

/// Reads, writes and deletes pointers under one namespace.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    namespace: String,
}

impl Default for MetadataStore {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl MetadataStore {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Reads `keys` in one round trip. Every requested key is in the result.
    pub async fn read(
        &self,
        tenant: &TenantContext,
        keys: &[&str],
    ) -> ReconcileResult<HashMap<String, MetafieldEntry>> {
        let keys = dedup(keys);
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let declarations = (0..keys.len())
            .map(|i| format!(", $k{i}: String!"))
            .collect::<String>();
        let selections = (0..keys.len())
            .map(|i| format!("    m{i}: metafield(namespace: $namespace, key: $k{i}) {{ id value }}\n"))
            .collect::<String>();
        let document = format!(
            "query ReadMetafields($namespace: String!{declarations}) {{\n  shop {{\n{selections}  }}\n}}"
        );

        let mut variables = Map::new();
        variables.insert("namespace".into(), json!(self.namespace));
        for (i, key) in keys.iter().enumerate() {
            variables.insert(format!("k{i}"), json!(key));
        }

        let data = tenant.query(&document, Value::Object(variables)).await?;
        let shop = data
            .get("shop")
            .filter(|s| s.is_object())
            .ok_or_else(|| ReconcileError::malformed("metafield read returned no shop"))?;

        Ok(keys
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let entry = shop
                    .get(format!("m{i}"))
                    .filter(|m| !m.is_null())
                    .map(|m| MetafieldEntry {
                        id: m["id"].as_str().map(str::to_string),
                        value: PointerValue::from_wire(m["value"].as_str()),
                    })
                    .unwrap_or_else(MetafieldEntry::absent);
                ((*key).to_string(), entry)
            })
            .collect())
    }

    /// Reads a single key.
    pub async fn read_one(
        &self,
        tenant: &TenantContext,
        key: &str,
    ) -> ReconcileResult<MetafieldEntry> {
        Ok(self
            .read(tenant, &[key])
            .await?
            .remove(key)
            .unwrap_or_else(MetafieldEntry::absent))
    }

    /// Writes all entries in one `metafieldsSet` call.
    ///
    /// Any `userErrors` fail the whole call. The reserved value and empty
    /// values are rejected before anything is sent.
    pub async fn write(
        &self,
        tenant: &TenantContext,
        entries: &[(&str, PointerValue)],
    ) -> ReconcileResult<()> {
        if entries.is_empty() {
            return Err(ReconcileError::invalid_input("no metafields to write"));
        }

        let metafields = entries
            .iter()
            .map(|(key, value)| {
                Ok(json!({
                    "ownerId": tenant.tenant_id(),
                    "namespace": self.namespace,
                    "key": key,
                    "type": METAFIELD_TYPE,
                    "value": value.to_wire()?,
                }))
            })
            .collect::<ReconcileResult<Vec<_>>>()?;

        tenant
            .mutate(
                WRITE_METAFIELDS,
                json!({ "metafields": metafields }),
                "metafieldsSet",
            )
            .await?;

        tracing::debug!(
            shop = %tenant.domain(),
            namespace = %self.namespace,
            count = entries.len(),
            "Metafields written"
        );
        Ok(())
    }

    /// Deletes `keys` with a fresh [`SchemaAdapter`].
    pub async fn delete(
        &self,
        tenant: &TenantContext,
        keys: &[&str],
    ) -> ReconcileResult<DeleteOutcome> {
        self.delete_with(tenant, &SchemaAdapter::new(), keys).await
    }

    /// Deletes `keys`, stopping at the first tier that succeeds.
    ///
    /// Only a failed sentinel write is returned as an error; earlier tiers
    /// fall through.
    pub async fn delete_with(
        &self,
        tenant: &TenantContext,
        schema: &SchemaAdapter,
        keys: &[&str],
    ) -> ReconcileResult<DeleteOutcome> {
        let keys = dedup(keys);
        if keys.is_empty() {
            return Err(ReconcileError::invalid_input("no metafield keys to delete"));
        }

        let bulk_attempted = match schema.resolve(tenant, "metafieldsDelete").await {
            Ok(capability) => match capability.shape_of(ShapeKind::InputList) {
                Some(shape) => match self.delete_bulk(tenant, &shape, &keys).await {
                    Ok(()) => return Ok(self.deleted(tenant, DeleteTier::Bulk, &keys)),
                    Err(err) => {
                        tracing::warn!(shop = %tenant.domain(), error = %err, "Bulk metafield delete failed");
                        true
                    }
                },
                None => false,
            },
            Err(err) => {
                tracing::warn!(shop = %tenant.domain(), error = %err, "Bulk metafield delete not resolvable");
                false
            }
        };

        match self.read(tenant, &keys).await {
            Ok(entries) => {
                let ids = keys
                    .iter()
                    .filter_map(|key| entries.get(*key).and_then(|e| e.id.clone()))
                    .collect::<Vec<_>>();

                if ids.is_empty() && !bulk_attempted {
                    return Ok(self.deleted(tenant, DeleteTier::NothingToDelete, &keys));
                }
                if !ids.is_empty() && self.delete_per_key(tenant, schema, &ids).await {
                    return Ok(self.deleted(tenant, DeleteTier::PerKey, &keys));
                }
            }
            Err(err) => {
                tracing::warn!(shop = %tenant.domain(), error = %err, "Metafield ids not readable");
            }
        }

        let cleared = keys
            .iter()
            .map(|key| (*key, PointerValue::Cleared))
            .collect::<Vec<_>>();
        self.write(tenant, &cleared).await?;
        Ok(self.deleted(tenant, DeleteTier::Sentinel, &keys))
    }

    async fn delete_bulk(
        &self,
        tenant: &TenantContext,
        shape: &MutationShape,
        keys: &[&str],
    ) -> ReconcileResult<()> {
        let identifiers = keys
            .iter()
            .map(|key| {
                json!({
                    "ownerId": tenant.tenant_id(),
                    "namespace": self.namespace,
                    "key": key,
                })
            })
            .collect::<Vec<_>>();
        let document = shape.document(
            "DeleteMetafields",
            "metafieldsDelete",
            "deletedMetafields { key }\n    userErrors { field message }",
        );
        tenant
            .mutate(&document, shape.bind(None, Value::Array(identifiers)), "metafieldsDelete")
            .await
            .map(|_| ())
    }

    /// Returns `true` when every id was deleted.
    async fn delete_per_key(
        &self,
        tenant: &TenantContext,
        schema: &SchemaAdapter,
        ids: &[String],
    ) -> bool {
        let shape = match schema.resolve(tenant, "metafieldDelete").await {
            Ok(Capability::Supported(shape @ MutationShape::SingleInput { .. })) => shape,
            Ok(_) => return false,
            Err(err) => {
                tracing::warn!(shop = %tenant.domain(), error = %err, "Per-key metafield delete not resolvable");
                return false;
            }
        };
        let document = shape.document(
            "DeleteMetafield",
            "metafieldDelete",
            "deletedId\n    userErrors { field message }",
        );

        for id in ids {
            let variables = shape.bind(None, json!({ "id": id }));
            if let Err(err) = tenant.mutate(&document, variables, "metafieldDelete").await {
                tracing::warn!(shop = %tenant.domain(), metafield = %id, error = %err, "Per-key metafield delete failed");
                return false;
            }
        }
        true
    }

    fn deleted(&self, tenant: &TenantContext, tier: DeleteTier, keys: &[&str]) -> DeleteOutcome {
        tracing::info!(
            shop = %tenant.domain(),
            namespace = %self.namespace,
            tier = %tier,
            keys = ?keys,
            "Metafields deleted"
        );
        DeleteOutcome {
            tier,
            keys: keys.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

fn dedup<'a>(keys: &[&'a str]) -> Vec<&'a str> {
    let mut unique: Vec<&str> = Vec::with_capacity(keys.len());
    for key in keys {
        if !unique.contains(key) {
            unique.push(*key);
        }
    }
    unique
}
