//! Remote calls behind each saga step.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::ReconcileResult;
use crate::error::ReconcileError;
use crate::schema::{Capability, MutationShape, SchemaAdapter, ShapeKind};
use crate::tenant::TenantContext;

use super::types::{PublicationState, VariantSummary};

const USER_ERRORS: &str = "userErrors { field message }";

const PRODUCT_VARIANTS: &str = r#"query FeeProductVariants($id: ID!, $first: Int!) {
  product(id: $id) {
    variants(first: $first) {
      nodes {
        id
        title
        selectedOptions {
          name
          value
        }
      }
    }
  }
}"#;

const PUBLICATIONS: &str = r#"query FeePublications($first: Int!) {
  publications(first: $first) {
    nodes {
      id
      name
    }
  }
}"#;

const VARIANT_NODE: &str = r#"query FeeVariantNode($id: ID!) {
  node(id: $id) {
    __typename
    ... on ProductVariant {
      id
      title
      price
      product {
        id
        title
      }
    }
  }
}"#;

#[derive(Deserialize)]
struct SelectedOption {
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selected_options: Vec<SelectedOption>,
}

/// A variant picked from the product's variant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FoundVariant {
    pub id: String,
    pub title: String,
}

fn selection(payload: &str) -> String {
    format!("{payload}\n    {USER_ERRORS}")
}

pub(crate) async fn create_product(
    tenant: &TenantContext,
    schema: &SchemaAdapter,
    title: &str,
) -> ReconcileResult<String> {
    let shape = schema
        .require(tenant, "productCreate", ShapeKind::SingleInput)
        .await?;
    let document = shape.document("CreateFeeProduct", "productCreate", &selection("product { id }"));
    let variables = shape.bind(None, json!({ "title": title, "status": "ACTIVE" }));

    let payload = tenant.mutate(&document, variables, "productCreate").await?;
    payload["product"]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ReconcileError::malformed("productCreate returned no product id"))
}

pub(crate) async fn create_option(
    tenant: &TenantContext,
    schema: &SchemaAdapter,
    product_id: &str,
    option_name: &str,
    label: &str,
) -> ReconcileResult<()> {
    let shape = schema
        .require(tenant, "productOptionsCreate", ShapeKind::IdWithList)
        .await?;
    let document = shape.document(
        "CreateFeeOption",
        "productOptionsCreate",
        &selection("product { id }"),
    );
    let variables = shape.bind(
        Some(product_id),
        json!([{ "name": option_name, "values": [{ "name": label }] }]),
    );

    tenant
        .mutate(&document, variables, "productOptionsCreate")
        .await
        .map(|_| ())
}

/// Picks the variant carrying `label`: exact option value first, then a
/// case-insensitive title match.
pub(crate) async fn find_variant(
    tenant: &TenantContext,
    product_id: &str,
    label: &str,
    page_size: u32,
) -> ReconcileResult<FoundVariant> {
    let data = tenant
        .query(PRODUCT_VARIANTS, json!({ "id": product_id, "first": page_size }))
        .await?;
    let product = &data["product"];
    if product.is_null() {
        return Err(ReconcileError::not_found("Product", product_id));
    }
    let nodes: Vec<VariantNode> = serde_json::from_value(product["variants"]["nodes"].clone())
        .map_err(|e| ReconcileError::malformed(format!("product variants: {e}")))?;

    let by_option = nodes
        .iter()
        .find(|v| v.selected_options.iter().any(|o| o.value == label));
    let wanted = label.to_lowercase();
    let by_title = || nodes.iter().find(|v| v.title.to_lowercase() == wanted);

    by_option
        .or_else(by_title)
        .map(|v| FoundVariant {
            id: v.id.clone(),
            title: v.title.clone(),
        })
        .ok_or_else(|| {
            ReconcileError::not_found("ProductVariant", format!("`{label}` on {product_id}"))
        })
}

/// Sets the variant price with whichever mutation the API offers.
///
/// Returns the name of the mutation used.
pub(crate) async fn set_price(
    tenant: &TenantContext,
    schema: &SchemaAdapter,
    product_id: &str,
    variant_id: &str,
    price: &str,
) -> ReconcileResult<&'static str> {
    if let Capability::Supported(shape @ MutationShape::SingleInput { .. }) =
        schema.resolve(tenant, "productVariantUpdate").await?
    {
        let document = shape.document(
            "SetFeeVariantPrice",
            "productVariantUpdate",
            &selection("productVariant { id price }"),
        );
        let variables = shape.bind(None, json!({ "id": variant_id, "price": price }));
        tenant
            .mutate(&document, variables, "productVariantUpdate")
            .await?;
        return Ok("productVariantUpdate");
    }

    let Some(shape) = schema
        .resolve(tenant, "productVariantsBulkUpdate")
        .await?
        .shape_of(ShapeKind::IdWithList)
    else {
        return Err(ReconcileError::schema_capability(
            "productVariantUpdate | productVariantsBulkUpdate",
        ));
    };
    let document = shape.document(
        "SetFeeVariantPrices",
        "productVariantsBulkUpdate",
        &selection("productVariants { id price }"),
    );
    let variables = shape.bind(
        Some(product_id),
        json!([{ "id": variant_id, "price": price }]),
    );
    tenant
        .mutate(&document, variables, "productVariantsBulkUpdate")
        .await?;
    Ok("productVariantsBulkUpdate")
}

/// Finds the first publication whose name contains `channel`.
pub(crate) async fn find_publication(
    tenant: &TenantContext,
    channel: &str,
    page_size: u32,
) -> ReconcileResult<Option<String>> {
    let data = tenant
        .query(PUBLICATIONS, json!({ "first": page_size }))
        .await?;
    let channel = channel.to_lowercase();
    Ok(data["publications"]["nodes"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&channel))
        })
        .and_then(|p| p["id"].as_str())
        .map(str::to_string))
}

pub(crate) async fn publish(
    tenant: &TenantContext,
    schema: &SchemaAdapter,
    product_id: &str,
    publication_id: &str,
) -> ReconcileResult<PublicationState> {
    let shape = schema
        .require(tenant, "publishablePublish", ShapeKind::IdWithList)
        .await?;
    let document = shape.document("PublishFeeProduct", "publishablePublish", USER_ERRORS);
    let variables = shape.bind(
        Some(product_id),
        json!([{ "publicationId": publication_id }]),
    );
    tenant
        .mutate(&document, variables, "publishablePublish")
        .await?;
    Ok(PublicationState::Published {
        publication_id: publication_id.to_string(),
    })
}

/// Resolves a variant GID; `None` when nothing (or not a variant) is there.
pub(crate) async fn lookup_variant(
    tenant: &TenantContext,
    variant_id: &str,
) -> ReconcileResult<Option<VariantSummary>> {
    let data = tenant.query(VARIANT_NODE, json!({ "id": variant_id })).await?;
    let node = &data["node"];
    if node["__typename"].as_str() != Some("ProductVariant") {
        return Ok(None);
    }

    let text = |v: &Value| v.as_str().map(str::to_string);
    let (Some(id), Some(product_id)) = (text(&node["id"]), text(&node["product"]["id"])) else {
        return Err(ReconcileError::malformed("variant node without id or product"));
    };
    Ok(Some(VariantSummary {
        id,
        title: text(&node["title"]).unwrap_or_default(),
        price: text(&node["price"]),
        product_id,
        product_title: text(&node["product"]["title"]),
    }))
}
