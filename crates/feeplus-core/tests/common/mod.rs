//! In-memory Admin API used by the integration suites.
//!
//! Keeps just enough state (cart transforms, shop metafields, products and
//! variants, publications) to run the reconciliation flows end to end, and
//! can pretend to be an older or a newer API version.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feeplus_admin::{AdminClient, AdminError, GraphqlResponse, operation_name};
use feeplus_core::TenantContext;
use serde_json::{Value, json};

pub const SHOP_ID: &str = "gid://shopify/Shop/1";
pub const SHOP_DOMAIN: &str = "fees.myshopify.com";

/// Which generation of mutation signatures the fake exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `productCreate(product:)`, bulk variant updates, bulk metafield deletes.
    Modern,
    /// `productCreate(input:)`, `productVariantUpdate`, per-id metafield deletes.
    Legacy,
}

#[derive(Debug, Clone)]
struct Variant {
    id: String,
    title: String,
    price: String,
    options: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Product {
    title: String,
    variants: Vec<Variant>,
    published: Vec<String>,
}

#[derive(Debug, Clone)]
struct Metafield {
    id: String,
    value: String,
}

#[derive(Default)]
struct State {
    next_id: u64,
    cart_transforms: Vec<(String, String)>,
    metafields: HashMap<(String, String), Metafield>,
    products: HashMap<String, Product>,
    product_order: Vec<String>,
    rejections: HashMap<String, String>,
    unavailable: HashSet<String>,
    calls: Vec<String>,
}

impl State {
    fn next(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("gid://shopify/{kind}/{}", self.next_id)
    }

    fn variant(&self, id: &str) -> Option<(&str, &Product, &Variant)> {
        self.product_order.iter().find_map(|pid| {
            let product = self.products.get(pid)?;
            product
                .variants
                .iter()
                .find(|v| v.id == id)
                .map(|v| (pid.as_str(), product, v))
        })
    }
}

pub struct FakeShop {
    flavor: ApiFlavor,
    publications: Vec<(String, String)>,
    state: Mutex<State>,
}

impl FakeShop {
    pub fn new(flavor: ApiFlavor) -> Arc<Self> {
        Arc::new(Self {
            flavor,
            publications: vec![
                ("gid://shopify/Publication/1".into(), "Point of Sale".into()),
                ("gid://shopify/Publication/2".into(), "Online Store".into()),
            ],
            state: Mutex::new(State::default()),
        })
    }

    pub fn tenant(self: &Arc<Self>) -> TenantContext {
        TenantContext::new(SHOP_ID, SHOP_DOMAIN, self.clone())
    }

    /// Makes the named operation answer with a `userErrors` entry.
    pub fn reject(&self, operation: &str, message: &str) {
        self.lock()
            .rejections
            .insert(operation.to_string(), message.to_string());
    }

    /// Makes the named operation fail at the transport level.
    pub fn make_unavailable(&self, operation: &str) {
        self.lock().unavailable.insert(operation.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == operation).count()
    }

    pub fn cart_transform_count(&self) -> usize {
        self.lock().cart_transforms.len()
    }

    pub fn metafield(&self, namespace: &str, key: &str) -> Option<String> {
        self.lock()
            .metafields
            .get(&(namespace.to_string(), key.to_string()))
            .map(|m| m.value.clone())
    }

    pub fn seed_metafield(&self, namespace: &str, key: &str, value: &str) {
        let mut state = self.lock();
        let id = state.next("Metafield");
        state.metafields.insert(
            (namespace.to_string(), key.to_string()),
            Metafield {
                id,
                value: value.to_string(),
            },
        );
    }

    pub fn variant_price(&self, variant_id: &str) -> Option<String> {
        let state = self.lock();
        state.variant(variant_id).map(|(_, _, v)| v.price.clone())
    }

    pub fn is_published(&self, product_id: &str) -> bool {
        self.lock()
            .products
            .get(product_id)
            .is_some_and(|p| !p.published.is_empty())
    }

    pub fn product_count(&self) -> usize {
        self.lock().products.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake shop state")
    }

    fn catalog(&self) -> Value {
        let id = || non_null(named("SCALAR", "ID"));
        let required_list = |name: &str| non_null(list(non_null(named("INPUT_OBJECT", name))));

        let mut fields = vec![
            field(
                "productOptionsCreate",
                vec![arg("productId", id()), arg("options", required_list("OptionCreateInput"))],
            ),
            field(
                "publishablePublish",
                vec![arg("id", id()), arg("input", required_list("PublicationInput"))],
            ),
            field(
                "cartTransformCreate",
                vec![
                    arg("functionHandle", named("SCALAR", "String")),
                    arg("blockOnFailure", named("SCALAR", "Boolean")),
                ],
            ),
        ];
        match self.flavor {
            ApiFlavor::Modern => fields.extend([
                field(
                    "productCreate",
                    vec![arg("product", named("INPUT_OBJECT", "ProductCreateInput"))],
                ),
                field(
                    "productVariantsBulkUpdate",
                    vec![
                        arg("productId", id()),
                        arg("variants", required_list("ProductVariantsBulkInput")),
                    ],
                ),
                field(
                    "metafieldsDelete",
                    vec![arg("metafields", required_list("MetafieldIdentifierInput"))],
                ),
            ]),
            ApiFlavor::Legacy => fields.extend([
                field(
                    "productCreate",
                    vec![arg("input", non_null(named("INPUT_OBJECT", "ProductInput")))],
                ),
                field(
                    "productVariantUpdate",
                    vec![arg("input", non_null(named("INPUT_OBJECT", "ProductVariantInput")))],
                ),
                field(
                    "metafieldDelete",
                    vec![arg("input", non_null(named("INPUT_OBJECT", "MetafieldDeleteInput")))],
                ),
            ]),
        }
        json!({ "__type": { "fields": fields } })
    }

    fn dispatch(&self, operation: &str, vars: &Value) -> Value {
        let mut state = self.lock();
        state.calls.push(operation.to_string());

        if let Some(message) = state.rejections.get(operation).cloned() {
            let field = mutation_field(operation);
            return json!({ field: { "userErrors": [{ "field": null, "message": message }] } });
        }

        match operation {
            "ShopIdentity" => json!({ "shop": { "id": SHOP_ID, "myshopifyDomain": SHOP_DOMAIN } }),
            "MutationShapes" => self.catalog(),
            "EnsureCartTransform" => {
                let handle = vars["handle"].as_str().unwrap_or_default().to_string();
                if state.cart_transforms.iter().any(|(_, h)| *h == handle) {
                    return json!({ "cartTransformCreate": { "cartTransform": null, "userErrors": [
                        { "field": ["functionHandle"], "message": "Could not enable cart transform because it is already registered" }
                    ] } });
                }
                let id = state.next("CartTransform");
                state.cart_transforms.push((id.clone(), handle));
                json!({ "cartTransformCreate": { "cartTransform": { "id": id }, "userErrors": [] } })
            }
            "ListCartTransforms" => {
                let first = vars["first"].as_u64().unwrap_or(50) as usize;
                let nodes = state
                    .cart_transforms
                    .iter()
                    .take(first)
                    .map(|(id, _)| json!({ "id": id }))
                    .collect::<Vec<_>>();
                json!({ "cartTransforms": { "nodes": nodes } })
            }
            "ReadMetafields" => {
                let namespace = vars["namespace"].as_str().unwrap_or_default().to_string();
                let mut shop = serde_json::Map::new();
                for i in 0.. {
                    let Some(key) = vars[format!("k{i}")].as_str() else {
                        break;
                    };
                    let entry = state
                        .metafields
                        .get(&(namespace.clone(), key.to_string()))
                        .map(|m| json!({ "id": m.id, "value": m.value }))
                        .unwrap_or(Value::Null);
                    shop.insert(format!("m{i}"), entry);
                }
                json!({ "shop": shop })
            }
            "WriteMetafields" => {
                for m in vars["metafields"].as_array().cloned().unwrap_or_default() {
                    let key = (
                        m["namespace"].as_str().unwrap_or_default().to_string(),
                        m["key"].as_str().unwrap_or_default().to_string(),
                    );
                    let value = m["value"].as_str().unwrap_or_default().to_string();
                    let existing = state.metafields.get(&key).map(|m| m.id.clone());
                    let id = match existing {
                        Some(id) => id,
                        None => state.next("Metafield"),
                    };
                    state.metafields.insert(key, Metafield { id, value });
                }
                json!({ "metafieldsSet": { "metafields": [], "userErrors": [] } })
            }
            "DeleteMetafields" => {
                for m in vars["metafields"].as_array().cloned().unwrap_or_default() {
                    state.metafields.remove(&(
                        m["namespace"].as_str().unwrap_or_default().to_string(),
                        m["key"].as_str().unwrap_or_default().to_string(),
                    ));
                }
                json!({ "metafieldsDelete": { "deletedMetafields": [], "userErrors": [] } })
            }
            "DeleteMetafield" => {
                let id = vars["input"]["id"].as_str().unwrap_or_default();
                state.metafields.retain(|_, m| m.id != id);
                json!({ "metafieldDelete": { "deletedId": id, "userErrors": [] } })
            }
            "CreateFeeProduct" => {
                let input = if vars["product"].is_object() {
                    &vars["product"]
                } else {
                    &vars["input"]
                };
                let product_id = state.next("Product");
                let variant_id = state.next("ProductVariant");
                state.products.insert(
                    product_id.clone(),
                    Product {
                        title: input["title"].as_str().unwrap_or_default().to_string(),
                        variants: vec![Variant {
                            id: variant_id,
                            title: "Default Title".into(),
                            price: "0.00".into(),
                            options: vec![("Title".into(), "Default Title".into())],
                        }],
                        published: Vec::new(),
                    },
                );
                state.product_order.push(product_id.clone());
                json!({ "productCreate": { "product": { "id": product_id }, "userErrors": [] } })
            }
            "CreateFeeOption" => {
                let product_id = vars["productId"].as_str().unwrap_or_default();
                let option = &vars["options"][0];
                let name = option["name"].as_str().unwrap_or_default().to_string();
                let value = option["values"][0]["name"].as_str().unwrap_or_default().to_string();
                let Some(product) = state.products.get_mut(product_id) else {
                    return json!({ "productOptionsCreate": { "product": null, "userErrors": [
                        { "field": ["productId"], "message": "Product does not exist" }
                    ] } });
                };
                for variant in &mut product.variants {
                    variant.title = value.clone();
                    variant.options = vec![(name.clone(), value.clone())];
                }
                json!({ "productOptionsCreate": { "product": { "id": product_id }, "userErrors": [] } })
            }
            "FeeProductVariants" => {
                let product_id = vars["id"].as_str().unwrap_or_default();
                match state.products.get(product_id) {
                    Some(product) => {
                        let nodes = product
                            .variants
                            .iter()
                            .map(|v| {
                                let options = v
                                    .options
                                    .iter()
                                    .map(|(name, value)| json!({ "name": name, "value": value }))
                                    .collect::<Vec<_>>();
                                json!({ "id": v.id, "title": v.title, "price": v.price, "selectedOptions": options })
                            })
                            .collect::<Vec<_>>();
                        json!({ "product": { "variants": { "nodes": nodes } } })
                    }
                    None => json!({ "product": null }),
                }
            }
            "SetFeeVariantPrice" => {
                let input = &vars["input"];
                set_price(&mut state, input["id"].as_str(), input["price"].as_str());
                json!({ "productVariantUpdate": { "productVariant": { "id": input["id"] }, "userErrors": [] } })
            }
            "SetFeeVariantPrices" => {
                for v in vars["variants"].as_array().cloned().unwrap_or_default() {
                    set_price(&mut state, v["id"].as_str(), v["price"].as_str());
                }
                json!({ "productVariantsBulkUpdate": { "productVariants": [], "userErrors": [] } })
            }
            "FeePublications" => {
                let nodes = self
                    .publications
                    .iter()
                    .map(|(id, name)| json!({ "id": id, "name": name }))
                    .collect::<Vec<_>>();
                json!({ "publications": { "nodes": nodes } })
            }
            "PublishFeeProduct" => {
                let product_id = vars["id"].as_str().unwrap_or_default();
                let publication = vars["input"][0]["publicationId"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                if let Some(product) = state.products.get_mut(product_id) {
                    product.published.push(publication);
                }
                json!({ "publishablePublish": { "userErrors": [] } })
            }
            "FeeVariantNode" => {
                let id = vars["id"].as_str().unwrap_or_default();
                match state.variant(id) {
                    Some((product_id, product, variant)) => json!({ "node": {
                        "__typename": "ProductVariant",
                        "id": variant.id,
                        "title": variant.title,
                        "price": variant.price,
                        "product": { "id": product_id, "title": product.title }
                    } }),
                    None => json!({ "node": null }),
                }
            }
            other => json!({ "unknownOperation": other }),
        }
    }
}

fn set_price(state: &mut State, variant_id: Option<&str>, price: Option<&str>) {
    let (Some(variant_id), Some(price)) = (variant_id, price) else {
        return;
    };
    for product in state.products.values_mut() {
        for variant in &mut product.variants {
            if variant.id == variant_id {
                variant.price = price.to_string();
            }
        }
    }
}

fn mutation_field(operation: &str) -> &'static str {
    match operation {
        "EnsureCartTransform" => "cartTransformCreate",
        "WriteMetafields" => "metafieldsSet",
        "DeleteMetafields" => "metafieldsDelete",
        "DeleteMetafield" => "metafieldDelete",
        "CreateFeeProduct" => "productCreate",
        "CreateFeeOption" => "productOptionsCreate",
        "SetFeeVariantPrice" => "productVariantUpdate",
        "SetFeeVariantPrices" => "productVariantsBulkUpdate",
        "PublishFeeProduct" => "publishablePublish",
        _ => "unknown",
    }
}

#[async_trait]
impl AdminClient for FakeShop {
    async fn execute(&self, document: &str, variables: Value) -> Result<GraphqlResponse, AdminError> {
        let operation = operation_name(document).unwrap_or("anonymous").to_string();
        if self.lock().unavailable.contains(&operation) {
            self.lock().calls.push(operation.clone());
            return Err(AdminError::network(format!("{operation}: connection reset")));
        }
        Ok(GraphqlResponse::from_data(self.dispatch(&operation, &variables)))
    }
}

fn named(kind: &str, name: &str) -> Value {
    json!({ "kind": kind, "name": name, "ofType": null })
}

fn non_null(inner: Value) -> Value {
    json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
}

fn list(inner: Value) -> Value {
    json!({ "kind": "LIST", "name": null, "ofType": inner })
}

fn arg(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty })
}

fn field(name: &str, args: Vec<Value>) -> Value {
    json!({ "name": name, "args": args })
}
