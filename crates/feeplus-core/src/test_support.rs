//! Scripted Admin API client and introspection builders for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feeplus_admin::{AdminClient, AdminError, GraphqlResponse, operation_name};
use serde_json::{Value, json};

type Scripted = Result<GraphqlResponse, AdminError>;

/// Answers each operation name from a queue of canned responses.
#[derive(Default)]
pub struct ScriptedClient {
    responses: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, operation: &str, data: Value) {
        self.push(operation, Ok(GraphqlResponse::from_data(data)));
    }

    pub fn on_error(&self, operation: &str, err: AdminError) {
        self.push(operation, Err(err));
    }

    pub fn on_graphql_errors(&self, operation: &str, messages: &[&str]) {
        self.push(
            operation,
            Ok(GraphqlResponse::from_errors(messages.iter().copied())),
        );
    }

    fn push(&self, operation: &str, response: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .entry(operation.to_string())
            .or_default()
            .push_back(response);
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(op, _)| op.clone())
            .collect()
    }

    /// Variables of every call to `operation`, in call order.
    pub fn variables(&self, operation: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, vars)| vars.clone())
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.variables(operation).len()
    }
}

#[async_trait]
impl AdminClient for ScriptedClient {
    async fn execute(&self, document: &str, variables: Value) -> Result<GraphqlResponse, AdminError> {
        let operation = operation_name(document).unwrap_or("anonymous").to_string();
        self.calls
            .lock()
            .unwrap()
            .push((operation.clone(), variables));
        self.responses
            .lock()
            .unwrap()
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(AdminError::GraphQL(vec![format!("unscripted operation {operation}")])))
    }
}

pub fn named(kind: &str, name: &str) -> Value {
    json!({ "kind": kind, "name": name, "ofType": null })
}

pub fn input(name: &str) -> Value {
    named("INPUT_OBJECT", name)
}

pub fn scalar(name: &str) -> Value {
    named("SCALAR", name)
}

pub fn non_null(inner: Value) -> Value {
    json!({ "kind": "NON_NULL", "name": null, "ofType": inner })
}

pub fn list(inner: Value) -> Value {
    json!({ "kind": "LIST", "name": null, "ofType": inner })
}

pub fn arg(name: &str, ty: Value) -> Value {
    json!({ "name": name, "type": ty })
}

pub fn field(name: &str, args: Vec<Value>) -> Value {
    json!({ "name": name, "args": args })
}

/// `data` for the mutation introspection query.
pub fn mutation_catalog(fields: Vec<Value>) -> Value {
    json!({ "__type": { "fields": fields } })
}

/// Mutation fields as shipped by recent API versions.
pub fn modern_catalog() -> Value {
    mutation_catalog(vec![
        field(
            "productCreate",
            vec![
                arg("product", input("ProductCreateInput")),
                arg("media", list(non_null(input("CreateMediaInput")))),
            ],
        ),
        field(
            "productOptionsCreate",
            vec![
                arg("productId", non_null(scalar("ID"))),
                arg("options", non_null(list(non_null(input("OptionCreateInput"))))),
                arg("variantStrategy", named("ENUM", "ProductOptionCreateVariantStrategy")),
            ],
        ),
        field(
            "productVariantsBulkUpdate",
            vec![
                arg("productId", non_null(scalar("ID"))),
                arg("media", list(non_null(input("CreateMediaInput")))),
                arg(
                    "variants",
                    non_null(list(non_null(input("ProductVariantsBulkInput")))),
                ),
                arg("allowPartialUpdates", scalar("Boolean")),
            ],
        ),
        field(
            "publishablePublish",
            vec![
                arg("id", non_null(scalar("ID"))),
                arg("input", non_null(list(non_null(input("PublicationInput"))))),
            ],
        ),
        field(
            "metafieldsDelete",
            vec![arg(
                "metafields",
                non_null(list(non_null(input("MetafieldIdentifierInput")))),
            )],
        ),
    ])
}
