//! Runtime discovery of mutation argument shapes.
//!
//! The Admin API has changed the signatures of several mutations between
//! versions (`productCreate(input:)` became `productCreate(product:)`,
//! `productVariantUpdate` gave way to `productVariantsBulkUpdate`, bulk
//! metafield deletion appeared late). Instead of a version lookup table the
//! adapter introspects the `Mutation` type once per operation and maps each
//! field onto a closed set of [`MutationShape`]s that callers drive with a
//! `match`.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;

use crate::error::ReconcileError;
use crate::tenant::TenantContext;

const MUTATION_INTROSPECTION: &str = r#"query MutationShapes {
  __type(name: "Mutation") {
    fields {
      name
      args {
        name
        type {
          ...TypeRef
        }
      }
    }
  }
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
      }
    }
  }
}"#;

/// Kind of a named GraphQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Enum,
    InputObject,
    Object,
    Other,
}

impl TypeKind {
    fn from_introspection(kind: &str) -> Self {
        match kind {
            "SCALAR" => Self::Scalar,
            "ENUM" => Self::Enum,
            "INPUT_OBJECT" => Self::InputObject,
            "OBJECT" => Self::Object,
            _ => Self::Other,
        }
    }
}

/// A possibly wrapped GraphQL input type, e.g. `[MetafieldIdentifierInput!]!`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named { name: String, kind: TypeKind },
    NonNull(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn named_type(name: impl Into<String>, kind: TypeKind) -> Self {
        Self::Named {
            name: name.into(),
            kind,
        }
    }

    /// The bare named type under every wrapper.
    pub fn named(&self) -> &str {
        match self {
            Self::Named { name, .. } => name,
            Self::NonNull(inner) | Self::List(inner) => inner.named(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Named { kind, .. } => *kind,
            Self::NonNull(inner) | Self::List(inner) => inner.kind(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::NonNull(inner) => inner.is_list(),
            Self::Named { .. } => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, .. } => write!(f, "{name}"),
            Self::NonNull(inner) => write!(f, "{inner}!"),
            Self::List(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// One argument of a mutation field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub ty: TypeRef,
}

impl ArgumentSpec {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    fn is_input_object(&self) -> bool {
        !self.ty.is_list() && self.ty.kind() == TypeKind::InputObject
    }

    fn is_input_list(&self) -> bool {
        self.ty.is_list() && self.ty.kind() == TypeKind::InputObject
    }

    fn is_identifier(&self) -> bool {
        !self.ty.is_list() && self.ty.named() == "ID"
    }
}

/// Discriminant of [`MutationShape`], used by callers to state what they can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    SingleInput,
    IdWithList,
    InputList,
}

/// The argument forms this crate knows how to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationShape {
    /// One composite input object, e.g. `productVariantUpdate(input: ProductVariantInput!)`.
    SingleInput { arg: ArgumentSpec },
    /// An identifier plus a list of inputs, e.g.
    /// `productVariantsBulkUpdate(productId: ID!, variants: [ProductVariantsBulkInput!]!)`.
    IdWithList { id: ArgumentSpec, list: ArgumentSpec },
    /// One list of inputs, e.g. `metafieldsDelete(metafields: [MetafieldIdentifierInput!]!)`.
    InputList { arg: ArgumentSpec },
}

impl MutationShape {
    /// Classifies a field's argument list, or `None` when no known shape fits.
    ///
    /// A required argument the shape would leave unset disqualifies the field.
    pub fn classify(args: &[ArgumentSpec]) -> Option<Self> {
        fn pick<'a>(candidates: impl Iterator<Item = &'a ArgumentSpec> + Clone) -> Option<ArgumentSpec> {
            candidates
                .clone()
                .find(|a| a.ty.is_required())
                .or_else(|| candidates.clone().next())
                .cloned()
        }

        let identifier = args.iter().find(|a| a.is_identifier()).cloned();
        let list = pick(args.iter().filter(|a| a.is_input_list()));
        let single = pick(args.iter().filter(|a| a.is_input_object()));

        let shape = match (identifier, list, single) {
            (Some(id), Some(list), _) => Self::IdWithList { id, list },
            (_, _, Some(arg)) => Self::SingleInput { arg },
            (_, Some(arg), None) => Self::InputList { arg },
            _ => return None,
        };

        let consumed = shape.arguments();
        let unconsumed_required = args
            .iter()
            .any(|a| a.ty.is_required() && !consumed.iter().any(|c| c.name == a.name));
        (!unconsumed_required).then_some(shape)
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::SingleInput { .. } => ShapeKind::SingleInput,
            Self::IdWithList { .. } => ShapeKind::IdWithList,
            Self::InputList { .. } => ShapeKind::InputList,
        }
    }

    fn arguments(&self) -> Vec<&ArgumentSpec> {
        match self {
            Self::SingleInput { arg } | Self::InputList { arg } => vec![arg],
            Self::IdWithList { id, list } => vec![id, list],
        }
    }

    /// Builds a mutation document calling `field` with this shape's arguments.
    ///
    /// Variables are named after the arguments they feed.
    pub fn document(&self, operation: &str, field: &str, selection: &str) -> String {
        let args = self.arguments();
        let declarations = args
            .iter()
            .map(|a| format!("${}: {}", a.name, a.ty))
            .collect::<Vec<_>>()
            .join(", ");
        let bindings = args
            .iter()
            .map(|a| format!("{0}: ${0}", a.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "mutation {operation}({declarations}) {{\n  {field}({bindings}) {{\n    {selection}\n  }}\n}}"
        )
    }

    /// Binds variables for [`MutationShape::document`].
    ///
    /// `id` is only used by [`MutationShape::IdWithList`]; `payload` feeds the
    /// input (or list) argument.
    pub fn bind(&self, id: Option<&str>, payload: Value) -> Value {
        let mut vars = Map::new();
        match self {
            Self::SingleInput { arg } | Self::InputList { arg } => {
                vars.insert(arg.name.clone(), payload);
            }
            Self::IdWithList { id: id_arg, list } => {
                vars.insert(id_arg.name.clone(), json!(id));
                vars.insert(list.name.clone(), payload);
            }
        }
        Value::Object(vars)
    }
}

/// Result of resolving a mutation against the running schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Supported(MutationShape),
    NotSupported,
}

impl Capability {
    /// The shape, if supported and of the expected kind.
    pub fn shape_of(self, kind: ShapeKind) -> Option<MutationShape> {
        match self {
            Self::Supported(shape) if shape.kind() == kind => Some(shape),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct RawType {
    kind: String,
    name: Option<String>,
    #[serde(rename = "ofType")]
    of_type: Option<Box<RawType>>,
}

impl RawType {
    fn into_type_ref(self) -> Option<TypeRef> {
        match self.kind.as_str() {
            "NON_NULL" => Some(TypeRef::NonNull(Box::new((*self.of_type?).into_type_ref()?))),
            "LIST" => Some(TypeRef::List(Box::new((*self.of_type?).into_type_ref()?))),
            kind => Some(TypeRef::named_type(
                self.name?,
                TypeKind::from_introspection(kind),
            )),
        }
    }
}

#[derive(Deserialize)]
struct RawArg {
    name: String,
    #[serde(rename = "type")]
    ty: RawType,
}

#[derive(Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    args: Vec<RawArg>,
}

type Catalog = HashMap<String, Option<Vec<ArgumentSpec>>>;

/// Resolves mutation shapes for one operation.
///
/// The first resolution introspects the schema; later ones reuse the
/// catalog. Create one adapter per operation so tenants never share it.
#[derive(Default)]
pub struct SchemaAdapter {
    catalog: OnceCell<Catalog>,
}

impl SchemaAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `mutation` to a shape this crate can drive.
    pub async fn resolve(
        &self,
        tenant: &TenantContext,
        mutation: &str,
    ) -> Result<Capability, ReconcileError> {
        let catalog = self
            .catalog
            .get_or_try_init(|| Self::introspect(tenant))
            .await?;

        let capability = match catalog.get(mutation) {
            Some(Some(args)) => MutationShape::classify(args)
                .map(Capability::Supported)
                .unwrap_or(Capability::NotSupported),
            // Field exists but an argument type was too deeply wrapped to read.
            Some(None) | None => Capability::NotSupported,
        };

        tracing::debug!(
            shop = %tenant.domain(),
            mutation,
            supported = matches!(capability, Capability::Supported(_)),
            "Mutation shape resolved"
        );
        Ok(capability)
    }

    /// Like [`SchemaAdapter::resolve`] but fails unless the shape is of `kind`.
    pub async fn require(
        &self,
        tenant: &TenantContext,
        mutation: &str,
        kind: ShapeKind,
    ) -> Result<MutationShape, ReconcileError> {
        self.resolve(tenant, mutation)
            .await?
            .shape_of(kind)
            .ok_or_else(|| ReconcileError::schema_capability(mutation))
    }

    async fn introspect(tenant: &TenantContext) -> Result<Catalog, ReconcileError> {
        let data = tenant.query(MUTATION_INTROSPECTION, json!({})).await?;
        let fields = data
            .get("__type")
            .and_then(|t| t.get("fields"))
            .cloned()
            .unwrap_or(Value::Null);

        if fields.is_null() {
            tracing::warn!(
                shop = %tenant.domain(),
                "Mutation type not introspectable; every adaptive mutation is unsupported"
            );
            return Ok(Catalog::new());
        }

        let fields: Vec<RawField> = serde_json::from_value(fields)
            .map_err(|e| ReconcileError::malformed(format!("mutation introspection: {e}")))?;

        Ok(fields
            .into_iter()
            .map(|field| {
                let args = field
                    .args
                    .into_iter()
                    .map(|a| a.ty.into_type_ref().map(|ty| ArgumentSpec::new(a.name, ty)))
                    .collect::<Option<Vec<_>>>();
                (field.name, args)
            })
            .collect())
    }
}
