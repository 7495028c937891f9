#![deny(missing_docs)]

//! # Document Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to the OpenAPI 3.x objects the generator reads; everything
//! else in the document is ignored.
//!
//! Note: Shims do not derive `Debug` because `utoipa::RefOr` does not implement `Debug`.

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::openapi::RefOr;

/// A security requirement: provider name to scopes. Providers iterate in name order.
pub type ShimSecurityRequirement = BTreeMap<String, Vec<String>>;

/// The root document.
#[derive(Deserialize, Clone, Default)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.0.3").
    pub openapi: Option<String>,

    /// Swagger version, only read to reject 2.0 documents.
    pub swagger: Option<String>,

    /// The `$self` keyword (OAS 3.2+).
    /// Identifies this document so absolute references back into it count as local.
    #[serde(rename = "$self")]
    pub self_uri: Option<String>,

    /// Path items keyed by path template.
    #[serde(default)]
    pub paths: ShimPaths,

    /// Reusable components.
    #[serde(default)]
    pub components: ShimComponents,

    /// Document-level security requirements.
    pub security: Option<Vec<ShimSecurityRequirement>>,
}

/// Represents the Paths Object, skipping specification extensions.
#[derive(Clone, Default)]
pub struct ShimPaths {
    /// Parsed path items keyed by path template, in sorted order.
    pub items: BTreeMap<String, ShimPathItem>,
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        let mut items = BTreeMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                continue;
            }
            let path_item = serde_json::from_value::<ShimPathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items })
    }
}

/// The Components Object.
#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimComponents {
    /// Named schemas.
    #[serde(default)]
    pub schemas: IndexMap<String, RefOr<ShimSchema>>,
    /// Named parameters.
    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<ShimParameter>>,
    /// Named request bodies.
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<ShimRequestBody>>,
    /// Named responses.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<ShimResponse>>,
    /// Named headers.
    #[serde(default)]
    pub headers: IndexMap<String, RefOr<ShimHeader>>,
    /// Security schemes; only the names matter here.
    #[serde(default)]
    pub security_schemes: IndexMap<String, Value>,
}

/// A Path Item.
#[derive(Deserialize, Clone, Default)]
pub struct ShimPathItem {
    /// Parameters shared by every operation of the path.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// GET operation.
    pub get: Option<ShimOperation>,
    /// PUT operation.
    pub put: Option<ShimOperation>,
    /// POST operation.
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    pub trace: Option<ShimOperation>,
}

impl ShimPathItem {
    /// Declared operations keyed by upper-case method, in method-name order.
    pub fn operations(&self) -> Vec<(&'static str, &ShimOperation)> {
        let slots = [
            ("DELETE", &self.delete),
            ("GET", &self.get),
            ("HEAD", &self.head),
            ("OPTIONS", &self.options),
            ("PATCH", &self.patch),
            ("POST", &self.post),
            ("PUT", &self.put),
            ("TRACE", &self.trace),
        ];
        slots
            .into_iter()
            .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
            .collect()
    }

    /// Mutable access to every operation slot.
    pub fn operation_slots_mut(&mut self) -> [&mut Option<ShimOperation>; 8] {
        [
            &mut self.delete,
            &mut self.get,
            &mut self.head,
            &mut self.options,
            &mut self.patch,
            &mut self.post,
            &mut self.put,
            &mut self.trace,
        ]
    }
}

/// An Operation.
#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimOperation {
    /// Declared operation id.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body.
    pub request_body: Option<RefOr<ShimRequestBody>>,
    /// Responses keyed by status code or `default`.
    #[serde(default)]
    pub responses: BTreeMap<String, RefOr<ShimResponse>>,
    /// Operation-level security. `Some(vec![])` clears document-level security.
    pub security: Option<Vec<ShimSecurityRequirement>>,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
}

/// A Parameter.
#[derive(Deserialize, Clone, Default)]
pub struct ShimParameter {
    /// Parameter name.
    pub name: String,
    /// Location (`path`, `query`, `header`, `cookie`).
    #[serde(rename = "in")]
    pub location: String,
    /// Description.
    pub description: Option<String>,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Deprecation flag.
    #[serde(default)]
    pub deprecated: bool,
    /// Serialization style.
    pub style: Option<String>,
    /// Explode flag.
    pub explode: Option<bool>,
    /// Parameter schema.
    pub schema: Option<RefOr<ShimSchema>>,
    /// Alternative to `schema`: exactly one media type.
    pub content: Option<IndexMap<String, ShimMediaType>>,
}

/// A Request Body.
#[derive(Deserialize, Clone, Default)]
pub struct ShimRequestBody {
    /// Description.
    pub description: Option<String>,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    #[serde(default)]
    pub content: BTreeMap<String, ShimMediaType>,
}

/// A Response.
#[derive(Deserialize, Clone, Default)]
pub struct ShimResponse {
    /// Description.
    pub description: Option<String>,
    /// Content by media type.
    #[serde(default)]
    pub content: BTreeMap<String, ShimMediaType>,
    /// Headers by name.
    #[serde(default)]
    pub headers: BTreeMap<String, RefOr<ShimHeader>>,
}

/// A Header.
#[derive(Deserialize, Clone, Default)]
pub struct ShimHeader {
    /// Description.
    pub description: Option<String>,
    /// Required flag.
    #[serde(default)]
    pub required: bool,
    /// Header schema.
    pub schema: Option<RefOr<ShimSchema>>,
}

/// A Media Type.
#[derive(Deserialize, Clone, Default)]
pub struct ShimMediaType {
    /// Payload schema.
    pub schema: Option<RefOr<ShimSchema>>,
}

/// The `type` keyword: one name, or a list of names (OAS 3.1).
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ShimSchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

/// The `additionalProperties` keyword.
#[derive(Deserialize, Clone)]
#[serde(untagged)]
pub enum ShimAdditionalProperties {
    /// `true` (free-form) or `false` (denied).
    Bool(bool),
    /// A schema for the values.
    Schema(Box<RefOr<ShimSchema>>),
}

/// The Discriminator Object.
#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimDiscriminator {
    /// Name of the tag property.
    pub property_name: String,
    /// Tag value to `$ref`.
    #[serde(default)]
    pub mapping: IndexMap<String, String>,
}

/// A Schema Object.
#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimSchema {
    /// `type`
    #[serde(rename = "type")]
    pub schema_type: Option<ShimSchemaType>,
    /// `format`
    pub format: Option<String>,
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `properties`, in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, RefOr<ShimSchema>>,
    /// `required`
    #[serde(default)]
    pub required: Vec<String>,
    /// `items`
    pub items: Option<Box<RefOr<ShimSchema>>>,
    /// `additionalProperties`
    pub additional_properties: Option<ShimAdditionalProperties>,
    /// `enum`
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    /// `allOf`
    #[serde(default)]
    pub all_of: Vec<RefOr<ShimSchema>>,
    /// `oneOf`
    #[serde(default)]
    pub one_of: Vec<RefOr<ShimSchema>>,
    /// `anyOf`
    #[serde(default)]
    pub any_of: Vec<RefOr<ShimSchema>>,
    /// `not`
    pub not: Option<Box<RefOr<ShimSchema>>>,
    /// `discriminator`
    pub discriminator: Option<ShimDiscriminator>,
    /// `nullable` (OAS 3.0)
    #[serde(default)]
    pub nullable: bool,
    /// `readOnly`
    #[serde(default)]
    pub read_only: bool,
    /// `writeOnly`
    #[serde(default)]
    pub write_only: bool,
    /// `deprecated`
    #[serde(default)]
    pub deprecated: bool,
    /// Remaining keywords, including `x-` extensions.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl ShimSchema {
    /// Declared type names other than `null`, and whether `null` was among them.
    pub fn types(&self) -> (Vec<&str>, bool) {
        let names: Vec<&str> = match &self.schema_type {
            None => Vec::new(),
            Some(ShimSchemaType::Single(t)) => vec![t.as_str()],
            Some(ShimSchemaType::Multiple(ts)) => ts.iter().map(String::as_str).collect(),
        };
        let has_null = names.contains(&"null");
        (names.into_iter().filter(|t| *t != "null").collect(), has_null)
    }

    /// `nullable: true`, `null` in `type`, or `null` in `enum`.
    pub fn is_nullable(&self) -> bool {
        self.nullable
            || self.types().1
            || self
                .enum_values
                .as_ref()
                .is_some_and(|values| values.iter().any(Value::is_null))
    }

    /// Whether the schema is exactly `{type: null}`.
    pub fn is_null_type(&self) -> bool {
        let (types, has_null) = self.types();
        has_null && types.is_empty() && self.properties.is_empty() && self.all_of.is_empty()
    }

    /// A specification extension (`x-...`).
    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }

    /// A string-valued extension.
    pub fn extension_str(&self, key: &str) -> Option<&str> {
        self.extension(key).and_then(Value::as_str)
    }

    /// A boolean-valued extension.
    pub fn extension_bool(&self, key: &str) -> Option<bool> {
        self.extension(key).and_then(Value::as_bool)
    }

    /// The `x-order` extension.
    pub fn x_order(&self) -> Option<i64> {
        self.extension("x-order").and_then(Value::as_i64)
    }
}

/// Parses a YAML or JSON OpenAPI 3.x document.
pub fn load_document(text: &str) -> AppResult<ShimOpenApi> {
    let doc: ShimOpenApi = serde_yaml::from_str(text)
        .map_err(|e| AppError::InvalidDocument(format!("Failed to parse OpenAPI document: {}", e)))?;

    match (&doc.openapi, &doc.swagger) {
        (Some(version), _) if version.starts_with("3.") => Ok(doc),
        (Some(version), _) => Err(AppError::InvalidDocument(format!(
            "Unsupported OpenAPI version '{}'",
            version
        ))),
        (None, Some(_)) => Err(AppError::InvalidDocument(
            "Swagger 2.0 documents are not supported".into(),
        )),
        (None, None) => Err(AppError::InvalidDocument(
            "Missing 'openapi' version field".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_minimal_document() {
        let yaml = r#"
openapi: 3.0.3
info: {title: T, version: "1"}
paths:
  x-internal: true
  /pets:
    get:
      operationId: listPets
      responses:
        '200': {description: OK}
components:
  schemas:
    Zebra: {type: string}
    Apple: {type: integer}
"#;
        let doc = load_document(yaml).unwrap();
        assert_eq!(doc.paths.items.len(), 1);
        let ops = doc.paths.items["/pets"].operations();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].0, "GET");
        let names: Vec<&String> = doc.components.schemas.keys().collect();
        assert_eq!(names, vec!["Zebra", "Apple"]);
    }

    #[test]
    fn test_rejects_swagger_two() {
        let err = match load_document("swagger: '2.0'\npaths: {}\n") {
            Ok(_) => panic!("expected an error"),
            Err(e) => e,
        };
        assert!(matches!(err, AppError::InvalidDocument(_)));
    }

    #[test]
    fn test_rejects_missing_version() {
        assert!(load_document("paths: {}\n").is_err());
    }

    #[test]
    fn test_schema_shapes() {
        let yaml = r#"
type: [string, "null"]
x-order: 3
x-rust-type: MyString
additionalProperties: false
"#;
        let schema: ShimSchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.types(), (vec!["string"], true));
        assert!(schema.is_nullable());
        assert_eq!(schema.x_order(), Some(3));
        assert_eq!(schema.extension_str("x-rust-type"), Some("MyString"));
        assert!(matches!(
            schema.additional_properties,
            Some(ShimAdditionalProperties::Bool(false))
        ));
    }

    #[test]
    fn test_ref_or_schema_properties() {
        let yaml = r#"
type: object
properties:
  owner:
    $ref: '#/components/schemas/Person'
  tags:
    type: array
    items: {type: string}
"#;
        let schema: ShimSchema = serde_yaml::from_str(yaml).unwrap();
        match &schema.properties["owner"] {
            RefOr::Ref(r) => assert_eq!(r.ref_location, "#/components/schemas/Person"),
            RefOr::T(_) => panic!("expected a reference"),
        }
        assert!(matches!(&schema.properties["tags"], RefOr::T(_)));
    }

    #[test]
    fn test_enum_null_is_nullable() {
        let schema: ShimSchema = serde_yaml::from_str("enum: [a, b, null]").unwrap();
        assert!(schema.is_nullable());
    }
}
