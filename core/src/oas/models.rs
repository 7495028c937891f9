#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Definition of the Intermediate Representation (IR) produced by the generator: named
//! types, their structural schemas, and operation descriptions.
//!
//! These structs carry resolved data from the document into the rendering strategies.

use crate::config::Configuration;
use crate::error::{AppError, AppResult};
use crate::oas::naming::{to_comment, EnumValue};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The structural kind of a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    /// A scalar or opaque type (`i32`, `String`, `serde_json::Value`).
    Primitive,
    /// An object with named properties.
    Object,
    /// A string-keyed map (`HashMap<String, T>`).
    Map,
    /// A list (`Vec<T>`).
    Array,
    /// A closed set of values.
    Enum,
    /// `oneOf` / `anyOf`.
    Union,
    /// A use of another named type.
    Reference,
    /// The result of an `allOf`.
    MergedObject,
}

/// Discriminator metadata of a union, kept as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discriminator {
    /// Name of the tag property.
    pub property_name: String,
    /// Tag value to raw `$ref`.
    pub mapping: IndexMap<String, String>,
}

/// A resolved schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    /// Structural kind.
    pub kind: SchemaKind,
    /// Type expression. For named kinds (object, union, merged object) this is the
    /// type's own name once registered; for enums it is the underlying primitive.
    pub target_type: String,
    /// Name of the referenced type when this schema is a use of a named type.
    pub ref_type: Option<String>,
    /// Object properties in output order.
    pub properties: Vec<Property>,
    /// Value schema of `additionalProperties`.
    pub additional_properties: Option<Box<Schema>>,
    /// `additionalProperties: false`.
    pub deny_additional_properties: bool,
    /// Array item schema.
    pub items: Option<Box<Schema>>,
    /// Enum values.
    pub enum_values: Vec<EnumValue>,
    /// Union branches.
    pub variants: Vec<Schema>,
    /// Union discriminator.
    pub discriminator: Option<Discriminator>,
    /// Types a renderer embeds whole, by name (`#[serde(flatten)]` style).
    pub embedded: Vec<String>,
    /// Types whose fields were already copied into `properties`.
    pub composed_from: Vec<String>,
    /// Accepts `null`.
    pub nullable: bool,
    /// `readOnly`.
    pub read_only: bool,
    /// `writeOnly`.
    pub write_only: bool,
    /// Never wrap in `Option`.
    pub skip_optional_wrapper: bool,
    /// The reference closes a cycle and needs `Box`.
    pub indirect: bool,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Documentation.
    pub description: Option<String>,
}

impl Schema {
    fn blank(kind: SchemaKind, target_type: impl Into<String>) -> Self {
        Self {
            kind,
            target_type: target_type.into(),
            ref_type: None,
            properties: Vec::new(),
            additional_properties: None,
            deny_additional_properties: false,
            items: None,
            enum_values: Vec::new(),
            variants: Vec::new(),
            discriminator: None,
            embedded: Vec::new(),
            composed_from: Vec::new(),
            nullable: false,
            read_only: false,
            write_only: false,
            skip_optional_wrapper: false,
            indirect: false,
            deprecated: false,
            description: None,
        }
    }

    /// A scalar or opaque type.
    pub fn primitive(target_type: impl Into<String>) -> Self {
        Self::blank(SchemaKind::Primitive, target_type)
    }

    /// An untyped value.
    pub fn any() -> Self {
        Self::primitive("serde_json::Value")
    }

    /// A use of the named type `name`.
    pub fn reference(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut schema = Self::blank(SchemaKind::Reference, name.clone());
        schema.ref_type = Some(name);
        schema
    }

    /// An object with the given properties; its name is filled in on registration.
    pub fn object(properties: Vec<Property>) -> Self {
        let mut schema = Self::blank(SchemaKind::Object, "");
        schema.properties = properties;
        schema
    }

    /// A map whose values follow `value`.
    pub fn map(value: Option<Schema>) -> Self {
        match value {
            Some(value) => {
                let mut schema = Self::blank(
                    SchemaKind::Map,
                    format!("HashMap<String, {}>", value.element_type()),
                );
                schema.additional_properties = Some(Box::new(value));
                schema
            }
            None => Self::blank(SchemaKind::Map, "HashMap<String, serde_json::Value>"),
        }
    }

    /// A list of `item`.
    pub fn array(item: Schema) -> Self {
        let mut schema = Self::blank(SchemaKind::Array, format!("Vec<{}>", item.element_type()));
        schema.items = Some(Box::new(item));
        schema
    }

    /// An enum over `values` with the underlying type `base`.
    pub fn enumeration(base: impl Into<String>, values: Vec<EnumValue>) -> Self {
        let mut schema = Self::blank(SchemaKind::Enum, base);
        schema.enum_values = values;
        schema
    }

    /// A union of `variants`.
    pub fn union(variants: Vec<Schema>, discriminator: Option<Discriminator>) -> Self {
        let mut schema = Self::blank(SchemaKind::Union, "");
        schema.variants = variants;
        schema.discriminator = discriminator;
        schema
    }

    /// The result of merging `allOf` branches.
    pub fn merged(properties: Vec<Property>, embedded: Vec<String>) -> Self {
        let mut schema = Self::blank(SchemaKind::MergedObject, "");
        schema.properties = properties;
        schema.embedded = embedded;
        schema
    }

    /// Whether this schema must become a named type when it appears inline.
    pub fn needs_type_definition(&self) -> bool {
        matches!(
            self.kind,
            SchemaKind::Object | SchemaKind::Enum | SchemaKind::Union | SchemaKind::MergedObject
        )
    }

    /// The type expression without optionality: the referenced name if any, otherwise the
    /// target type; boxed when the reference closes a cycle.
    pub fn type_decl(&self) -> String {
        let base = self.ref_type.as_deref().unwrap_or(&self.target_type);
        if self.indirect {
            format!("Box<{}>", base)
        } else {
            base.to_string()
        }
    }

    /// The type expression inside a container, where no `Box` is needed.
    fn element_type(&self) -> String {
        self.ref_type
            .clone()
            .unwrap_or_else(|| self.target_type.clone())
    }

    /// Copies the value-level flags of `other` onto this schema.
    pub fn inherit_flags(&mut self, other: &Schema) {
        self.nullable |= other.nullable;
        self.read_only |= other.read_only;
        self.write_only |= other.write_only;
        self.skip_optional_wrapper |= other.skip_optional_wrapper;
        self.deprecated |= other.deprecated;
        if self.description.is_none() {
            self.description = other.description.clone();
        }
    }

    /// This schema with documentation removed at every level; two schemas are
    /// equivalent when their stripped forms are equal.
    pub fn without_docs(&self) -> Schema {
        let mut stripped = self.clone();
        stripped.strip_docs();
        stripped
    }

    fn strip_docs(&mut self) {
        self.description = None;
        self.deprecated = false;
        for prop in &mut self.properties {
            prop.description = None;
            prop.deprecated = false;
            prop.schema.strip_docs();
        }
        for variant in &mut self.variants {
            variant.strip_docs();
        }
        if let Some(items) = &mut self.items {
            items.strip_docs();
        }
        if let Some(ap) = &mut self.additional_properties {
            ap.strip_docs();
        }
    }

    /// Structural equivalence: equal after documentation is stripped, ignoring the
    /// type's own name.
    pub fn is_equivalent(&self, other: &Schema) -> bool {
        let mut a = self.without_docs();
        let mut b = other.without_docs();
        if matches!(
            a.kind,
            SchemaKind::Object | SchemaKind::Union | SchemaKind::MergedObject
        ) {
            a.target_type.clear();
            b.target_type.clear();
        }
        a == b
    }
}

/// Options for [`Property::type_decl`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WrapperOptions {
    /// Nullable properties are `Nullable<T>`.
    pub nullable_type: bool,
    /// Required read/write-only properties stay unwrapped.
    pub disable_required_read_only_as_wrapper: bool,
}

impl From<&Configuration> for WrapperOptions {
    fn from(config: &Configuration) -> Self {
        Self {
            nullable_type: config.output_options.nullable_type,
            disable_required_read_only_as_wrapper: config
                .compatibility
                .disable_required_read_only_as_wrapper,
        }
    }
}

/// An object property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Field identifier.
    pub name: String,
    /// Name on the wire.
    pub json_name: String,
    /// Value schema.
    pub schema: Schema,
    /// Listed in `required`.
    pub required: bool,
    /// Accepts `null`.
    pub nullable: bool,
    /// `readOnly`.
    pub read_only: bool,
    /// `writeOnly`.
    pub write_only: bool,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Documentation.
    pub description: Option<String>,
    /// The field name came from `x-rust-name` and must not be disambiguated.
    #[serde(skip)]
    pub(crate) explicit_name: bool,
}

impl Property {
    /// Builds a property whose flags come from its schema.
    pub fn new(json_name: &str, schema: Schema, required: bool) -> Self {
        Self {
            name: String::new(),
            json_name: json_name.to_string(),
            required,
            nullable: schema.nullable,
            read_only: schema.read_only,
            write_only: schema.write_only,
            deprecated: schema.deprecated,
            description: schema.description.clone(),
            schema,
            explicit_name: false,
        }
    }

    /// The field's type expression with optionality applied.
    ///
    /// Rules, first match wins:
    /// 1. nullable wrapper mode and nullable: `Nullable<T>`;
    /// 2. the schema asks to skip the optional wrapper: `T`;
    /// 3. read/write-only: `Option<T>`, unless the exemption flag is set and the property
    ///    is required and not nullable;
    /// 4. required and not nullable: `T`;
    /// 5. otherwise `Option<T>`.
    pub fn type_decl(&self, opts: &WrapperOptions) -> String {
        let base = self.schema.type_decl();
        if opts.nullable_type && self.nullable {
            return format!("Nullable<{}>", base);
        }
        if self.schema.skip_optional_wrapper {
            return base;
        }
        let wrap = if self.read_only || self.write_only {
            !(opts.disable_required_read_only_as_wrapper && self.required && !self.nullable)
        } else {
            !self.required || self.nullable
        };
        if wrap {
            format!("Option<{}>", base)
        } else {
            base
        }
    }
}

/// Where a named type came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeOrigin {
    /// A `components` entry.
    Component {
        /// Components section (`schemas`, `parameters`, ...).
        section: String,
    },
    /// An inline schema promoted to a named type.
    Inline,
    /// A type synthesised for an operation (bodies, responses, parameter bags).
    Operation {
        /// The normalized operation id.
        operation_id: String,
    },
}

/// A named type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    /// Type identifier.
    pub name: String,
    /// The document name it was derived from (component name or joined naming path).
    pub json_name: String,
    /// Naming path the name was derived from.
    pub naming_path: Vec<String>,
    /// Where the type came from.
    pub origin: TypeOrigin,
    /// The type's schema.
    pub schema: Schema,
}

impl TypeDefinition {
    /// Builds a definition for an inline schema.
    pub fn inline(name: String, naming_path: &[String], schema: Schema) -> Self {
        Self {
            json_name: naming_path.join("_"),
            name,
            naming_path: naming_path.to_vec(),
            origin: TypeOrigin::Inline,
            schema,
        }
    }

    /// Doc comment lines for the type, if it is documented.
    pub fn doc_comment(&self) -> Option<String> {
        self.schema
            .description
            .as_deref()
            .map(to_comment)
            .filter(|c| !c.is_empty())
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path.
    Path,
    /// Query.
    Query,
    /// Header.
    Header,
    /// Cookie.
    Cookie,
}

impl FromStr for ParamLocation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ParamLocation::Path),
            "query" => Ok(ParamLocation::Query),
            "header" => Ok(ParamLocation::Header),
            "cookie" => Ok(ParamLocation::Cookie),
            other => Err(AppError::InvalidDocument(format!(
                "Unsupported parameter location '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        };
        write!(f, "{}", s)
    }
}

/// A described parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDefinition {
    /// Name on the wire.
    pub name: String,
    /// Location.
    pub location: ParamLocation,
    /// Required flag as declared.
    pub required: bool,
    /// Serialization style.
    pub style: Option<String>,
    /// Explode modifier.
    pub explode: Option<bool>,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Documentation.
    pub description: Option<String>,
    /// Value schema.
    pub schema: Schema,
}

impl ParameterDefinition {
    /// The parameter's type expression; optional parameters are wrapped.
    pub fn type_decl(&self) -> String {
        if self.required {
            self.schema.type_decl()
        } else {
            format!("Option<{}>", self.schema.type_decl())
        }
    }
}

/// One content type of a request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyDefinition {
    /// Media type.
    pub content_type: String,
    /// Short tag used in type names (`JSON`, `Multipart`, `Formdata`, `Text`, ...).
    pub name_tag: String,
    /// Required flag.
    pub required: bool,
    /// `application/json`.
    pub is_default: bool,
    /// Payload schema.
    pub schema: Schema,
}

/// One content type of a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseContentDefinition {
    /// Media type.
    pub content_type: String,
    /// Short tag used in type names.
    pub name_tag: String,
    /// Payload schema.
    pub schema: Schema,
}

/// A response header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseHeaderDefinition {
    /// Header name.
    pub name: String,
    /// Required flag.
    pub required: bool,
    /// Value schema.
    pub schema: Schema,
}

/// A response for one status code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDefinition {
    /// Status code or `default`.
    pub status_code: String,
    /// Documentation.
    pub description: Option<String>,
    /// Component response type, when the response is a `$ref`.
    pub component: Option<String>,
    /// Contents in media type order.
    pub contents: Vec<ResponseContentDefinition>,
    /// Headers in name order.
    pub headers: Vec<ResponseHeaderDefinition>,
}

/// One security provider requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityDefinition {
    /// Security scheme name.
    pub provider_name: String,
    /// Required scopes.
    pub scopes: Vec<String>,
}

/// A described operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationDefinition {
    /// Normalized operation id.
    pub operation_id: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template.
    pub path: String,
    /// Summary.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Path parameters in template order, followed by the others in declaration order.
    pub parameters: Vec<ParameterDefinition>,
    /// Name of the query/header/cookie parameter bag type.
    pub params_type: Option<String>,
    /// Request body per content type.
    pub request_bodies: Vec<RequestBodyDefinition>,
    /// Responses per status code.
    pub responses: Vec<ResponseDefinition>,
    /// Effective security requirements.
    pub security: Vec<SecurityDefinition>,
    /// Types spawned while describing this operation.
    pub type_definitions: Vec<TypeDefinition>,
}

impl OperationDefinition {
    /// Parameters at `location`, in output order.
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }
}

/// The resolved model of a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeneratedModel {
    /// Named types in registration order.
    pub types: Vec<TypeDefinition>,
    /// Operations in path, then method order.
    pub operations: Vec<OperationDefinition>,
}

impl GeneratedModel {
    /// Looks up a type by name.
    pub fn type_named(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Looks up an operation by normalized id.
    pub fn operation(&self, operation_id: &str) -> Option<&OperationDefinition> {
        self.operations
            .iter()
            .find(|op| op.operation_id == operation_id)
    }
}

/// Parses a parameter location, attaching the parameter name on failure.
pub(crate) fn parse_location(name: &str, location: &str) -> AppResult<ParamLocation> {
    location.parse().map_err(|_| {
        AppError::InvalidDocument(format!(
            "Parameter '{}' has unsupported location '{}'",
            name, location
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(required: bool, nullable: bool) -> Property {
        let mut schema = Schema::primitive("i32");
        schema.nullable = nullable;
        Property::new("count", schema, required)
    }

    #[test]
    fn test_optionality_nullable_mode() {
        let opts = WrapperOptions {
            nullable_type: true,
            ..Default::default()
        };
        assert_eq!(prop(false, false).type_decl(&opts), "Option<i32>");
        assert_eq!(prop(false, true).type_decl(&opts), "Nullable<i32>");
        assert_eq!(prop(true, false).type_decl(&opts), "i32");
        assert_eq!(prop(true, true).type_decl(&opts), "Nullable<i32>");
    }

    #[test]
    fn test_optionality_option_mode() {
        let opts = WrapperOptions::default();
        assert_eq!(prop(false, false).type_decl(&opts), "Option<i32>");
        assert_eq!(prop(false, true).type_decl(&opts), "Option<i32>");
        assert_eq!(prop(true, false).type_decl(&opts), "i32");
        assert_eq!(prop(true, true).type_decl(&opts), "Option<i32>");
    }

    #[test]
    fn test_optionality_read_only() {
        let mut p = prop(true, false);
        p.read_only = true;
        assert_eq!(p.type_decl(&WrapperOptions::default()), "Option<i32>");
        let exempt = WrapperOptions {
            disable_required_read_only_as_wrapper: true,
            ..Default::default()
        };
        assert_eq!(p.type_decl(&exempt), "i32");

        p.required = false;
        assert_eq!(p.type_decl(&exempt), "Option<i32>");

        let mut w = prop(true, true);
        w.write_only = true;
        let nullable_mode = WrapperOptions {
            nullable_type: true,
            disable_required_read_only_as_wrapper: true,
        };
        assert_eq!(w.type_decl(&nullable_mode), "Nullable<i32>");
        assert_eq!(w.type_decl(&exempt), "Option<i32>");
    }

    #[test]
    fn test_optionality_skip_wrapper() {
        let mut schema = Schema::primitive("i32");
        schema.skip_optional_wrapper = true;
        let p = Property::new("count", schema, false);
        assert_eq!(p.type_decl(&WrapperOptions::default()), "i32");

        let mut schema = Schema::primitive("i32");
        schema.ref_type = Some("Custom".into());
        schema.skip_optional_wrapper = true;
        let p = Property::new("custom", schema, false);
        assert_eq!(p.type_decl(&WrapperOptions::default()), "Custom");
    }

    #[test]
    fn test_indirect_reference_is_boxed_outside_containers() {
        let mut node = Schema::reference("Node");
        node.indirect = true;
        assert_eq!(node.type_decl(), "Box<Node>");
        let list = Schema::array(node);
        assert_eq!(list.target_type, "Vec<Node>");
    }

    #[test]
    fn test_equivalence_ignores_docs_and_own_name() {
        let mut a = Schema::object(vec![Property::new("id", Schema::primitive("i64"), true)]);
        a.target_type = "PetOwner".into();
        a.description = Some("The owner".into());
        let b = Schema::object(vec![Property::new("id", Schema::primitive("i64"), true)]);
        assert!(a.is_equivalent(&b));

        let c = Schema::object(vec![Property::new("id", Schema::primitive("i32"), true)]);
        assert!(!a.is_equivalent(&c));
    }

    #[test]
    fn test_param_location_parse() {
        assert_eq!("query".parse::<ParamLocation>().unwrap(), ParamLocation::Query);
        assert!("querystring".parse::<ParamLocation>().is_err());
        assert_eq!(ParamLocation::Cookie.to_string(), "cookie");
    }

    #[test]
    fn test_doc_comment() {
        let mut schema = Schema::primitive("String");
        schema.description = Some("A name".into());
        let def = TypeDefinition::inline("Name".into(), &["Name".to_string()], schema);
        assert_eq!(def.doc_comment().as_deref(), Some("/// A name"));
    }
}
