#![deny(missing_docs)]

//! # OpenAPI Resolution Module
//!
//! - **shims**: Serde views of the document and the loader.
//! - **filter**: Tag and operation id filters applied before resolution.
//! - **naming**: Identifier normalization, sanitization and namespaces.
//! - **ref_utils**: `$ref` string and JSON pointer helpers.
//! - **registry**: The arena of named types.
//! - **schemas**: Component pass, schema walker, `allOf` merger, enums and unions.
//! - **resolver**: Parameters, request bodies, responses and scalar types.
//! - **routes**: Operation descriptions.
//! - **models**: The resolved model handed to rendering strategies.

pub mod filter;
pub mod generator;
pub mod models;
pub mod naming;
pub mod ref_utils;
pub mod registry;
pub mod resolver;
pub mod routes;
pub mod schemas;
pub mod shims;

pub use filter::filter_operations;
pub use generator::{generate_from_str, Generator};
pub use models::{
    GeneratedModel, OperationDefinition, ParamLocation, ParameterDefinition, Property,
    RequestBodyDefinition, ResponseDefinition, Schema, SchemaKind, TypeDefinition, TypeOrigin,
    WrapperOptions,
};
pub use naming::{NameNormalizer, Namespace};
pub use shims::{load_document, ShimOpenApi};
