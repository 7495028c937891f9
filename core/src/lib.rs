#![deny(missing_docs)]

//! # Schemagraph Core
//!
//! Resolves an OpenAPI 3.x document into a named type graph and a list of operation
//! descriptions, ready for mechanical rendering.

/// Shared error types.
pub mod error;

/// Generator configuration.
pub mod config;

/// OpenAPI (OAS) resolution.
pub mod oas;

/// Rendering Strategy Interfaces.
pub mod strategies;

pub use config::{
    CompatibilityOptions, Configuration, GenerateOptions, ImportMapping, MergeAlgorithm,
    OutputOptions,
};
pub use error::{AppError, AppResult};
pub use oas::{
    generate_from_str, load_document, GeneratedModel, Generator, NameNormalizer,
    OperationDefinition, Property, Schema, SchemaKind, TypeDefinition, WrapperOptions,
};
pub use strategies::{JsonModelStrategy, OutlineStrategy, RenderInput, RenderStrategy};
