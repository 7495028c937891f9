#![deny(missing_docs)]

//! # Generator
//!
//! The per-invocation engine. A `Generator` owns the type registry and the reference
//! resolver for one document; nothing is shared between runs.
//!
//! The walk itself is split across modules as `impl Generator` blocks:
//! - **schemas**: components pass, schema walker, `allOf` merger, enums and unions.
//! - **resolver**: parameters, request bodies and responses.
//! - **routes**: operation descriptions.

use crate::config::{Configuration, MergeAlgorithm};
use crate::error::AppResult;
use crate::oas::filter::filter_operations;
use crate::oas::models::{GeneratedModel, TypeDefinition};
use crate::oas::naming::NameNormalizer;
use crate::oas::registry::TypeRegistry;
use crate::oas::schemas::refs::ReferenceResolver;
use crate::oas::shims::{load_document, ShimOpenApi};
use tracing::{debug, info};

/// Resolves one document into a [`GeneratedModel`].
pub struct Generator<'a> {
    pub(crate) doc: &'a ShimOpenApi,
    pub(crate) config: &'a Configuration,
    pub(crate) resolver: ReferenceResolver<'a>,
    pub(crate) registry: TypeRegistry,
    /// Components reached through an unbroken chain of aliases and `allOf` branches.
    pub(crate) all_of_chain: Vec<String>,
    /// Names registered while describing the current operation.
    pub(crate) spawned: Option<Vec<String>>,
}

impl<'a> Generator<'a> {
    /// Creates an engine for `doc`.
    pub fn new(doc: &'a ShimOpenApi, config: &'a Configuration) -> Self {
        let normalizer = config.output_options.name_normalizer;
        Self {
            doc,
            config,
            resolver: ReferenceResolver::new(
                &config.import_mapping,
                doc.self_uri.as_deref(),
                normalizer,
            ),
            registry: TypeRegistry::new(),
            all_of_chain: Vec::new(),
            spawned: None,
        }
    }

    /// Runs the whole pipeline: name reservation, component types, operations.
    pub fn generate(mut self) -> AppResult<GeneratedModel> {
        self.reserve_component_names()?;

        if self.config.generate.models {
            self.generate_component_types()?;
        } else {
            debug!("component types disabled");
        }

        let operations = if self.config.generate.operations {
            self.describe_operations()?
        } else {
            Vec::new()
        };

        let types = self.registry.into_definitions()?;
        info!(
            types = types.len(),
            operations = operations.len(),
            "resolved document"
        );
        Ok(GeneratedModel { types, operations })
    }

    pub(crate) fn normalizer(&self) -> NameNormalizer {
        self.config.output_options.name_normalizer
    }

    pub(crate) fn merge_algorithm(&self) -> MergeAlgorithm {
        self.config.merge_algorithm()
    }

    /// Registers a non-component type and records it against the current operation.
    pub(crate) fn register_type(&mut self, def: TypeDefinition) -> AppResult<String> {
        let (name, created) = self.registry.register(def)?;
        if created {
            debug!(type_name = %name, "registered type");
        }
        if let Some(spawned) = self.spawned.as_mut() {
            if !spawned.contains(&name) {
                spawned.push(name.clone());
            }
        }
        Ok(name)
    }
}

/// `path` extended by one segment.
pub(crate) fn child_path(path: &[String], segment: &str) -> Vec<String> {
    let mut child = Vec::with_capacity(path.len() + 1);
    child.extend_from_slice(path);
    child.push(segment.to_string());
    child
}

/// Loads, filters and resolves a YAML or JSON document.
pub fn generate_from_str(text: &str, config: &Configuration) -> AppResult<GeneratedModel> {
    config.validate()?;
    let mut doc = load_document(text)?;
    filter_operations(&mut doc, &config.output_options);
    Generator::new(&doc, config).generate()
}
