#![deny(missing_docs)]

//! # Schema Walking
//!
//! Turns schema nodes into [`Schema`] values.
//!
//! - **refs**: `$ref` resolution.
//! - **structs**: objects and the `allOf` merger.
//! - **enums**: enums and `oneOf` / `anyOf` unions.
//!
//! [`Generator::walk`] is structural: it never names the node it is given.
//! [`Generator::walk_field`] is used for everything below the root of a definition and
//! promotes inline objects, enums, unions and merged objects to named types.

pub mod enums;
pub mod refs;
pub mod structs;

use crate::error::{AppError, AppResult};
use crate::oas::generator::{child_path, Generator};
use crate::oas::models::{Schema, TypeDefinition, TypeOrigin};
use crate::oas::naming::{path_to_type_name, schema_name_to_type_name};
use crate::oas::registry::{component_key, ComponentState};
use crate::oas::resolver::body::json_content;
use crate::oas::resolver::params::parameter_schema_node;
use crate::oas::resolver::types::scalar_schema;
use crate::oas::schemas::refs::RefOutcome;
use crate::oas::shims::ShimSchema;
use indexmap::IndexMap;
use std::cmp::Ordering;
use tracing::{debug, trace};
use utoipa::openapi::RefOr;

pub(crate) const SCHEMAS: &str = "schemas";
pub(crate) const PARAMETERS: &str = "parameters";
pub(crate) const REQUEST_BODIES: &str = "requestBodies";
pub(crate) const RESPONSES: &str = "responses";

impl<'a> Generator<'a> {
    /// Allocates a type name for every component that will produce a type.
    pub(crate) fn reserve_component_names(&mut self) -> AppResult<()> {
        let doc = self.doc;
        let normalizer = self.normalizer();
        let components = &doc.components;

        for (name, node) in ordered_components(&components.schemas) {
            let explicit = match node {
                RefOr::T(schema) => schema.extension_str("x-rust-name"),
                RefOr::Ref(_) => None,
            };
            self.registry.reserve_component(
                &component_key(SCHEMAS, name),
                explicit,
                &schema_name_to_type_name(name, normalizer),
                None,
            )?;
        }

        for (name, param) in sorted_entries(&components.parameters) {
            if let RefOr::T(param) = param {
                if parameter_schema_node(param).is_some() {
                    self.registry.reserve_component(
                        &component_key(PARAMETERS, name),
                        None,
                        &schema_name_to_type_name(name, normalizer),
                        Some("Parameter"),
                    )?;
                }
            }
        }

        for (name, body) in sorted_entries(&components.request_bodies) {
            if let RefOr::T(body) = body {
                if json_content(&body.content).is_some() {
                    self.registry.reserve_component(
                        &component_key(REQUEST_BODIES, name),
                        None,
                        &schema_name_to_type_name(name, normalizer),
                        Some("RequestBody"),
                    )?;
                }
            }
        }

        for (name, response) in sorted_entries(&components.responses) {
            if let RefOr::T(response) = response {
                if json_content(&response.content).is_some() {
                    self.registry.reserve_component(
                        &component_key(RESPONSES, name),
                        None,
                        &schema_name_to_type_name(name, normalizer),
                        Some("Response"),
                    )?;
                }
            }
        }

        Ok(())
    }

    /// Walks every component that produces a type.
    pub(crate) fn generate_component_types(&mut self) -> AppResult<()> {
        let doc = self.doc;
        let components = &doc.components;

        for (name, node) in ordered_components(&components.schemas) {
            if self.is_excluded_schema(name) {
                debug!(component = %name, "schema excluded");
                continue;
            }
            self.define_component(SCHEMAS, name, node)?;
        }

        for (name, param) in sorted_entries(&components.parameters) {
            if let RefOr::T(param) = param {
                if let Some(node) = parameter_schema_node(param) {
                    self.define_component(PARAMETERS, name, node)?;
                }
            }
        }

        for (name, body) in sorted_entries(&components.request_bodies) {
            if let RefOr::T(body) = body {
                if let Some((_, node)) = json_content(&body.content) {
                    self.define_component(REQUEST_BODIES, name, node)?;
                }
            }
        }

        for (name, response) in sorted_entries(&components.responses) {
            if let RefOr::T(response) = response {
                if let Some((_, node)) = json_content(&response.content) {
                    self.define_component(RESPONSES, name, node)?;
                }
            }
        }

        Ok(())
    }

    /// Walks one reserved component and stores its definition. A component that was
    /// already started is not walked again.
    pub(crate) fn define_component(
        &mut self,
        section: &str,
        name: &str,
        node: &'a RefOr<ShimSchema>,
    ) -> AppResult<String> {
        let key = component_key(section, name);
        match self.registry.component_state(&key) {
            Some(ComponentState::Reserved) => {}
            Some(_) => {
                return Ok(self.registry.component_name(&key).unwrap_or_default().to_string());
            }
            None => {
                return Err(AppError::InvalidDocument(format!(
                    "Component '{}' was never reserved",
                    key
                )))
            }
        }

        let type_name = self.registry.begin(&key)?;
        debug!(component = %key, type_name = %type_name, "describing component");

        let path = vec![name.to_string()];
        let mut chain = self.all_of_chain.clone();
        chain.push(key.clone());
        let saved_chain = std::mem::replace(&mut self.all_of_chain, chain);
        let saved_spawned = self.spawned.take();
        let walked = self.walk(node, &path);
        self.all_of_chain = saved_chain;
        self.spawned = saved_spawned;
        let schema = walked?;

        self.registry.promote(
            &key,
            TypeDefinition {
                name: type_name.clone(),
                json_name: name.to_string(),
                naming_path: path,
                origin: TypeOrigin::Component {
                    section: section.to_string(),
                },
                schema,
            },
        )?;
        Ok(type_name)
    }

    pub(crate) fn is_excluded_schema(&self, name: &str) -> bool {
        self.config
            .output_options
            .exclude_schemas
            .iter()
            .any(|excluded| excluded == name)
    }

    /// Structural walk of a node; the node itself is never registered.
    pub(crate) fn walk(&mut self, node: &'a RefOr<ShimSchema>, path: &[String]) -> AppResult<Schema> {
        match node {
            RefOr::Ref(r) => self.walk_reference(&r.ref_location, path),
            RefOr::T(schema) => self.walk_inline(schema, path),
        }
    }

    /// Walks a node that sits below the root of a definition. Inline schemas that need a
    /// name are registered under `path` and replaced by a reference, boxed when the type
    /// embeds a component that is still being walked.
    pub(crate) fn walk_field(
        &mut self,
        node: &'a RefOr<ShimSchema>,
        path: &[String],
    ) -> AppResult<Schema> {
        let saved_chain = std::mem::take(&mut self.all_of_chain);
        let walked = self.walk(node, path);
        self.all_of_chain = saved_chain;
        let schema = walked?;

        if !schema.needs_type_definition() {
            return Ok(schema);
        }

        let def = TypeDefinition::inline(
            path_to_type_name(path, self.normalizer()),
            path,
            schema.clone(),
        );
        let name = self.register_type(def)?;
        let mut reference = Schema::reference(name);
        reference.inherit_flags(&schema);
        reference.indirect = schema
            .embedded
            .iter()
            .any(|embedded| self.registry.is_in_flight(embedded));
        Ok(reference)
    }

    /// A `$ref` to a schema becomes a use of the target's type name.
    pub(crate) fn walk_reference(&mut self, reference: &str, path: &[String]) -> AppResult<Schema> {
        let outcome = self
            .resolver
            .resolve(reference, SCHEMAS, &self.registry, path)?;
        trace!(reference, outcome = ?outcome, "resolved reference");

        let mut schema = match outcome {
            RefOutcome::External { .. } => {
                let mut schema = Schema::reference(outcome.type_name());
                schema.skip_optional_wrapper = self.config.output_options.prefer_skip_optional_wrapper;
                return Ok(schema);
            }
            RefOutcome::LocalPending {
                key,
                name,
                in_flight: true,
            } => {
                if self.all_of_chain.contains(&key) {
                    return Err(AppError::unsupported(
                        path,
                        format!("'{}' refers back to itself without an intervening property", reference),
                    ));
                }
                let mut schema = Schema::reference(name);
                schema.indirect = true;
                schema
            }
            RefOutcome::LocalPending { name, .. } => {
                self.define_referenced_schema(reference)?;
                Schema::reference(name)
            }
            RefOutcome::LocalResolved { name, .. } => Schema::reference(name),
        };

        let target = self.local_schema(reference);
        if let Some(target) = target {
            schema.nullable = target.is_nullable();
            schema.read_only = target.read_only;
            schema.write_only = target.write_only;
        }
        schema.skip_optional_wrapper = target
            .and_then(|t| t.extension_bool("x-skip-optional-wrapper"))
            .unwrap_or(self.config.output_options.prefer_skip_optional_wrapper);
        Ok(schema)
    }

    /// Defines a referenced component ahead of its turn so cycles through it are seen.
    fn define_referenced_schema(&mut self, reference: &str) -> AppResult<()> {
        let Some((_, name)) = self.resolver.local_component(reference) else {
            return Ok(());
        };
        if !self.config.generate.models || self.is_excluded_schema(&name) {
            return Ok(());
        }
        let doc = self.doc;
        if let Some((raw_name, node)) = doc.components.schemas.get_key_value(&name) {
            self.define_component(SCHEMAS, raw_name, node)?;
        }
        Ok(())
    }

    /// The schema object a local reference ends at, following alias chains.
    pub(crate) fn local_schema(&self, reference: &str) -> Option<&'a ShimSchema> {
        let doc = self.doc;
        self.resolver
            .lookup_component(&doc.components.schemas, reference, SCHEMAS, &[])
            .ok()
            .map(|(_, schema)| schema)
    }

    /// The component a local schema reference points at: `(key, name, node)`.
    pub(crate) fn local_schema_node(
        &self,
        reference: &str,
    ) -> Option<(String, String, &'a RefOr<ShimSchema>)> {
        let (section, name) = self.resolver.local_component(reference)?;
        if section != SCHEMAS {
            return None;
        }
        let doc = self.doc;
        let node = doc.components.schemas.get(&name)?;
        Some((component_key(SCHEMAS, &name), name, node))
    }

    fn walk_inline(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let mut out = if let Some(rust_type) = schema.extension_str("x-rust-type") {
            Schema::primitive(rust_type)
        } else if schema.not.is_some() {
            return Err(AppError::unsupported(path, "`not` cannot be expressed as a type"));
        } else if !schema.all_of.is_empty() {
            self.merge_all_of(schema, path)?
        } else if schema.enum_values.as_ref().is_some_and(|v| !v.is_empty()) {
            self.walk_enum(schema, path)?
        } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            self.walk_union(schema, path)?
        } else {
            self.walk_typed(schema, path)?
        };
        self.apply_schema_flags(&mut out, schema, path)?;
        Ok(out)
    }

    fn walk_typed(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let (types, _) = schema.types();
        if types.len() > 1 {
            return Err(AppError::unsupported(
                path,
                format!("multiple non-null types {:?}", types),
            ));
        }

        match types.first().copied() {
            Some("object") => self.walk_object(schema, path),
            Some("array") => self.walk_array(schema, path),
            Some(type_name) => scalar_schema(schema, type_name, path),
            None if !schema.properties.is_empty() || schema.additional_properties.is_some() => {
                self.walk_object(schema, path)
            }
            None if schema.items.is_some() => self.walk_array(schema, path),
            None => Ok(Schema::any()),
        }
    }

    fn walk_array(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let item = match &schema.items {
            Some(items) => self.walk_field(items, &child_path(path, "Item"))?,
            None => Schema::any(),
        };
        Ok(Schema::array(item))
    }

    fn apply_schema_flags(
        &self,
        out: &mut Schema,
        schema: &ShimSchema,
        path: &[String],
    ) -> AppResult<()> {
        let options = &self.config.output_options;
        out.nullable |= schema.is_nullable();
        out.read_only |= schema.read_only;
        out.write_only |= schema.write_only;
        out.deprecated |= schema.deprecated;
        if schema.description.is_some() {
            out.description = schema.description.clone();
        }

        let skip = schema.extension_bool("x-skip-optional-wrapper");
        if skip == Some(true) && out.nullable && !options.nullable_type {
            return Err(AppError::unsupported(
                path,
                "x-skip-optional-wrapper on a nullable schema needs nullable-type output",
            ));
        }
        out.skip_optional_wrapper |= skip.unwrap_or(options.prefer_skip_optional_wrapper);
        Ok(())
    }
}

fn compare_x_order(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn node_x_order(node: &RefOr<ShimSchema>) -> Option<i64> {
    match node {
        RefOr::T(schema) => schema.x_order(),
        RefOr::Ref(_) => None,
    }
}

/// Component schemas: `x-order` first, then by name.
pub(crate) fn ordered_components(
    map: &IndexMap<String, RefOr<ShimSchema>>,
) -> Vec<(&String, &RefOr<ShimSchema>)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| {
        compare_x_order(node_x_order(a.1), node_x_order(b.1)).then_with(|| a.0.cmp(b.0))
    });
    entries
}

/// Properties: `x-order` first, the rest in declaration order.
pub(crate) fn ordered_properties(schema: &ShimSchema) -> Vec<(&String, &RefOr<ShimSchema>)> {
    let mut entries: Vec<_> = schema.properties.iter().collect();
    entries.sort_by(|a, b| compare_x_order(node_x_order(a.1), node_x_order(b.1)));
    entries
}

/// Entries of a components section sorted by name.
pub(crate) fn sorted_entries<V>(map: &IndexMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
