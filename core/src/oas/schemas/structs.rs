#![deny(missing_docs)]

//! # Objects and Composition
//!
//! Object schemas and the `allOf` merger.
//!
//! The current merger flattens every branch into one property list: properties are
//! upserted in branch order (last writer wins, keeping the first position), `required`
//! sets are unioned and flags are OR-ed. Referenced branches are listed in
//! `composed_from`. The legacy merger keeps referenced branches in `embedded` without
//! copying their fields. Either way a branch whose target is still being walked is
//! embedded.

use crate::config::MergeAlgorithm;
use crate::error::{display_path, AppError, AppResult};
use crate::oas::generator::{child_path, Generator};
use crate::oas::models::{Property, Schema, SchemaKind};
use crate::oas::naming::{to_field_name, Namespace};
use crate::oas::schemas::ordered_properties;
use crate::oas::shims::{ShimAdditionalProperties, ShimSchema};
use tracing::warn;
use utoipa::openapi::RefOr;

/// Longest chain of aliases followed when reading a merged branch.
const MAX_ALIAS_HOPS: usize = 32;

impl<'a> Generator<'a> {
    /// An object with properties, or a map when it declares none.
    pub(crate) fn walk_object(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let (additional, deny) = self.walk_additional_properties(schema, path)?;
        if schema.properties.is_empty() {
            let mut map = Schema::map(additional);
            map.deny_additional_properties = deny;
            return Ok(map);
        }

        let mut properties = self.walk_properties(schema, path)?;
        assign_field_names(&mut properties, path)?;
        let mut object = Schema::object(properties);
        object.additional_properties = additional.map(Box::new);
        object.deny_additional_properties = deny;
        Ok(object)
    }

    fn walk_properties(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Vec<Property>> {
        let mut properties = Vec::with_capacity(schema.properties.len());
        for (json_name, node) in ordered_properties(schema) {
            let walked = self.walk_field(node, &child_path(path, json_name))?;
            let required = schema.required.iter().any(|r| r == json_name);
            let mut prop = Property::new(json_name, walked, required);
            if let RefOr::T(inline) = node {
                if let Some(name) = inline.extension_str("x-rust-name") {
                    prop.name = name.to_string();
                    prop.explicit_name = true;
                }
            }
            properties.push(prop);
        }
        Ok(properties)
    }

    /// `(value schema, deny)` for `additionalProperties`. Only a schema value produces a
    /// type; `false` forbids extra fields.
    fn walk_additional_properties(
        &mut self,
        schema: &'a ShimSchema,
        path: &[String],
    ) -> AppResult<(Option<Schema>, bool)> {
        match &schema.additional_properties {
            None | Some(ShimAdditionalProperties::Bool(true)) => Ok((None, false)),
            Some(ShimAdditionalProperties::Bool(false)) => Ok((None, true)),
            Some(ShimAdditionalProperties::Schema(node)) => {
                let value = self.walk_field(node, &child_path(path, "AdditionalProperties"))?;
                Ok((Some(value), false))
            }
        }
    }

    /// Merges the `allOf` branches of `schema`, plus its own sibling properties.
    pub(crate) fn merge_all_of(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let has_siblings = !schema.properties.is_empty()
            || !schema.required.is_empty()
            || schema.additional_properties.is_some();

        if schema.all_of.len() == 1 && !has_siblings {
            let branch = &schema.all_of[0];
            if let RefOr::Ref(r) = branch {
                self.check_all_of_cycle(&r.ref_location, path)?;
            }
            return self.walk(branch, path);
        }

        let mut state = MergeState::default();
        for branch in &schema.all_of {
            match branch {
                RefOr::Ref(r) => self.merge_reference(&mut state, &r.ref_location, path)?,
                RefOr::T(_) => {
                    let walked = self.walk(branch, path)?;
                    state.absorb(walked, true, path)?;
                }
            }
        }

        if has_siblings {
            let (additional, deny) = self.walk_additional_properties(schema, path)?;
            let mut own = Schema::object(self.walk_properties(schema, path)?);
            own.additional_properties = additional.map(Box::new);
            own.deny_additional_properties = deny;
            for name in &schema.required {
                state.require(name);
            }
            state.absorb(own, true, path)?;
        }

        state.finish(path)
    }

    fn check_all_of_cycle(&self, reference: &str, path: &[String]) -> AppResult<()> {
        if let Some((key, _, _)) = self.local_schema_node(reference) {
            if self.all_of_chain.contains(&key) {
                return Err(AppError::composition(
                    path,
                    format!("cyclic allOf through '{}'", reference),
                ));
            }
        }
        Ok(())
    }

    /// Folds a `$ref` branch in. The target is defined through the registry like any
    /// other reference and its stored definition is read back; it is never walked twice.
    /// A target that is still being walked can only be embedded by name.
    fn merge_reference(
        &mut self,
        state: &mut MergeState,
        reference: &str,
        path: &[String],
    ) -> AppResult<()> {
        self.check_all_of_cycle(reference, path)?;
        let named = self.walk_reference(reference, path)?;
        let name = named.ref_type.clone().unwrap_or_default();
        state.absorb_flags(&named);

        let Some(target) = self.finished_shape(&name) else {
            state.embed(name);
            return Ok(());
        };
        match self.merge_algorithm() {
            MergeAlgorithm::Current => {
                state.absorb(target, true, path)?;
                state.compose(name);
            }
            MergeAlgorithm::Legacy => {
                state.absorb(target, false, path)?;
                state.embed(name);
            }
        }
        Ok(())
    }

    /// The stored schema of a finished type, following aliases between named types.
    fn finished_shape(&self, name: &str) -> Option<Schema> {
        let mut current = name;
        for _ in 0..MAX_ALIAS_HOPS {
            let schema = &self.registry.get(current)?.schema;
            match (schema.kind, schema.ref_type.as_deref()) {
                (SchemaKind::Reference, Some(next)) => current = next,
                _ => return Some(schema.clone()),
            }
        }
        None
    }
}

/// Gives every property a field name unique within its object. Explicit names are
/// claimed first and must not clash.
pub(crate) fn assign_field_names(properties: &mut [Property], path: &[String]) -> AppResult<()> {
    let mut fields = Namespace::new(format!("fields of {}", display_path(path)));
    for prop in properties.iter().filter(|p| p.explicit_name) {
        fields.claim_exact(&prop.name)?;
    }
    for prop in properties.iter_mut().filter(|p| !p.explicit_name) {
        prop.name = fields.claim(&to_field_name(&prop.json_name))?;
    }
    Ok(())
}

#[derive(Default)]
struct MergeState {
    properties: Vec<Property>,
    required: Vec<String>,
    /// Property names present through embedded types only.
    visible: Vec<String>,
    embedded: Vec<String>,
    composed_from: Vec<String>,
    additional: Option<Schema>,
    deny_additional: bool,
    primitive: Option<Schema>,
    object_seen: bool,
    nullable: bool,
    read_only: bool,
    write_only: bool,
    deprecated: bool,
    description: Option<String>,
}

impl MergeState {
    fn embed(&mut self, name: String) {
        if !self.embedded.contains(&name) {
            self.embedded.push(name);
        }
    }

    fn compose(&mut self, name: String) {
        if !self.composed_from.contains(&name) {
            self.composed_from.push(name);
        }
    }

    fn absorb_flags(&mut self, schema: &Schema) {
        self.nullable |= schema.nullable;
        self.read_only |= schema.read_only;
        self.write_only |= schema.write_only;
        self.deprecated |= schema.deprecated;
        if self.description.is_none() {
            self.description = schema.description.clone();
        }
    }

    /// Folds one walked branch into the result. With `flatten` unset, object properties
    /// only count as visible names.
    fn absorb(&mut self, branch: Schema, flatten: bool, path: &[String]) -> AppResult<()> {
        self.absorb_flags(&branch);
        match branch.kind {
            SchemaKind::Object | SchemaKind::MergedObject => {
                self.require_object(path)?;
                for required in branch.properties.iter().filter(|p| p.required) {
                    self.require(&required.json_name);
                }
                if flatten {
                    for embedded in branch.embedded {
                        self.embed(embedded);
                    }
                    for composed in branch.composed_from {
                        self.compose(composed);
                    }
                }
                self.merge_additional(
                    branch.additional_properties.map(|b| *b),
                    branch.deny_additional_properties,
                    path,
                )?;
                for prop in branch.properties {
                    if flatten {
                        self.upsert(prop, path);
                    } else if !self.visible.contains(&prop.json_name) {
                        self.visible.push(prop.json_name);
                    }
                }
                Ok(())
            }
            SchemaKind::Map => {
                self.require_object(path)?;
                self.merge_additional(
                    branch.additional_properties.map(|b| *b),
                    branch.deny_additional_properties,
                    path,
                )
            }
            SchemaKind::Reference => {
                if let Some(name) = branch.ref_type {
                    self.embed(name);
                }
                Ok(())
            }
            SchemaKind::Primitive if branch.target_type == Schema::any().target_type => Ok(()),
            SchemaKind::Primitive => {
                if self.object_seen {
                    return Err(AppError::composition(
                        path,
                        format!("cannot merge '{}' with an object", branch.target_type),
                    ));
                }
                match &self.primitive {
                    Some(existing) if existing.target_type != branch.target_type => {
                        Err(AppError::composition(
                            path,
                            format!(
                                "cannot merge '{}' with '{}'",
                                existing.target_type, branch.target_type
                            ),
                        ))
                    }
                    Some(_) => Ok(()),
                    None => {
                        self.primitive = Some(branch);
                        Ok(())
                    }
                }
            }
            SchemaKind::Enum | SchemaKind::Union | SchemaKind::Array => Err(AppError::composition(
                path,
                format!("{:?} branches cannot be merged", branch.kind).to_lowercase(),
            )),
        }
    }

    fn require_object(&mut self, path: &[String]) -> AppResult<()> {
        if let Some(primitive) = &self.primitive {
            return Err(AppError::composition(
                path,
                format!("cannot merge an object with '{}'", primitive.target_type),
            ));
        }
        self.object_seen = true;
        Ok(())
    }

    fn require(&mut self, json_name: &str) {
        if !self.required.iter().any(|r| r == json_name) {
            self.required.push(json_name.to_string());
        }
    }

    fn upsert(&mut self, prop: Property, path: &[String]) {
        match self
            .properties
            .iter_mut()
            .find(|p| p.json_name == prop.json_name)
        {
            Some(existing) => {
                if existing.schema.type_decl() != prop.schema.type_decl() {
                    warn!(
                        path = %display_path(path),
                        property = %prop.json_name,
                        replaced = %existing.schema.type_decl(),
                        by = %prop.schema.type_decl(),
                        "allOf branches disagree on a property type; last one wins"
                    );
                }
                *existing = prop;
            }
            None => self.properties.push(prop),
        }
    }

    fn merge_additional(
        &mut self,
        additional: Option<Schema>,
        deny: bool,
        path: &[String],
    ) -> AppResult<()> {
        if (deny && self.additional.is_some()) || (additional.is_some() && self.deny_additional) {
            return Err(AppError::composition(
                path,
                "additionalProperties is both forbidden and typed",
            ));
        }
        self.deny_additional |= deny;

        let Some(new) = additional else {
            return Ok(());
        };
        if let Some(existing) = &self.additional {
            if !existing.is_equivalent(&new) {
                return Err(AppError::composition(
                    path,
                    format!(
                        "conflicting additionalProperties '{}' and '{}'",
                        existing.type_decl(),
                        new.type_decl()
                    ),
                ));
            }
            return Ok(());
        }
        self.additional = Some(new);
        Ok(())
    }

    fn finish(mut self, path: &[String]) -> AppResult<Schema> {
        if !self.object_seen && self.embedded.len() == 1 {
            let mut alias = Schema::reference(self.embedded.remove(0));
            self.apply_flags(&mut alias);
            return Ok(alias);
        }
        if let Some(mut primitive) = self.primitive.take() {
            self.apply_flags(&mut primitive);
            return Ok(primitive);
        }

        for prop in &mut self.properties {
            prop.required = self.required.contains(&prop.json_name);
        }

        if self.deny_additional {
            let missing = self.required.iter().find(|name| {
                !self.properties.iter().any(|p| &p.json_name == *name) && !self.visible.contains(name)
            });
            if let Some(name) = missing {
                return Err(AppError::composition(
                    path,
                    format!(
                        "'{}' is required but no branch declares it and additional properties are forbidden",
                        name
                    ),
                ));
            }
        }

        assign_field_names(&mut self.properties, path)?;
        let mut merged = Schema::merged(
            std::mem::take(&mut self.properties),
            std::mem::take(&mut self.embedded),
        );
        merged.composed_from = std::mem::take(&mut self.composed_from);
        merged.additional_properties = self.additional.take().map(Box::new);
        merged.deny_additional_properties = self.deny_additional;
        self.apply_flags(&mut merged);
        Ok(merged)
    }

    fn apply_flags(&self, schema: &mut Schema) {
        schema.nullable |= self.nullable;
        schema.read_only |= self.read_only;
        schema.write_only |= self.write_only;
        schema.deprecated |= self.deprecated;
        if schema.description.is_none() {
            schema.description = self.description.clone();
        }
    }
}
