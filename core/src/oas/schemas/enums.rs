#![deny(missing_docs)]

//! # Enums and Unions
//!
//! `enum` value lists and `oneOf` / `anyOf` alternatives.

use crate::error::{AppError, AppResult};
use crate::oas::generator::{child_path, Generator};
use crate::oas::models::{Discriminator, Schema};
use crate::oas::naming::sanitize_enum_names;
use crate::oas::resolver::types::scalar_type;
use crate::oas::shims::ShimSchema;
use serde_json::Value;
use utoipa::openapi::RefOr;

impl<'a> Generator<'a> {
    /// An enum over the non-null values of `schema`. A list holding only `null` is a
    /// nullable free-form value.
    pub(crate) fn walk_enum(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let base = enum_base_type(schema, path)?;
        let values = schema.enum_values.as_deref().unwrap_or_default();

        let names: Vec<String> = schema
            .extension("x-enum-varnames")
            .and_then(Value::as_array)
            .map(|names| names.iter().map(value_text).collect())
            .unwrap_or_default();
        if !names.is_empty() && names.len() != values.len() {
            return Err(AppError::InvalidDocument(format!(
                "x-enum-varnames of '{}' has {} names for {} values",
                path.join("/"),
                names.len(),
                values.len()
            )));
        }

        let mut raw = Vec::with_capacity(values.len());
        let mut labels = Vec::with_capacity(names.len());
        for (idx, value) in values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            raw.push(value_text(value));
            if let Some(name) = names.get(idx) {
                labels.push(name.clone());
            }
        }

        if raw.is_empty() {
            let mut any = Schema::any();
            any.nullable = true;
            return Ok(any);
        }

        let values = sanitize_enum_names(&labels, &raw, self.normalizer())?;
        Ok(Schema::enumeration(base, values))
    }

    /// A union of the `oneOf` (or else `anyOf`) branches. `{type: null}` branches make the
    /// union nullable; a single remaining branch stands for itself.
    pub(crate) fn walk_union(&mut self, schema: &'a ShimSchema, path: &[String]) -> AppResult<Schema> {
        let branches = if schema.one_of.is_empty() {
            &schema.any_of
        } else {
            &schema.one_of
        };

        let mut nullable = false;
        let mut variants = Vec::with_capacity(branches.len());
        for (idx, branch) in branches.iter().enumerate() {
            if let RefOr::T(inline) = branch {
                if inline.is_null_type() {
                    nullable = true;
                    continue;
                }
            }
            variants.push(self.walk_field(branch, &child_path(path, &idx.to_string()))?);
        }

        match variants.len() {
            0 => {
                let mut any = Schema::any();
                any.nullable = nullable;
                Ok(any)
            }
            1 if nullable => {
                let mut only = variants.remove(0);
                only.nullable = true;
                Ok(only)
            }
            _ => {
                let discriminator = schema.discriminator.as_ref().map(|d| Discriminator {
                    property_name: d.property_name.clone(),
                    mapping: d.mapping.clone(),
                });
                let mut union = Schema::union(variants, discriminator);
                union.nullable = nullable;
                Ok(union)
            }
        }
    }
}

fn enum_base_type(schema: &ShimSchema, path: &[String]) -> AppResult<String> {
    let (types, _) = schema.types();
    match types.as_slice() {
        [] => Ok("String".to_string()),
        [type_name @ ("object" | "array")] => Err(AppError::unsupported(
            path,
            format!("enum of {} values", type_name),
        )),
        [type_name] => scalar_type(type_name, schema.format.as_deref())
            .map(str::to_string)
            .ok_or_else(|| AppError::unsupported(path, format!("enum of unknown type '{}'", type_name))),
        _ => Err(AppError::unsupported(
            path,
            format!("enum over multiple types {:?}", types),
        )),
    }
}

/// Strings as written, everything else in its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
