#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Path-level and operation-level parameters of one operation.
//!
//! - An operation-level parameter replaces the path-level one with the same name and
//!   location, in place.
//! - Path parameters are reordered to match the path template left to right; the rest
//!   keep their merged order after them.
//! - A parameter's type comes from `schema`, or from its single `content` entry (JSON
//!   content is walked, anything else is a plain string).

use crate::error::{AppError, AppResult};
use crate::oas::generator::Generator;
use crate::oas::models::{parse_location, ParamLocation, ParameterDefinition, Schema};
use crate::oas::registry::component_key;
use crate::oas::resolver::body::is_json_media_type;
use crate::oas::schemas::PARAMETERS;
use crate::oas::shims::{ShimParameter, ShimSchema};
use regex::Regex;
use std::sync::OnceLock;
use utoipa::openapi::RefOr;

/// A parameter with its `$ref` resolved.
#[derive(Clone, Copy)]
pub(crate) struct ResolvedParameter<'a> {
    pub(crate) param: &'a ShimParameter,
    pub(crate) location: ParamLocation,
    /// Component name when the parameter was a `$ref`.
    pub(crate) component: Option<&'a str>,
}

/// The schema node that determines a parameter's type.
pub(crate) fn parameter_schema_node(param: &ShimParameter) -> Option<&RefOr<ShimSchema>> {
    if let Some(schema) = &param.schema {
        return Some(schema);
    }
    let content = param.content.as_ref()?;
    let (content_type, media) = content.first()?;
    if is_json_media_type(content_type) {
        media.schema.as_ref()
    } else {
        None
    }
}

/// Names in a path template, left to right.
pub fn path_template_names(path: &str) -> Vec<String> {
    static TEMPLATE: OnceLock<Regex> = OnceLock::new();
    let re = TEMPLATE
        .get_or_init(|| Regex::new(r"\{[.;?]?([^{}*]+)\*?\}").expect("Invalid regex"));
    re.captures_iter(path)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

impl<'a> Generator<'a> {
    /// Merges both parameter levels and describes the result in output order.
    pub(crate) fn describe_parameters(
        &mut self,
        operation_id: &str,
        path: &str,
        path_level: &'a [RefOr<ShimParameter>],
        operation_level: &'a [RefOr<ShimParameter>],
    ) -> AppResult<Vec<ParameterDefinition>> {
        let mut merged = self.resolve_parameter_level(operation_id, path_level)?;
        for param in self.resolve_parameter_level(operation_id, operation_level)? {
            match merged
                .iter_mut()
                .find(|p| p.param.name == param.param.name && p.location == param.location)
            {
                Some(slot) => *slot = param,
                None => merged.push(param),
            }
        }

        let ordered = sort_params_by_path(operation_id, path, merged)?;
        ordered
            .into_iter()
            .map(|param| self.describe_parameter(operation_id, param))
            .collect()
    }

    fn resolve_parameter_level(
        &self,
        operation_id: &str,
        params: &'a [RefOr<ShimParameter>],
    ) -> AppResult<Vec<ResolvedParameter<'a>>> {
        let doc = self.doc;
        let mut resolved: Vec<ResolvedParameter<'a>> = Vec::with_capacity(params.len());
        for param in params {
            let (param, component) = match param {
                RefOr::T(param) => (param, None),
                RefOr::Ref(r) => {
                    let (name, param) = self.resolver.lookup_component(
                        &doc.components.parameters,
                        &r.ref_location,
                        PARAMETERS,
                        &[operation_id.to_string()],
                    )?;
                    let name = doc
                        .components
                        .parameters
                        .get_key_value(&name)
                        .map(|(key, _)| key.as_str());
                    (param, name)
                }
            };
            let location = parse_location(&param.name, &param.location)?;
            if resolved
                .iter()
                .any(|p| p.param.name == param.name && p.location == location)
            {
                return Err(AppError::InvalidDocument(format!(
                    "Operation '{}' declares {} parameter '{}' twice",
                    operation_id, location, param.name
                )));
            }
            resolved.push(ResolvedParameter {
                param,
                location,
                component,
            });
        }
        Ok(resolved)
    }

    fn describe_parameter(
        &mut self,
        operation_id: &str,
        resolved: ResolvedParameter<'a>,
    ) -> AppResult<ParameterDefinition> {
        let param = resolved.param;
        let content_entries = param.content.as_ref().map_or(0, |c| c.len());
        if param.schema.is_some() == (content_entries > 0) || content_entries > 1 {
            return Err(AppError::InvalidDocument(format!(
                "Parameter '{}' of '{}' needs either a schema or exactly one content entry",
                param.name, operation_id
            )));
        }

        let component_type = resolved.component.and_then(|name| {
            self.registry
                .component_name(&component_key(PARAMETERS, name))
                .map(str::to_string)
        });
        let schema = match (component_type, parameter_schema_node(param)) {
            (Some(type_name), Some(_)) => Schema::reference(type_name),
            (None, Some(node)) => {
                self.walk_field(node, &[operation_id.to_string(), param.name.clone()])?
            }
            (_, None) => Schema::primitive("String"),
        };

        Ok(ParameterDefinition {
            name: param.name.clone(),
            location: resolved.location,
            required: param.required,
            style: param.style.clone(),
            explode: param.explode,
            deprecated: param.deprecated,
            description: param.description.clone(),
            schema,
        })
    }
}

/// Path parameters in template order, then everything else in merged order.
///
/// Every template name needs exactly one path parameter and vice versa.
fn sort_params_by_path<'a>(
    operation_id: &str,
    path: &str,
    params: Vec<ResolvedParameter<'a>>,
) -> AppResult<Vec<ResolvedParameter<'a>>> {
    let names = path_template_names(path);
    let (path_params, others): (Vec<_>, Vec<_>) = params
        .into_iter()
        .partition(|p| p.location == ParamLocation::Path);

    if path_params.len() != names.len() {
        return Err(AppError::InvalidDocument(format!(
            "Operation '{}' declares {} path parameters but '{}' has {}",
            operation_id,
            path_params.len(),
            path,
            names.len()
        )));
    }

    let mut ordered = Vec::with_capacity(path_params.len() + others.len());
    for name in &names {
        let param = path_params
            .iter()
            .find(|p| &p.param.name == name)
            .ok_or_else(|| {
                AppError::InvalidDocument(format!(
                    "Path parameter '{}' of '{}' is not declared by operation '{}'",
                    name, path, operation_id
                ))
            })?;
        ordered.push(*param);
    }
    ordered.extend(others);
    Ok(ordered)
}
