#![deny(missing_docs)]

//! # Operation Builder
//!
//! Assembles one [`OperationDefinition`] from a path item and one of its operations.

use crate::error::AppResult;
use crate::oas::generator::Generator;
use crate::oas::models::{
    OperationDefinition, ParamLocation, ParameterDefinition, Property, Schema,
    SecurityDefinition, TypeDefinition, TypeOrigin,
};
use crate::oas::naming::path_to_type_name;
use crate::oas::schemas::structs::assign_field_names;
use crate::oas::shims::{ShimOperation, ShimPathItem, ShimSecurityRequirement};
use tracing::debug;

impl<'a> Generator<'a> {
    /// Describes one operation and collects the types registered on its behalf.
    pub(crate) fn describe_operation(
        &mut self,
        operation_id: &str,
        method: &str,
        path: &str,
        item: &'a ShimPathItem,
        op: &'a ShimOperation,
    ) -> AppResult<OperationDefinition> {
        debug!(operation_id, method, path, "describing operation");

        self.spawned = Some(Vec::new());
        let described = self.build_operation(operation_id, method, path, item, op);
        let spawned = self.spawned.take().unwrap_or_default();
        let mut described = described?;

        described.type_definitions = spawned
            .iter()
            .filter_map(|name| self.registry.get(name).cloned())
            .collect();
        Ok(described)
    }

    fn build_operation(
        &mut self,
        operation_id: &str,
        method: &str,
        path: &str,
        item: &'a ShimPathItem,
        op: &'a ShimOperation,
    ) -> AppResult<OperationDefinition> {
        let parameters =
            self.describe_parameters(operation_id, path, &item.parameters, &op.parameters)?;
        let params_type = self.register_params_bag(operation_id, &parameters)?;

        let request_bodies = match &op.request_body {
            Some(body) => self.describe_request_body(operation_id, body)?,
            None => Vec::new(),
        };
        let responses = self.describe_responses(operation_id, &op.responses)?;

        let requirements = op.security.as_ref().or(self.doc.security.as_ref());
        let security = requirements.map(|r| flatten_security(r)).unwrap_or_default();

        Ok(OperationDefinition {
            operation_id: operation_id.to_string(),
            method: method.to_string(),
            path: path.to_string(),
            summary: op.summary.clone(),
            description: op.description.clone(),
            tags: op.tags.clone(),
            deprecated: op.deprecated,
            parameters,
            params_type,
            request_bodies,
            responses,
            security,
            type_definitions: Vec::new(),
        })
    }

    /// Registers `{OperationId}Params` holding the query, header and cookie parameters.
    fn register_params_bag(
        &mut self,
        operation_id: &str,
        parameters: &[ParameterDefinition],
    ) -> AppResult<Option<String>> {
        let mut properties: Vec<Property> = parameters
            .iter()
            .filter(|p| p.location != ParamLocation::Path)
            .map(|p| {
                let mut prop = Property::new(&p.name, p.schema.clone(), p.required);
                prop.deprecated |= p.deprecated;
                if p.description.is_some() {
                    prop.description = p.description.clone();
                }
                prop
            })
            .collect();
        if properties.is_empty() {
            return Ok(None);
        }

        let path = vec![operation_id.to_string(), "Params".to_string()];
        assign_field_names(&mut properties, &path)?;
        let name = self.register_type(TypeDefinition {
            name: path_to_type_name(&path, self.normalizer()),
            json_name: path.join("_"),
            naming_path: path,
            origin: TypeOrigin::Operation {
                operation_id: operation_id.to_string(),
            },
            schema: Schema::object(properties),
        })?;
        Ok(Some(name))
    }
}

/// One entry per provider of every alternative requirement, without repeats.
fn flatten_security(requirements: &[ShimSecurityRequirement]) -> Vec<SecurityDefinition> {
    let mut out: Vec<SecurityDefinition> = Vec::new();
    for requirement in requirements {
        for (provider, scopes) in requirement {
            let def = SecurityDefinition {
                provider_name: provider.clone(),
                scopes: scopes.clone(),
            };
            if !out.contains(&def) {
                out.push(def);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_flatten_security() {
        let mut oauth = BTreeMap::new();
        oauth.insert("oauth".to_string(), vec!["read".to_string()]);
        oauth.insert("apiKey".to_string(), vec![]);
        let mut key_only = BTreeMap::new();
        key_only.insert("apiKey".to_string(), vec![]);

        let flat = flatten_security(&[oauth, key_only]);
        let names: Vec<&str> = flat.iter().map(|s| s.provider_name.as_str()).collect();
        assert_eq!(names, vec!["apiKey", "oauth"]);
        assert_eq!(flat[1].scopes, vec!["read".to_string()]);
    }
}
