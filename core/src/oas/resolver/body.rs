#![deny(missing_docs)]

//! # Body Resolution
//!
//! Request bodies, plus the media type helpers shared with responses.
//!
//! Every content type of a body is described on its own. Inline payload schemas become
//! operation types named `{OperationId}{Tag}Body`, e.g. `AddPetJSONBody`.

use crate::error::AppResult;
use crate::oas::generator::Generator;
use crate::oas::models::{RequestBodyDefinition, Schema, TypeDefinition, TypeOrigin};
use crate::oas::naming::{path_to_type_name, to_camel_case};
use crate::oas::registry::component_key;
use crate::oas::schemas::REQUEST_BODIES;
use crate::oas::shims::{ShimMediaType, ShimRequestBody, ShimSchema};
use std::collections::BTreeMap;
use utoipa::openapi::RefOr;

/// The media type without parameters, lower-cased.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// `application/json` or any `+json` structured syntax.
pub fn is_json_media_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == "application/json" || essence.ends_with("+json")
}

/// The JSON entry of a content map: `application/json` if present, else the first
/// `+json` type. Entries without a schema are ignored.
pub fn json_content(
    content: &BTreeMap<String, ShimMediaType>,
) -> Option<(&String, &RefOr<ShimSchema>)> {
    content
        .iter()
        .filter(|(ct, _)| essence(ct) == "application/json")
        .find_map(with_schema)
        .or_else(|| {
            content
                .iter()
                .filter(|(ct, _)| is_json_media_type(ct))
                .find_map(with_schema)
        })
}

fn with_schema<'m>(
    (content_type, media): (&'m String, &'m ShimMediaType),
) -> Option<(&'m String, &'m RefOr<ShimSchema>)> {
    media.schema.as_ref().map(|schema| (content_type, schema))
}

/// The short tag a content type contributes to type names.
pub fn content_type_tag(content_type: &str) -> String {
    let essence = essence(content_type);
    match essence.as_str() {
        "application/json" => "JSON".to_string(),
        "application/x-www-form-urlencoded" => "Formdata".to_string(),
        "text/plain" => "Text".to_string(),
        e if e.starts_with("multipart/") => "Multipart".to_string(),
        e => to_camel_case(&e.replace('/', "-")),
    }
}

impl<'a> Generator<'a> {
    /// One definition per declared content type, in media type order.
    pub(crate) fn describe_request_body(
        &mut self,
        operation_id: &str,
        body: &'a RefOr<ShimRequestBody>,
    ) -> AppResult<Vec<RequestBodyDefinition>> {
        let doc = self.doc;
        let (body, component) = match body {
            RefOr::T(body) => (body, None),
            RefOr::Ref(r) => {
                let (name, body) = self.resolver.lookup_component(
                    &doc.components.request_bodies,
                    &r.ref_location,
                    REQUEST_BODIES,
                    &[operation_id.to_string()],
                )?;
                (body, Some(name))
            }
        };

        let component_type = component.as_ref().and_then(|name| {
            self.registry
                .component_name(&component_key(REQUEST_BODIES, name))
                .map(str::to_string)
        });
        let component_content = json_content(&body.content).map(|(ct, _)| ct.clone());

        let mut bodies = Vec::with_capacity(body.content.len());
        for (content_type, media) in &body.content {
            let tag = content_type_tag(content_type);
            let schema = match &component_type {
                Some(type_name) if component_content.as_ref() == Some(content_type) => {
                    Schema::reference(type_name.clone())
                }
                _ => self.describe_payload(
                    operation_id,
                    media.schema.as_ref(),
                    &[operation_id.to_string(), tag.clone(), "Body".to_string()],
                )?,
            };
            bodies.push(RequestBodyDefinition {
                content_type: content_type.clone(),
                name_tag: tag,
                required: body.required,
                is_default: essence(content_type) == "application/json",
                schema,
            });
        }
        Ok(bodies)
    }

    /// The schema of a body or response payload. References stay references; any inline
    /// schema becomes an operation type named after `path`.
    pub(crate) fn describe_payload(
        &mut self,
        operation_id: &str,
        node: Option<&'a RefOr<ShimSchema>>,
        path: &[String],
    ) -> AppResult<Schema> {
        let node = match node {
            None => return Ok(Schema::any()),
            Some(RefOr::Ref(r)) => return self.walk_reference(&r.ref_location, path),
            Some(node) => node,
        };

        let schema = self.walk(node, path)?;
        let def = TypeDefinition {
            name: path_to_type_name(path, self.normalizer()),
            json_name: path.join("_"),
            naming_path: path.to_vec(),
            origin: TypeOrigin::Operation {
                operation_id: operation_id.to_string(),
            },
            schema: schema.clone(),
        };
        let name = self.register_type(def)?;
        let mut reference = Schema::reference(name);
        reference.inherit_flags(&schema);
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_tags() {
        assert_eq!(content_type_tag("application/json"), "JSON");
        assert_eq!(content_type_tag("application/json; charset=utf-8"), "JSON");
        assert_eq!(content_type_tag("multipart/form-data"), "Multipart");
        assert_eq!(content_type_tag("application/x-www-form-urlencoded"), "Formdata");
        assert_eq!(content_type_tag("text/plain"), "Text");
        assert_eq!(
            content_type_tag("application/merge-patch+json"),
            "ApplicationMergePatchJson"
        );
        assert_eq!(content_type_tag("application/octet-stream"), "ApplicationOctetStream");
    }

    #[test]
    fn test_json_detection() {
        assert!(is_json_media_type("application/json"));
        assert!(is_json_media_type("application/problem+json"));
        assert!(is_json_media_type("Application/JSON; charset=utf-8"));
        assert!(!is_json_media_type("text/json-ish"));
        assert!(!is_json_media_type("application/xml"));
    }

    #[test]
    fn test_json_content_prefers_plain_json() {
        let yaml = r#"
application/problem+json:
  schema: {type: string}
application/json:
  schema: {type: integer}
text/plain:
  schema: {type: string}
"#;
        let content: BTreeMap<String, ShimMediaType> = serde_yaml::from_str(yaml).unwrap();
        let (ct, _) = json_content(&content).unwrap();
        assert_eq!(ct, "application/json");

        let yaml = r#"
application/problem+json:
  schema: {type: string}
text/plain:
  schema: {type: string}
"#;
        let content: BTreeMap<String, ShimMediaType> = serde_yaml::from_str(yaml).unwrap();
        let (ct, _) = json_content(&content).unwrap();
        assert_eq!(ct, "application/problem+json");
    }
}
