#![deny(missing_docs)]

//! # Response Resolution
//!
//! Responses per status code, each with one entry per content type and its headers.
//! Inline payloads become operation types named `{OperationId}{Status}{Tag}Response`.

use crate::error::AppResult;
use crate::oas::generator::Generator;
use crate::oas::models::{
    ResponseContentDefinition, ResponseDefinition, ResponseHeaderDefinition, Schema,
};
use crate::oas::registry::component_key;
use crate::oas::resolver::body::{content_type_tag, json_content};
use crate::oas::schemas::RESPONSES;
use crate::oas::shims::{ShimHeader, ShimResponse};
use std::collections::BTreeMap;
use utoipa::openapi::RefOr;

const HEADERS: &str = "headers";

impl<'a> Generator<'a> {
    /// All responses of an operation in status code order.
    pub(crate) fn describe_responses(
        &mut self,
        operation_id: &str,
        responses: &'a BTreeMap<String, RefOr<ShimResponse>>,
    ) -> AppResult<Vec<ResponseDefinition>> {
        let mut out = Vec::with_capacity(responses.len());
        for (status, response) in responses {
            out.push(self.describe_response(operation_id, status, response)?);
        }
        Ok(out)
    }

    fn describe_response(
        &mut self,
        operation_id: &str,
        status: &str,
        response: &'a RefOr<ShimResponse>,
    ) -> AppResult<ResponseDefinition> {
        let doc = self.doc;
        let (response, component) = match response {
            RefOr::T(response) => (response, None),
            RefOr::Ref(r) => {
                let (name, response) = self.resolver.lookup_component(
                    &doc.components.responses,
                    &r.ref_location,
                    RESPONSES,
                    &[operation_id.to_string(), status.to_string()],
                )?;
                (response, Some(name))
            }
        };

        let component_type = component.as_ref().and_then(|name| {
            self.registry
                .component_name(&component_key(RESPONSES, name))
                .map(str::to_string)
        });
        let component_content = json_content(&response.content).map(|(ct, _)| ct.clone());

        let mut contents = Vec::with_capacity(response.content.len());
        for (content_type, media) in &response.content {
            let tag = content_type_tag(content_type);
            let schema = match &component_type {
                Some(type_name) if component_content.as_ref() == Some(content_type) => {
                    Schema::reference(type_name.clone())
                }
                _ => self.describe_payload(
                    operation_id,
                    media.schema.as_ref(),
                    &[
                        operation_id.to_string(),
                        status.to_string(),
                        tag.clone(),
                        "Response".to_string(),
                    ],
                )?,
            };
            contents.push(ResponseContentDefinition {
                content_type: content_type.clone(),
                name_tag: tag,
                schema,
            });
        }

        let mut headers = Vec::with_capacity(response.headers.len());
        for (name, header) in &response.headers {
            headers.push(self.describe_response_header(operation_id, status, name, header)?);
        }

        Ok(ResponseDefinition {
            status_code: status.to_string(),
            description: response.description.clone(),
            component: component_type.filter(|_| component_content.is_some()),
            contents,
            headers,
        })
    }

    fn describe_response_header(
        &mut self,
        operation_id: &str,
        status: &str,
        name: &str,
        header: &'a RefOr<ShimHeader>,
    ) -> AppResult<ResponseHeaderDefinition> {
        let doc = self.doc;
        let path = vec![
            operation_id.to_string(),
            status.to_string(),
            name.to_string(),
            "Header".to_string(),
        ];
        let header = match header {
            RefOr::T(header) => header,
            RefOr::Ref(r) => {
                self.resolver
                    .lookup_component(&doc.components.headers, &r.ref_location, HEADERS, &path)?
                    .1
            }
        };

        let schema = match &header.schema {
            Some(node) => self.walk_field(node, &path)?,
            None => Schema::primitive("String"),
        };
        Ok(ResponseHeaderDefinition {
            name: name.to_string(),
            required: header.required,
            schema,
        })
    }
}
