#![deny(missing_docs)]

//! # Routes Module
//!
//! Entry point for describing OpenAPI `paths`.
//! Paths are visited in lexical order and methods in the order DELETE, GET, HEAD,
//! OPTIONS, PATCH, POST, PUT, TRACE, so the output does not depend on document layout.

pub mod builder;
pub mod naming;

use crate::error::AppResult;
use crate::oas::generator::Generator;
use crate::oas::models::OperationDefinition;
use crate::oas::naming::Namespace;
use crate::oas::routes::naming::operation_id;

impl<'a> Generator<'a> {
    /// Describes every operation of the document.
    ///
    /// Two operations normalizing to the same identifier are a collision.
    pub(crate) fn describe_operations(&mut self) -> AppResult<Vec<OperationDefinition>> {
        let doc = self.doc;
        let normalizer = self.normalizer();
        let mut ids = Namespace::new("operation ids");
        let mut operations = Vec::new();

        for (path, item) in &doc.paths.items {
            for (method, op) in item.operations() {
                let id = operation_id(op.operation_id.as_deref(), method, path, normalizer);
                ids.claim_exact(&id)?;
                operations.push(self.describe_operation(&id, method, path, item, op)?);
            }
        }
        Ok(operations)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Configuration;
    use crate::error::AppError;
    use crate::oas::generator::Generator;
    use crate::oas::models::{GeneratedModel, ParamLocation, SchemaKind, TypeOrigin};
    use crate::oas::shims::load_document;
    use pretty_assertions::assert_eq;

    fn run(yaml: &str) -> Result<GeneratedModel, AppError> {
        let doc = load_document(yaml).unwrap();
        Generator::new(&doc, &Configuration::default()).generate()
    }

    const PETSTORE: &str = r#"
openapi: 3.0.0
security:
  - apiKey: []
paths:
  /pets/{petId}/toys/{toyId}:
    parameters:
      - name: toyId
        in: path
        required: true
        schema: {type: string}
      - name: petId
        in: path
        required: true
        description: path level
        schema: {type: integer}
      - $ref: '#/components/parameters/Limit'
    get:
      parameters:
        - name: petId
          in: path
          required: false
          description: operation level
          schema: {type: integer, format: int64}
        - name: X-Request-Id
          in: header
          schema: {type: string}
      responses:
        '204':
          description: empty
    post:
      operationId: addToy
      security: []
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              properties:
                name: {type: string}
          multipart/form-data:
            schema:
              $ref: '#/components/schemas/Upload'
      responses:
        '201':
          description: created
components:
  parameters:
    Limit:
      name: limit
      in: query
      schema: {type: integer}
  schemas:
    Upload:
      type: object
      properties:
        file: {type: string, format: binary}
"#;

    #[test]
    fn test_default_operation_id_and_method_order() {
        let model = run(PETSTORE).unwrap();
        let ids: Vec<&str> = model
            .operations
            .iter()
            .map(|op| op.operation_id.as_str())
            .collect();
        assert_eq!(ids, vec!["GetPetsPetIdToysToyId", "AddToy"]);
    }

    #[test]
    fn test_parameter_override_and_path_order() {
        let model = run(PETSTORE).unwrap();
        let op = model.operation("GetPetsPetIdToysToyId").unwrap();
        let params: Vec<(&str, ParamLocation)> = op
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location))
            .collect();
        assert_eq!(
            params,
            vec![
                ("petId", ParamLocation::Path),
                ("toyId", ParamLocation::Path),
                ("limit", ParamLocation::Query),
                ("X-Request-Id", ParamLocation::Header),
            ]
        );

        let pet_id = &op.parameters[0];
        assert!(!pet_id.required);
        assert_eq!(pet_id.description.as_deref(), Some("operation level"));
        assert_eq!(pet_id.schema.type_decl(), "i64");
        assert_eq!(op.parameters[2].schema.type_decl(), "Limit");
    }

    #[test]
    fn test_params_bag() {
        let model = run(PETSTORE).unwrap();
        let op = model.operation("GetPetsPetIdToysToyId").unwrap();
        assert_eq!(op.params_type.as_deref(), Some("GetPetsPetIdToysToyIdParams"));
        let bag = model.type_named("GetPetsPetIdToysToyIdParams").unwrap();
        let fields: Vec<&str> = bag.schema.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(fields, vec!["limit", "x_request_id"]);
        assert!(matches!(bag.origin, TypeOrigin::Operation { .. }));
        assert_eq!(op.type_definitions.len(), 1);
    }

    #[test]
    fn test_request_bodies_and_security() {
        let model = run(PETSTORE).unwrap();
        let add = model.operation("AddToy").unwrap();
        assert!(add.security.is_empty());
        let bodies: Vec<(&str, String, bool)> = add
            .request_bodies
            .iter()
            .map(|b| (b.name_tag.as_str(), b.schema.type_decl(), b.is_default))
            .collect();
        assert_eq!(
            bodies,
            vec![
                ("JSON", "AddToyJSONBody".to_string(), true),
                ("Multipart", "Upload".to_string(), false),
            ]
        );
        assert_eq!(
            model.type_named("AddToyJSONBody").unwrap().schema.kind,
            SchemaKind::Object
        );
        assert_eq!(add.params_type.as_deref(), Some("AddToyParams"));

        let get = model.operation("GetPetsPetIdToysToyId").unwrap();
        assert_eq!(get.security.len(), 1);
        assert_eq!(get.security[0].provider_name, "apiKey");
    }

    #[test]
    fn test_duplicate_operation_ids_collide() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /a:
    get:
      operationId: fetch
      responses: {}
  /b:
    get:
      operationId: Fetch
      responses: {}
"#;
        assert!(matches!(run(yaml), Err(AppError::NameCollision { .. })));
    }

    #[test]
    fn test_path_template_mismatch_is_invalid() {
        let yaml = r#"
openapi: 3.0.0
paths:
  /pets/{petId}:
    get:
      responses: {}
"#;
        assert!(matches!(run(yaml), Err(AppError::InvalidDocument(_))));
    }

    #[test]
    fn test_operations_disabled() {
        let doc = load_document(PETSTORE).unwrap();
        let mut config = Configuration::default();
        config.generate.operations = false;
        let model = Generator::new(&doc, &config).generate().unwrap();
        assert!(model.operations.is_empty());
        assert_eq!(model.types.len(), 2);
    }
}
