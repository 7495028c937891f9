#![deny(missing_docs)]

//! # JSON Model Strategy
//!
//! Serializes the resolved model as JSON. `Types` and `Operations` inputs become arrays,
//! `Combined` becomes an object with `types` and `operations` keys.

use crate::error::AppResult;
use crate::strategies::traits::{RenderInput, RenderStrategy};

/// Renders the model with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonModelStrategy {
    /// Indent the output.
    pub pretty: bool,
}

impl JsonModelStrategy {
    /// A strategy producing indented JSON.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl RenderStrategy for JsonModelStrategy {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, input: RenderInput<'_>) -> AppResult<String> {
        let mut text = if self.pretty {
            serde_json::to_string_pretty(&input)?
        } else {
            serde_json::to_string(&input)?
        };
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::oas::generator::generate_from_str;
    use serde_json::Value;

    const DOC: &str = r#"
openapi: 3.0.0
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                type: array
                items: {$ref: '#/components/schemas/Pet'}
components:
  schemas:
    Pet:
      type: object
      required: [id]
      properties:
        id: {type: integer, format: int64}
"#;

    #[test]
    fn test_combined_is_an_object() {
        let model = generate_from_str(DOC, &Configuration::default()).unwrap();
        let text = JsonModelStrategy::default()
            .render(RenderInput::combined(&model))
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["types"][0]["name"], "Pet");
        assert_eq!(value["types"][0]["origin"]["kind"], "component");
        assert_eq!(
            value["types"][0]["schema"]["properties"][0]["json_name"],
            "id"
        );
        assert_eq!(value["operations"][0]["operation_id"], "ListPets");
    }

    #[test]
    fn test_types_only_is_an_array() {
        let model = generate_from_str(DOC, &Configuration::default()).unwrap();
        let text = JsonModelStrategy::pretty()
            .render(RenderInput::Types(&model.types))
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert!(value.is_array());
        assert!(text.contains("\n  "));
    }
}
